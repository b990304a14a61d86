use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PublishingConfig;
use crate::database::models::{NewPlan, Plan, PlanChanges, PlanWithSite, Site, SiteDomains};
use crate::database::{DatabaseError, PlanStore};
use crate::services::placeholder::{PlaceholderGenerator, PLACEHOLDER_BLURHASH};
use crate::services::revalidate::{fan_out, InvalidationTarget, InvalidationWarning, Revalidator};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    /// Missing, or owned by someone else; callers cannot tell which
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(DatabaseError),
}

impl From<DatabaseError> for GatewayError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => {
                GatewayError::Conflict("A plan with this slug already exists on this site".to_string())
            }
            other => GatewayError::Store(other),
        }
    }
}

/// Result of a committed write plus any cache invalidations that failed after it
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    pub value: T,
    pub warnings: Vec<InvalidationWarning>,
}

/// Caller identity as resolved by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub Uuid);

/// Fields accepted by [`AuthorizedMutationGateway::update_plan`]
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanListing {
    pub plans: Vec<Plan>,
    pub site: Option<Site>,
}

/// Tenant-scoped access to plans.
///
/// Every operation resolves plan -> site -> owner inside the store query and
/// compares it to the caller; committed writes then invalidate each public
/// hostname of the site.
pub struct AuthorizedMutationGateway {
    store: Arc<dyn PlanStore>,
    revalidator: Arc<dyn Revalidator>,
    placeholders: Arc<dyn PlaceholderGenerator>,
    publishing: PublishingConfig,
}

impl AuthorizedMutationGateway {
    pub fn new(
        store: Arc<dyn PlanStore>,
        revalidator: Arc<dyn Revalidator>,
        placeholders: Arc<dyn PlaceholderGenerator>,
        publishing: PublishingConfig,
    ) -> Self {
        Self {
            store,
            revalidator,
            placeholders,
            publishing,
        }
    }

    pub async fn authorize_site_access(&self, caller: CallerId, site_id: Uuid) -> Result<Site, GatewayError> {
        let owner = require_caller(caller)?;
        self.store
            .find_site_for_owner(owner, site_id)
            .await
            .map_err(|e| store_failure("authorize site", e))?
            .ok_or(GatewayError::NotFound("Site"))
    }

    pub async fn authorize_plan_access(&self, caller: CallerId, plan_id: Uuid) -> Result<PlanWithSite, GatewayError> {
        let owner = require_caller(caller)?;
        self.store
            .find_plan_for_owner(owner, plan_id)
            .await
            .map_err(|e| store_failure("authorize plan", e))?
            .ok_or(GatewayError::NotFound("Plan"))
    }

    pub async fn get_plan(&self, caller: CallerId, plan_id: Option<&str>) -> Result<PlanWithSite, GatewayError> {
        let plan_id = parse_id("plan", plan_id)?;
        self.authorize_plan_access(caller, plan_id).await
    }

    /// Site not found or not owned yields an empty listing, not an error
    pub async fn list_plans(
        &self,
        caller: CallerId,
        site_id: Option<&str>,
        published: Option<bool>,
    ) -> Result<PlanListing, GatewayError> {
        let site_id = parse_id("site", site_id)?;
        let site = match self.authorize_site_access(caller, site_id).await {
            Ok(site) => site,
            Err(GatewayError::NotFound(_)) => return Ok(PlanListing { plans: vec![], site: None }),
            Err(e) => return Err(e),
        };
        let plans = self
            .store
            .list_plans_for_site(site.id, published.unwrap_or(true))
            .await
            .map_err(|e| store_failure("list plans", e))?;
        Ok(PlanListing { plans, site: Some(site) })
    }

    pub async fn create_plan_for_site(&self, caller: CallerId, site_id: Option<&str>) -> Result<Plan, GatewayError> {
        require_caller(caller)?;
        let site_id = parse_id("site", site_id)?;
        let site = self.authorize_site_access(caller, site_id).await?;

        let plan = self
            .store
            .create_plan(NewPlan {
                site_id: site.id,
                slug: Uuid::new_v4().simple().to_string(),
                image: self.publishing.placeholder_image.clone(),
                image_blurhash: PLACEHOLDER_BLURHASH.to_string(),
            })
            .await
            .map_err(|e| store_failure("create plan", e))?;

        tracing::info!(plan_id = %plan.id, site_id = %site.id, user_id = %caller.0, "plan created");
        Ok(plan)
    }

    pub async fn update_plan(
        &self,
        caller: CallerId,
        plan_id: Option<&str>,
        update: PlanUpdate,
    ) -> Result<Mutation<Plan>, GatewayError> {
        let owner = require_caller(caller)?;
        let plan_id = parse_id("plan", plan_id)?;
        if let Some(slug) = &update.slug {
            validate_slug(slug)?;
        }

        // A placeholder is only recomputed when the cover image actually changes
        let current = self.authorize_plan_access(caller, plan_id).await?;
        let image_blurhash = match &update.image {
            Some(image) if current.plan.image.as_deref() != Some(image.as_str()) => {
                self.placeholders.placeholder_for(image).await
            }
            _ => None,
        };

        let changes = PlanChanges {
            title: update.title,
            description: update.description,
            content: update.content,
            slug: update.slug,
            image: update.image,
            image_blurhash,
            published: update.published,
        };

        // The ownership filter is re-applied by the write itself
        let updated = self
            .store
            .update_plan_for_owner(owner, plan_id, &changes)
            .await
            .map_err(|e| store_failure("update plan", e))?
            .ok_or(GatewayError::NotFound("Plan"))?;

        tracing::info!(plan_id = %plan_id, user_id = %owner, "plan updated");

        // A renamed plan leaves a stale page behind at its old slug
        let mut slugs = vec![updated.plan.slug.as_str()];
        if current.plan.slug != updated.plan.slug {
            slugs.push(current.plan.slug.as_str());
        }
        let warnings = self.invalidate(&updated.site.domains(), &slugs).await;
        Ok(Mutation {
            value: updated.plan,
            warnings,
        })
    }

    pub async fn delete_plan(&self, caller: CallerId, plan_id: Option<&str>) -> Result<Mutation<()>, GatewayError> {
        let owner = require_caller(caller)?;
        let plan_id = parse_id("plan", plan_id)?;

        let deleted = self
            .store
            .delete_plan_for_owner(owner, plan_id)
            .await
            .map_err(|e| store_failure("delete plan", e))?
            .ok_or(GatewayError::NotFound("Plan"))?;

        tracing::info!(plan_id = %plan_id, user_id = %owner, slug = %deleted.plan.slug, "plan deleted");

        let warnings = self.invalidate(&deleted.domains, &[deleted.plan.slug.as_str()]).await;
        Ok(Mutation { value: (), warnings })
    }

    /// One target per (hostname, slug) pair
    async fn invalidate(&self, domains: &SiteDomains, slugs: &[&str]) -> Vec<InvalidationWarning> {
        let targets: Vec<InvalidationTarget> = slugs
            .iter()
            .flat_map(|slug| InvalidationTarget::for_site(domains, &self.publishing.root_domain, Some(*slug)))
            .collect();
        if targets.is_empty() {
            return vec![];
        }
        let limit = Duration::from_millis(self.publishing.revalidate_timeout_ms);
        fan_out(self.revalidator.as_ref(), &targets, limit).await
    }
}

fn require_caller(caller: CallerId) -> Result<Uuid, GatewayError> {
    if caller.0.is_nil() {
        return Err(GatewayError::BadRequest("Missing session user".to_string()));
    }
    Ok(caller.0)
}

fn parse_id(kind: &str, raw: Option<&str>) -> Result<Uuid, GatewayError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::BadRequest(format!("Missing {} ID", kind)))?;
    Uuid::parse_str(raw).map_err(|_| GatewayError::BadRequest(format!("Malformed {} ID", kind)))
}

fn validate_slug(slug: &str) -> Result<(), GatewayError> {
    let valid = !slug.is_empty()
        && slug.len() <= 200
        && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(GatewayError::BadRequest(
            "Slug may only contain letters, numbers, hyphens, and underscores".to_string(),
        ));
    }
    Ok(())
}

/// Log persistence failures with context before they reach the HTTP layer
fn store_failure(operation: &'static str, err: DatabaseError) -> GatewayError {
    if !matches!(err, DatabaseError::Conflict(_)) {
        tracing::error!(operation, "store error: {}", err);
    }
    err.into()
}
