use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    AdjacentPlan, DeletedPlan, NewPlan, Plan, PlanChanges, PlanWithSite, Site, SiteKey, User,
};
use super::store::PlanStore;

const SITE_SLUG_CONSTRAINT: &str = "plans_site_slug_key";

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    sites: HashMap<Uuid, Site>,
    /// Insertion sequence breaks ties between equal `created_at` values
    plans: HashMap<Uuid, (u64, Plan)>,
    next_seq: u64,
}

impl MemoryState {
    fn slug_taken(&self, site_id: Uuid, slug: &str, except: Option<Uuid>) -> bool {
        self.plans
            .values()
            .any(|(_, p)| p.site_id == site_id && p.slug == slug && Some(p.id) != except)
    }

    fn owned_plan(&self, owner: Uuid, plan_id: Uuid) -> Option<(&Plan, &Site)> {
        let (_, plan) = self.plans.get(&plan_id)?;
        let site = self.sites.get(&plan.site_id)?;
        (site.user_id == owner).then_some((plan, site))
    }

    fn site_for_key(&self, key: &SiteKey) -> Option<&Site> {
        self.sites.values().find(|s| key.matches(s))
    }

    fn newest_first<'a>(&'a self, filter: impl Fn(&Plan) -> bool) -> Vec<&'a Plan> {
        let mut rows: Vec<&(u64, Plan)> = self.plans.values().filter(|(_, p)| filter(p)).collect();
        rows.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        rows.into_iter().map(|(_, p)| p).collect()
    }
}

/// In-process [`PlanStore`] with the same ownership and uniqueness rules as
/// the Postgres schema. Used by `serve --in-memory` and the test suites.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, name: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: Some(name.to_string()),
            email: None,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.users.insert(user.id, user.clone());
        user
    }

    /// Registers a site; fails on an unknown owner or a duplicate subdomain or custom domain
    pub async fn insert_site(
        &self,
        owner: Uuid,
        subdomain: Option<&str>,
        custom_domain: Option<&str>,
    ) -> Result<Site, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&owner) {
            return Err(DatabaseError::QueryError(format!("sites_user_id_fkey: no user {}", owner)));
        }
        let taken = state.sites.values().any(|s| {
            (subdomain.is_some() && s.subdomain.as_deref() == subdomain)
                || (custom_domain.is_some() && s.custom_domain.as_deref() == custom_domain)
        });
        if taken {
            return Err(DatabaseError::Conflict("sites_domain_key".to_string()));
        }
        let now = Utc::now();
        let site = Site {
            id: Uuid::new_v4(),
            user_id: owner,
            name: subdomain.map(str::to_string),
            description: None,
            subdomain: subdomain.map(str::to_string),
            custom_domain: custom_domain.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        state.sites.insert(site.id, site.clone());
        Ok(site)
    }

    /// Unscoped lookup, for inspection
    pub async fn plan(&self, plan_id: Uuid) -> Option<Plan> {
        self.state.read().await.plans.get(&plan_id).map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn find_site_for_owner(&self, owner: Uuid, site_id: Uuid) -> Result<Option<Site>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.sites.get(&site_id).filter(|s| s.user_id == owner).cloned())
    }

    async fn find_plan_for_owner(&self, owner: Uuid, plan_id: Uuid) -> Result<Option<PlanWithSite>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.owned_plan(owner, plan_id).map(|(plan, site)| PlanWithSite {
            plan: plan.clone(),
            site: site.clone(),
        }))
    }

    async fn list_plans_for_site(&self, site_id: Uuid, published: bool) -> Result<Vec<Plan>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first(|p| p.site_id == site_id && p.published == published)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn create_plan(&self, new: NewPlan) -> Result<Plan, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.sites.contains_key(&new.site_id) {
            return Err(DatabaseError::QueryError(format!("site {} does not exist", new.site_id)));
        }
        if state.slug_taken(new.site_id, &new.slug, None) {
            return Err(DatabaseError::Conflict(SITE_SLUG_CONSTRAINT.to_string()));
        }
        let now = Utc::now();
        let plan = Plan {
            id: Uuid::new_v4(),
            site_id: new.site_id,
            title: None,
            description: None,
            content: None,
            slug: new.slug,
            image: Some(new.image),
            image_blurhash: Some(new.image_blurhash),
            published: false,
            created_at: now,
            updated_at: now,
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.plans.insert(plan.id, (seq, plan.clone()));
        Ok(plan)
    }

    async fn update_plan_for_owner(
        &self,
        owner: Uuid,
        plan_id: Uuid,
        changes: &PlanChanges,
    ) -> Result<Option<PlanWithSite>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some((plan, site)) = state.owned_plan(owner, plan_id) else {
            return Ok(None);
        };
        let site = site.clone();
        let mut updated = plan.clone();
        changes.apply(&mut updated);
        if state.slug_taken(updated.site_id, &updated.slug, Some(plan_id)) {
            return Err(DatabaseError::Conflict(SITE_SLUG_CONSTRAINT.to_string()));
        }
        updated.updated_at = Utc::now();
        if let Some((_, row)) = state.plans.get_mut(&plan_id) {
            *row = updated.clone();
        }
        Ok(Some(PlanWithSite { plan: updated, site }))
    }

    async fn delete_plan_for_owner(&self, owner: Uuid, plan_id: Uuid) -> Result<Option<DeletedPlan>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some((_, site)) = state.owned_plan(owner, plan_id) else {
            return Ok(None);
        };
        let domains = site.domains();
        Ok(state
            .plans
            .remove(&plan_id)
            .map(|(_, plan)| DeletedPlan { plan, domains }))
    }

    async fn find_site_by_key(&self, key: &SiteKey) -> Result<Option<Site>, DatabaseError> {
        Ok(self.state.read().await.site_for_key(key).cloned())
    }

    async fn find_published_plan(&self, key: &SiteKey, slug: &str) -> Result<Option<PlanWithSite>, DatabaseError> {
        let state = self.state.read().await;
        let Some(site) = state.site_for_key(key) else {
            return Ok(None);
        };
        Ok(state
            .plans
            .values()
            .map(|(_, p)| p)
            .find(|p| p.site_id == site.id && p.slug == slug && p.published)
            .map(|plan| PlanWithSite {
                plan: plan.clone(),
                site: site.clone(),
            }))
    }

    async fn list_adjacent_plans(&self, key: &SiteKey, exclude: Uuid) -> Result<Vec<AdjacentPlan>, DatabaseError> {
        let state = self.state.read().await;
        let Some(site) = state.site_for_key(key) else {
            return Ok(vec![]);
        };
        let site_id = site.id;
        Ok(state
            .newest_first(|p| p.site_id == site_id && p.published && p.id != exclude)
            .into_iter()
            .map(AdjacentPlan::from)
            .collect())
    }
}
