use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::site::{Site, SiteDomains};

/// A markdown document belonging to exactly one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub site_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub slug: String,
    pub image: Option<String>,
    pub image_blurhash: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWithSite {
    #[serde(flatten)]
    pub plan: Plan,
    pub site: Site,
}

/// Insert payload; the site must already be authorized for the caller
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub site_id: Uuid,
    pub slug: String,
    pub image: String,
    pub image_blurhash: String,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub image_blurhash: Option<String>,
    pub published: Option<bool>,
}

impl PlanChanges {
    pub fn apply(&self, plan: &mut Plan) {
        if let Some(v) = &self.title {
            plan.title = Some(v.clone());
        }
        if let Some(v) = &self.description {
            plan.description = Some(v.clone());
        }
        if let Some(v) = &self.content {
            plan.content = Some(v.clone());
        }
        if let Some(v) = &self.slug {
            plan.slug = v.clone();
        }
        if let Some(v) = &self.image {
            plan.image = Some(v.clone());
        }
        if let Some(v) = &self.image_blurhash {
            plan.image_blurhash = Some(v.clone());
        }
        if let Some(v) = self.published {
            plan.published = v;
        }
    }
}

/// Row removed by a delete, with the hostnames that served it at deletion time
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedPlan {
    pub plan: Plan,
    pub domains: SiteDomains,
}

/// Card data for "more plans" listings on a public plan page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentPlan {
    pub slug: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_blurhash: Option<String>,
}

impl From<&Plan> for AdjacentPlan {
    fn from(plan: &Plan) -> Self {
        Self {
            slug: plan.slug.clone(),
            title: plan.title.clone(),
            created_at: plan.created_at,
            description: plan.description.clone(),
            image: plan.image.clone(),
            image_blurhash: plan.image_blurhash.clone(),
        }
    }
}
