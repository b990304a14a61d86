use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{AdjacentPlan, DeletedPlan, NewPlan, Plan, PlanChanges, PlanWithSite, Site, SiteKey};

/// Persistence boundary for sites and plans.
///
/// Every `*_for_owner` method embeds the ownership join in the statement it
/// runs, so the check and the read or write are a single conditional
/// operation. A row owned by someone else is reported exactly like a missing
/// row (`None`).
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Connectivity check behind `/health`
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_site_for_owner(&self, owner: Uuid, site_id: Uuid) -> Result<Option<Site>, DatabaseError>;

    async fn find_plan_for_owner(&self, owner: Uuid, plan_id: Uuid) -> Result<Option<PlanWithSite>, DatabaseError>;

    /// Plans of a site, newest first. `published` filters on the flag.
    async fn list_plans_for_site(&self, site_id: Uuid, published: bool) -> Result<Vec<Plan>, DatabaseError>;

    async fn create_plan(&self, plan: NewPlan) -> Result<Plan, DatabaseError>;

    /// Applies `changes` only if the plan's site belongs to `owner`.
    /// Returns the updated row joined with its site.
    async fn update_plan_for_owner(
        &self,
        owner: Uuid,
        plan_id: Uuid,
        changes: &PlanChanges,
    ) -> Result<Option<PlanWithSite>, DatabaseError>;

    /// Deletes only if the plan's site belongs to `owner`
    async fn delete_plan_for_owner(&self, owner: Uuid, plan_id: Uuid) -> Result<Option<DeletedPlan>, DatabaseError>;

    async fn find_site_by_key(&self, key: &SiteKey) -> Result<Option<Site>, DatabaseError>;

    /// Published plan with the given slug on the site named by `key`
    async fn find_published_plan(&self, key: &SiteKey, slug: &str) -> Result<Option<PlanWithSite>, DatabaseError>;

    /// Published plans of the site named by `key`, excluding `exclude`
    async fn list_adjacent_plans(&self, key: &SiteKey, exclude: Uuid) -> Result<Vec<AdjacentPlan>, DatabaseError>;
}
