pub mod plan;
pub mod site;
pub mod user;

pub use plan::{AdjacentPlan, DeletedPlan, NewPlan, Plan, PlanChanges, PlanWithSite};
pub use site::{Site, SiteDomains, SiteKey};
pub use user::User;
