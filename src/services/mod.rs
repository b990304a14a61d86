pub mod gateway;
pub mod placeholder;
pub mod public_site;
pub mod revalidate;

pub use gateway::{AuthorizedMutationGateway, CallerId, GatewayError, Mutation, PlanListing, PlanUpdate};
pub use placeholder::{HttpPlaceholderGenerator, PlaceholderGenerator, PLACEHOLDER_BLURHASH};
pub use public_site::{PlanPage, PublicSiteReader, SiteData};
pub use revalidate::{HttpRevalidator, InvalidationTarget, InvalidationWarning, RevalidateError, Revalidator};
