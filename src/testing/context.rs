use std::sync::Arc;
use uuid::Uuid;

use super::{publishing, RecordingRevalidator, StaticPlaceholder};
use crate::database::models::{NewPlan, Plan, PlanChanges, Site, User};
use crate::database::{MemoryStore, PlanStore};
use crate::services::placeholder::PLACEHOLDER_BLURHASH;
use crate::services::AuthorizedMutationGateway;

/// Two users; alice owns site "blog" (subdomain only)
pub struct TestContext {
    pub store: MemoryStore,
    pub gateway: AuthorizedMutationGateway,
    pub revalidator: Arc<RecordingRevalidator>,
    pub placeholders: Arc<StaticPlaceholder>,
    pub alice: User,
    pub bob: User,
    pub blog: Site,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_parts(Arc::new(RecordingRevalidator::default()), Arc::new(StaticPlaceholder::default())).await
    }

    pub async fn with_revalidator(revalidator: Arc<RecordingRevalidator>) -> Self {
        Self::with_parts(revalidator, Arc::new(StaticPlaceholder::default())).await
    }

    pub async fn with_parts(revalidator: Arc<RecordingRevalidator>, placeholders: Arc<StaticPlaceholder>) -> Self {
        let store = MemoryStore::new();
        let alice = store.insert_user("alice").await;
        let bob = store.insert_user("bob").await;
        let blog = store
            .insert_site(alice.id, Some("blog"), None)
            .await
            .expect("seed site");

        let gateway = AuthorizedMutationGateway::new(
            Arc::new(store.clone()),
            revalidator.clone(),
            placeholders.clone(),
            publishing(),
        );

        Self {
            store,
            gateway,
            revalidator,
            placeholders,
            alice,
            bob,
            blog,
        }
    }

    /// Plan on alice's "blog" site, written directly to the store
    pub async fn seed_plan(&self, slug: &str, published: bool) -> Plan {
        self.seed_plan_on(self.blog.id, slug, published).await
    }

    pub async fn seed_plan_on(&self, site_id: Uuid, slug: &str, published: bool) -> Plan {
        let plan = self
            .store
            .create_plan(NewPlan {
                site_id,
                slug: slug.to_string(),
                image: "/placeholder.png".to_string(),
                image_blurhash: PLACEHOLDER_BLURHASH.to_string(),
            })
            .await
            .expect("seed plan");
        let owner = self.alice.id;
        let changes = PlanChanges {
            title: Some(format!("Title of {}", slug)),
            published: Some(published),
            ..Default::default()
        };
        self.store
            .update_plan_for_owner(owner, plan.id, &changes)
            .await
            .expect("seed update")
            .expect("seeded site is owned by alice")
            .plan
    }
}
