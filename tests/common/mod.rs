#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sitepub_api::app::{app, AppState};
use sitepub_api::auth::{generate_jwt, Claims};
use sitepub_api::database::models::{NewPlan, Plan, PlanChanges, Site, User};
use sitepub_api::database::{MemoryStore, PlanStore};
use sitepub_api::services::{AuthorizedMutationGateway, PLACEHOLDER_BLURHASH};
use sitepub_api::testing::{publishing, StaticPlaceholder};

pub use sitepub_api::testing::RecordingRevalidator;

pub const ROOT_DOMAIN: &str = "vercel.pub";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Router over an in-memory store: alice owns "blog", bob owns "notes"
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub revalidator: Arc<RecordingRevalidator>,
    pub alice: User,
    pub bob: User,
    pub blog: Site,
    pub notes: Site,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_revalidator(RecordingRevalidator::default()).await
    }

    pub async fn with_revalidator(revalidator: RecordingRevalidator) -> Self {
        let store = MemoryStore::new();
        let alice = store.insert_user("alice").await;
        let bob = store.insert_user("bob").await;
        let blog = store.insert_site(alice.id, Some("blog"), None).await.unwrap();
        let notes = store
            .insert_site(bob.id, Some("notes"), Some("notes.example.com"))
            .await
            .unwrap();

        let revalidator = Arc::new(revalidator);
        let shared: Arc<dyn PlanStore> = Arc::new(store.clone());
        let gateway = AuthorizedMutationGateway::new(
            shared.clone(),
            revalidator.clone(),
            Arc::new(StaticPlaceholder::default()),
            publishing(),
        );

        Self {
            router: app(AppState::new(gateway, shared)),
            store,
            revalidator,
            alice,
            bob,
            blog,
            notes,
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        generate_jwt(Claims::new(user.id, user.name.clone(), user.email.clone())).unwrap()
    }

    /// Plan written straight to the store, bypassing the gateway
    pub async fn seed_plan(&self, site: &Site, slug: &str, published: bool) -> Plan {
        let plan = self
            .store
            .create_plan(NewPlan {
                site_id: site.id,
                slug: slug.to_string(),
                image: "/placeholder.png".to_string(),
                image_blurhash: PLACEHOLDER_BLURHASH.to_string(),
            })
            .await
            .unwrap();
        let changes = PlanChanges {
            title: Some(format!("Title of {}", slug)),
            published: Some(published),
            ..Default::default()
        };
        self.store
            .update_plan_for_owner(site.user_id, plan.id, &changes)
            .await
            .unwrap()
            .unwrap()
            .plan
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }
}

pub fn random_id() -> Uuid {
    Uuid::new_v4()
}
