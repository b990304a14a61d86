use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::database::PlanStore;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::AuthorizedMutationGateway;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AuthorizedMutationGateway>,
    pub store: Arc<dyn PlanStore>,
}

impl AppState {
    pub fn new(gateway: AuthorizedMutationGateway, store: Arc<dyn PlanStore>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let api = &config::config().api;

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(site_routes())
        // Protected (session required)
        .merge(protected_routes())
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .with_state(state);

    if let Some(cors) = cors_layer(&config::config().security) {
        router = router.layer(cors);
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn site_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/sites/:site", get(public::site_get))
        .route("/sites/:site/:slug", get(public::site_plan_get))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{self, plan};

    Router::new()
        .route("/api/auth/whoami", get(protected::session_whoami))
        .route(
            "/api/plan",
            get(plan::get)
                .post(plan::post)
                .put(plan::put)
                .delete(plan::delete)
                .fallback(plan::method_not_allowed),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let layer = CorsLayer::new().allow_methods(methods).allow_headers(Any);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    Some(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Sitepub API",
            "version": version,
            "description": "Site and plan publishing backend with on-demand revalidation",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "sites": "/sites/:site[/:slug] (public - published content only)",
                "auth": "/api/auth/whoami (protected)",
                "plan": "/api/plan (protected - GET, POST, PUT, DELETE)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
