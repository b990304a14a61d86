use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::{DatabaseManager, MemoryStore, PgPlanStore, PlanStore};
use crate::services::{AuthorizedMutationGateway, HttpPlaceholderGenerator, HttpRevalidator};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Keep sites and plans in process memory instead of Postgres")]
    pub in_memory: bool,

    #[arg(long, help = "Port to listen on (overrides SITEPUB_API_PORT/PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Sitepub API in {:?} mode", config.environment);

    if config.publishing.revalidate_secret.is_empty() && !crate::is_development!() {
        warn!("REVALIDATE_SECRET is empty; public hosts will reject revalidation calls");
    }

    let store: Arc<dyn PlanStore> = if args.in_memory {
        Arc::new(seeded_memory_store().await?)
    } else {
        Arc::new(PgPlanStore::new(DatabaseManager::pool().await?))
    };

    let gateway = AuthorizedMutationGateway::new(
        store.clone(),
        Arc::new(HttpRevalidator::new(&config.publishing)),
        Arc::new(HttpPlaceholderGenerator::new(&config.publishing)),
        config.publishing.clone(),
    );
    let router = app(AppState::new(gateway, store));

    let port = args.port.unwrap_or(config.api.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Sitepub API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !args.in_memory {
        DatabaseManager::close().await;
    }
    Ok(())
}

/// One demo user owning the `demo` site, with a token printed to the log
async fn seeded_memory_store() -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::new();
    let user = store.insert_user("demo").await;
    let site = store.insert_site(user.id, Some("demo"), None).await?;
    let token = generate_jwt(Claims::new(user.id, user.name.clone(), None))?;
    info!(site_id = %site.id, "in-memory store seeded with user {}", user.id);
    info!("demo session token: {}", token);
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
