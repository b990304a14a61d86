use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::PublishingConfig;
use crate::database::models::SiteDomains;

/// One public hostname whose cached pages must be rebuilt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationTarget {
    pub hostname: String,
    /// Key the site is rendered under (its subdomain or custom domain)
    pub tenant_key: String,
    pub slug: Option<String>,
}

impl InvalidationTarget {
    /// Subdomain host first, then the custom domain. Blank values are skipped.
    pub fn for_site(domains: &SiteDomains, root_domain: &str, slug: Option<&str>) -> Vec<Self> {
        let mut targets = Vec::with_capacity(2);
        if let Some(subdomain) = non_blank(&domains.subdomain) {
            targets.push(Self {
                hostname: format!("{}.{}", subdomain, root_domain),
                tenant_key: subdomain.to_string(),
                slug: slug.map(str::to_string),
            });
        }
        if let Some(custom) = non_blank(&domains.custom_domain) {
            targets.push(Self {
                hostname: custom.to_string(),
                tenant_key: custom.to_string(),
                slug: slug.map(str::to_string),
            });
        }
        targets
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Error)]
pub enum RevalidateError {
    #[error("revalidation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("revalidation endpoint answered {0}")]
    Status(reqwest::StatusCode),

    #[error("revalidation timed out after {0:?}")]
    Timeout(Duration),
}

/// Non-fatal notice that one hostname could not be invalidated.
/// The write that triggered it is already committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationWarning {
    pub hostname: String,
    pub message: String,
}

/// Downstream cache that serves published pages
#[async_trait]
pub trait Revalidator: Send + Sync {
    async fn revalidate(&self, target: &InvalidationTarget) -> Result<(), RevalidateError>;
}

/// Calls `POST https://<hostname>/api/revalidate` on the rendering tier
pub struct HttpRevalidator {
    client: reqwest::Client,
    secret: String,
    scheme: &'static str,
}

impl HttpRevalidator {
    pub fn new(publishing: &PublishingConfig) -> Self {
        // Local root domains (localhost:3000) are plain http
        let scheme = if publishing.root_domain.starts_with("localhost") {
            "http"
        } else {
            "https"
        };
        Self {
            client: reqwest::Client::new(),
            secret: publishing.revalidate_secret.clone(),
            scheme,
        }
    }

    fn endpoint(&self, hostname: &str) -> String {
        format!("{}://{}/api/revalidate", self.scheme, hostname)
    }
}

#[async_trait]
impl Revalidator for HttpRevalidator {
    async fn revalidate(&self, target: &InvalidationTarget) -> Result<(), RevalidateError> {
        let response = self
            .client
            .post(self.endpoint(&target.hostname))
            .header("x-revalidate-secret", &self.secret)
            .json(&json!({
                "tenant": target.tenant_key,
                "slug": target.slug,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RevalidateError::Status(response.status()));
        }
        Ok(())
    }
}

/// Invalidate every target concurrently, each bounded by `limit`.
///
/// Targets are independent: one failing or hanging never stops the others.
/// Nothing is retried; every failure is logged and returned as a warning.
pub async fn fan_out(
    revalidator: &dyn Revalidator,
    targets: &[InvalidationTarget],
    limit: Duration,
) -> Vec<InvalidationWarning> {
    let calls = targets.iter().map(|target| async move {
        let outcome = match timeout(limit, revalidator.revalidate(target)).await {
            Ok(result) => result,
            Err(_) => Err(RevalidateError::Timeout(limit)),
        };
        match outcome {
            Ok(()) => {
                tracing::debug!(hostname = %target.hostname, slug = ?target.slug, "revalidated");
                None
            }
            Err(e) => {
                tracing::warn!(
                    hostname = %target.hostname,
                    tenant = %target.tenant_key,
                    slug = ?target.slug,
                    "revalidation failed: {}",
                    e
                );
                Some(InvalidationWarning {
                    hostname: target.hostname.clone(),
                    message: e.to_string(),
                })
            }
        }
    });

    join_all(calls).await.into_iter().flatten().collect()
}
