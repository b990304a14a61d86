//! In-process stand-ins for the outbound collaborators, shared by the unit
//! tests and the router tests under `tests/`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::PublishingConfig;
use crate::services::placeholder::PlaceholderGenerator;
use crate::services::revalidate::{InvalidationTarget, RevalidateError, Revalidator};

#[cfg(test)]
mod context;
#[cfg(test)]
pub use context::TestContext;

pub fn publishing() -> PublishingConfig {
    PublishingConfig {
        root_domain: "vercel.pub".to_string(),
        revalidate_secret: "test-secret".to_string(),
        revalidate_timeout_ms: 500,
        placeholder_image: "/placeholder.png".to_string(),
        image_proxy: "https://proxy.test/?url={url}".to_string(),
    }
}

/// Records every invalidation; optionally fails one hostname
#[derive(Default)]
pub struct RecordingRevalidator {
    calls: Mutex<Vec<InvalidationTarget>>,
    fail_host: Option<String>,
}

impl RecordingRevalidator {
    pub fn failing_on(host: &str) -> Self {
        Self {
            calls: Mutex::new(vec![]),
            fail_host: Some(host.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<InvalidationTarget> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Revalidator for RecordingRevalidator {
    async fn revalidate(&self, target: &InvalidationTarget) -> Result<(), RevalidateError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.clone());
        if self.fail_host.as_deref() == Some(target.hostname.as_str()) {
            return Err(RevalidateError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(())
    }
}

/// Returns `blur:<image>` and counts requests
#[derive(Default)]
pub struct StaticPlaceholder {
    requests: AtomicUsize,
}

impl StaticPlaceholder {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceholderGenerator for StaticPlaceholder {
    async fn placeholder_for(&self, image: &str) -> Option<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Some(format!("blur:{}", image))
    }
}
