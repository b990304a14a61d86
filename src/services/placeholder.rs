use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::PublishingConfig;

/// Blurred 8x8 grey PNG stored on freshly created plans
pub const PLACEHOLDER_BLURHASH: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAgAAAAICAYAAADED76LAAAAGklEQVR42mO8ceOGHQMRgHFUIX0VMjIyMgAAiUEGAW4rXMgAAAAASUVORK5CYII=";

/// Produces the low-resolution placeholder shown while a cover image loads
#[async_trait]
pub trait PlaceholderGenerator: Send + Sync {
    /// `None` when no placeholder could be produced
    async fn placeholder_for(&self, image: &str) -> Option<String>;
}

/// Fetches a small blurred thumbnail through an image proxy and inlines it as a data URL
pub struct HttpPlaceholderGenerator {
    client: reqwest::Client,
    proxy_template: String,
}

impl HttpPlaceholderGenerator {
    pub fn new(publishing: &PublishingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            proxy_template: publishing.image_proxy.clone(),
        }
    }

    fn thumbnail_url(&self, image: &str) -> Option<String> {
        // Relative paths (the default placeholder) have nothing to fetch
        let parsed = url::Url::parse(image).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        let encoded: String = url::form_urlencoded::byte_serialize(image.as_bytes()).collect();
        Some(self.proxy_template.replace("{url}", &encoded))
    }
}

#[async_trait]
impl PlaceholderGenerator for HttpPlaceholderGenerator {
    async fn placeholder_for(&self, image: &str) -> Option<String> {
        let url = self.thumbnail_url(image)?;
        let response = match self.client.get(&url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(image, status = %r.status(), "placeholder thumbnail request rejected");
                return None;
            }
            Err(e) => {
                tracing::warn!(image, "placeholder thumbnail request failed: {}", e);
                return None;
            }
        };
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(image, "failed to read placeholder thumbnail: {}", e);
                return None;
            }
        };
        Some(format!("data:image/png;base64,{}", STANDARD.encode(&bytes)))
    }
}
