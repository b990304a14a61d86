use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Site {
    pub fn domains(&self) -> SiteDomains {
        SiteDomains {
            subdomain: self.subdomain.clone(),
            custom_domain: self.custom_domain.clone(),
        }
    }
}

/// Public hostnames of a site, captured at write time for cache invalidation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SiteDomains {
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
}

/// How a public request names a site: `blog` is a subdomain, `blog.example.com` a custom domain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SiteKey {
    Subdomain(String),
    CustomDomain(String),
}

impl SiteKey {
    pub fn parse(site: &str) -> Self {
        if site.contains('.') {
            SiteKey::CustomDomain(site.to_string())
        } else {
            SiteKey::Subdomain(site.to_string())
        }
    }

    pub fn matches(&self, site: &Site) -> bool {
        match self {
            SiteKey::Subdomain(s) => site.subdomain.as_deref() == Some(s.as_str()),
            SiteKey::CustomDomain(d) => site.custom_domain.as_deref() == Some(d.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SiteKey::Subdomain(s) | SiteKey::CustomDomain(s) => s,
        }
    }
}
