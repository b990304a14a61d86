use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::models::{AdjacentPlan, Plan, PlanWithSite, Site, SiteKey};
use crate::database::{DatabaseError, PlanStore};

/// A site with its published plans, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    #[serde(flatten)]
    pub site: Site,
    pub plans: Vec<Plan>,
}

/// A published plan and the other published plans of its site
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPage {
    pub data: PlanWithSite,
    pub adjacent_plans: Vec<AdjacentPlan>,
}

/// Read side of the public pages.
///
/// Create one per request and drop it when the response is built: the cache
/// lives in the reader, keyed by (site, slug), and is never shared between
/// requests or tenants.
pub struct PublicSiteReader {
    store: Arc<dyn PlanStore>,
    sites: HashMap<String, Option<SiteData>>,
    plans: HashMap<(String, String), Option<PlanPage>>,
}

impl PublicSiteReader {
    pub fn for_request(store: Arc<dyn PlanStore>) -> Self {
        Self {
            store,
            sites: HashMap::new(),
            plans: HashMap::new(),
        }
    }

    pub async fn site_data(&mut self, site: &str) -> Result<Option<SiteData>, DatabaseError> {
        if let Some(hit) = self.sites.get(site) {
            return Ok(hit.clone());
        }

        let key = SiteKey::parse(site);
        let data = match self.store.find_site_by_key(&key).await? {
            Some(site) => {
                let plans = self.store.list_plans_for_site(site.id, true).await?;
                Some(SiteData { site, plans })
            }
            None => None,
        };

        self.sites.insert(site.to_string(), data.clone());
        Ok(data)
    }

    pub async fn plan_data(&mut self, site: &str, slug: &str) -> Result<Option<PlanPage>, DatabaseError> {
        let cache_key = (site.to_string(), slug.to_string());
        if let Some(hit) = self.plans.get(&cache_key) {
            return Ok(hit.clone());
        }

        let key = SiteKey::parse(site);
        let page = match self.store.find_published_plan(&key, slug).await? {
            Some(data) => {
                let adjacent_plans = self.store.list_adjacent_plans(&key, data.plan.id).await?;
                Some(PlanPage { data, adjacent_plans })
            }
            None => None,
        };

        self.plans.insert(cache_key, page.clone());
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::PlanChanges;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn resolves_by_subdomain_or_custom_domain() {
        let ctx = TestContext::new().await;
        let site = ctx
            .store
            .insert_site(ctx.alice.id, Some("docs"), Some("docs.example.com"))
            .await
            .unwrap();
        ctx.seed_plan_on(site.id, "intro", true).await;

        let mut reader = PublicSiteReader::for_request(Arc::new(ctx.store.clone()));
        let by_sub = reader.site_data("docs").await.unwrap().unwrap();
        let by_domain = reader.site_data("docs.example.com").await.unwrap().unwrap();

        assert_eq!(by_sub.site.id, site.id);
        assert_eq!(by_domain.site.id, site.id);
        assert_eq!(by_sub.plans.len(), 1);
    }

    #[tokio::test]
    async fn unpublished_plans_are_not_served() {
        let ctx = TestContext::new().await;
        ctx.seed_plan("draft", false).await;

        let mut reader = PublicSiteReader::for_request(Arc::new(ctx.store.clone()));
        assert!(reader.plan_data("blog", "draft").await.unwrap().is_none());
        assert!(reader.site_data("blog").await.unwrap().unwrap().plans.is_empty());
    }

    #[tokio::test]
    async fn adjacent_plans_exclude_current_and_drafts() {
        let ctx = TestContext::new().await;
        ctx.seed_plan("one", true).await;
        ctx.seed_plan("two", true).await;
        ctx.seed_plan("draft", false).await;

        let mut reader = PublicSiteReader::for_request(Arc::new(ctx.store.clone()));
        let page = reader.plan_data("blog", "one").await.unwrap().unwrap();

        assert_eq!(page.data.plan.slug, "one");
        let slugs: Vec<_> = page.adjacent_plans.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["two"]);
    }

    #[tokio::test]
    async fn cache_is_scoped_to_one_reader() {
        let ctx = TestContext::new().await;
        let plan = ctx.seed_plan("hello", true).await;
        let store: Arc<dyn PlanStore> = Arc::new(ctx.store.clone());

        let mut first = PublicSiteReader::for_request(store.clone());
        assert!(first.plan_data("blog", "hello").await.unwrap().is_some());

        let unpublish = PlanChanges {
            published: Some(false),
            ..Default::default()
        };
        ctx.store
            .update_plan_for_owner(ctx.alice.id, plan.id, &unpublish)
            .await
            .unwrap();

        // Same request still sees its own snapshot
        assert!(first.plan_data("blog", "hello").await.unwrap().is_some());

        let mut second = PublicSiteReader::for_request(store);
        assert!(second.plan_data("blog", "hello").await.unwrap().is_none());
    }
}
