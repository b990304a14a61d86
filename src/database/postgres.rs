use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    AdjacentPlan, DeletedPlan, NewPlan, Plan, PlanChanges, PlanWithSite, Site, SiteDomains, SiteKey,
};
use super::store::PlanStore;
use crate::config;

/// Plan columns followed by the owning site's columns, prefixed with `site_`
const PLAN_SITE_COLUMNS: &str = r#"
    p.id, p.site_id, p.title, p.description, p.content, p.slug,
    p.image, p.image_blurhash, p.published, p.created_at, p.updated_at,
    s.user_id AS site_user_id, s.name AS site_name, s.description AS site_description,
    s.subdomain AS site_subdomain, s.custom_domain AS site_custom_domain,
    s.created_at AS site_created_at, s.updated_at AS site_updated_at
"#;

const SITE_COLUMNS: &str =
    "id, user_id, name, description, subdomain, custom_domain, created_at, updated_at";

#[derive(Debug, FromRow)]
struct PlanSiteRow {
    id: Uuid,
    site_id: Uuid,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    slug: String,
    image: Option<String>,
    image_blurhash: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    site_user_id: Uuid,
    site_name: Option<String>,
    site_description: Option<String>,
    site_subdomain: Option<String>,
    site_custom_domain: Option<String>,
    site_created_at: DateTime<Utc>,
    site_updated_at: DateTime<Utc>,
}

impl From<PlanSiteRow> for PlanWithSite {
    fn from(row: PlanSiteRow) -> Self {
        PlanWithSite {
            site: Site {
                id: row.site_id,
                user_id: row.site_user_id,
                name: row.site_name,
                description: row.site_description,
                subdomain: row.site_subdomain,
                custom_domain: row.site_custom_domain,
                created_at: row.site_created_at,
                updated_at: row.site_updated_at,
            },
            plan: Plan {
                id: row.id,
                site_id: row.site_id,
                title: row.title,
                description: row.description,
                content: row.content,
                slug: row.slug,
                image: row.image,
                image_blurhash: row.image_blurhash,
                published: row.published,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Column a [`SiteKey`] filters on
fn key_column(key: &SiteKey) -> &'static str {
    match key {
        SiteKey::Subdomain(_) => "subdomain",
        SiteKey::CustomDomain(_) => "custom_domain",
    }
}

fn log_query(sql: &str) {
    if config::config().database.enable_query_logging {
        tracing::debug!(sql = sql.trim(), "executing query");
    }
}

/// Postgres-backed [`PlanStore`]
#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_site_for_owner(&self, owner: Uuid, site_id: Uuid) -> Result<Option<Site>, DatabaseError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = $1 AND user_id = $2");
        log_query(&sql);
        let site = sqlx::query_as::<_, Site>(&sql)
            .bind(site_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    async fn find_plan_for_owner(&self, owner: Uuid, plan_id: Uuid) -> Result<Option<PlanWithSite>, DatabaseError> {
        let sql = format!(
            "SELECT {PLAN_SITE_COLUMNS} FROM plans p JOIN sites s ON s.id = p.site_id \
             WHERE p.id = $1 AND s.user_id = $2"
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, PlanSiteRow>(&sql)
            .bind(plan_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PlanWithSite::from))
    }

    async fn list_plans_for_site(&self, site_id: Uuid, published: bool) -> Result<Vec<Plan>, DatabaseError> {
        let sql = "SELECT * FROM plans WHERE site_id = $1 AND published = $2 ORDER BY created_at DESC";
        log_query(sql);
        let plans = sqlx::query_as::<_, Plan>(sql)
            .bind(site_id)
            .bind(published)
            .fetch_all(&self.pool)
            .await?;
        Ok(plans)
    }

    async fn create_plan(&self, plan: NewPlan) -> Result<Plan, DatabaseError> {
        let sql = r#"
            INSERT INTO plans (id, site_id, slug, image, image_blurhash, published)
            VALUES ($1, $2, $3, $4, $5, false)
            RETURNING *
        "#;
        log_query(sql);
        let created = sqlx::query_as::<_, Plan>(sql)
            .bind(Uuid::new_v4())
            .bind(plan.site_id)
            .bind(&plan.slug)
            .bind(&plan.image)
            .bind(&plan.image_blurhash)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_plan_for_owner(
        &self,
        owner: Uuid,
        plan_id: Uuid,
        changes: &PlanChanges,
    ) -> Result<Option<PlanWithSite>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE plans AS p SET
                title = COALESCE($3, p.title),
                description = COALESCE($4, p.description),
                content = COALESCE($5, p.content),
                slug = COALESCE($6, p.slug),
                image = COALESCE($7, p.image),
                image_blurhash = COALESCE($8, p.image_blurhash),
                published = COALESCE($9, p.published),
                updated_at = now()
            FROM sites s
            WHERE p.id = $1 AND s.id = p.site_id AND s.user_id = $2
            RETURNING {PLAN_SITE_COLUMNS}
            "#
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, PlanSiteRow>(&sql)
            .bind(plan_id)
            .bind(owner)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.content)
            .bind(&changes.slug)
            .bind(&changes.image)
            .bind(&changes.image_blurhash)
            .bind(changes.published)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PlanWithSite::from))
    }

    async fn delete_plan_for_owner(&self, owner: Uuid, plan_id: Uuid) -> Result<Option<DeletedPlan>, DatabaseError> {
        let sql = format!(
            "DELETE FROM plans AS p USING sites s \
             WHERE p.id = $1 AND s.id = p.site_id AND s.user_id = $2 \
             RETURNING {PLAN_SITE_COLUMNS}"
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, PlanSiteRow>(&sql)
            .bind(plan_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| {
            let PlanWithSite { plan, site } = row.into();
            DeletedPlan {
                plan,
                domains: SiteDomains {
                    subdomain: site.subdomain,
                    custom_domain: site.custom_domain,
                },
            }
        }))
    }

    async fn find_site_by_key(&self, key: &SiteKey) -> Result<Option<Site>, DatabaseError> {
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE {} = $1", key_column(key));
        log_query(&sql);
        let site = sqlx::query_as::<_, Site>(&sql)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(site)
    }

    async fn find_published_plan(&self, key: &SiteKey, slug: &str) -> Result<Option<PlanWithSite>, DatabaseError> {
        let sql = format!(
            "SELECT {PLAN_SITE_COLUMNS} FROM plans p JOIN sites s ON s.id = p.site_id \
             WHERE s.{} = $1 AND p.slug = $2 AND p.published",
            key_column(key)
        );
        log_query(&sql);
        let row = sqlx::query_as::<_, PlanSiteRow>(&sql)
            .bind(key.as_str())
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PlanWithSite::from))
    }

    async fn list_adjacent_plans(&self, key: &SiteKey, exclude: Uuid) -> Result<Vec<AdjacentPlan>, DatabaseError> {
        let sql = format!(
            "SELECT p.slug, p.title, p.created_at, p.description, p.image, p.image_blurhash \
             FROM plans p JOIN sites s ON s.id = p.site_id \
             WHERE s.{} = $1 AND p.published AND p.id <> $2 \
             ORDER BY p.created_at DESC",
            key_column(key)
        );
        log_query(&sql);
        let plans = sqlx::query_as::<_, AdjacentPlan>(&sql)
            .bind(key.as_str())
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;
        Ok(plans)
    }
}
