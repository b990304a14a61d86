// handlers/protected/plan.rs - GET/POST/PUT/DELETE /api/plan

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::Method,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Plan, PlanWithSite};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{PlanListing, PlanUpdate};

pub const ALLOWED_METHODS: &str = "GET, POST, DELETE, PUT";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuery {
    pub plan_id: Option<String>,
    pub site_id: Option<String>,
    /// `true` (default) or `false`
    pub published: Option<String>,
}

/// Body of `PUT /api/plan`. Site and domain fields sent by older editors are
/// ignored; hostnames are always read from the stored site.
#[derive(Debug, Deserialize)]
pub struct UpdatePlanBody {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub published: Option<bool>,
}

impl From<UpdatePlanBody> for PlanUpdate {
    fn from(body: UpdatePlanBody) -> Self {
        PlanUpdate {
            title: body.title,
            description: body.description,
            content: body.content,
            slug: body.slug,
            image: body.image,
            published: body.published,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanRead {
    Single(PlanWithSite),
    Listing(PlanListing),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPlan {
    pub plan_id: Uuid,
}

/// GET /api/plan?planId= - one plan with its site
/// GET /api/plan?siteId=&published= - plans of a site, newest first
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> ApiResult<PlanRead> {
    if let Some(plan_id) = query.plan_id.as_deref() {
        let plan = state.gateway.get_plan(user.caller(), Some(plan_id)).await?;
        return Ok(ApiResponse::success(PlanRead::Single(plan)));
    }

    let published = parse_published(query.published.as_deref())?;
    let listing = state
        .gateway
        .list_plans(user.caller(), query.site_id.as_deref(), published)
        .await?;
    Ok(ApiResponse::success(PlanRead::Listing(listing)))
}

/// POST /api/plan?siteId= - create an unpublished plan
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> ApiResult<CreatedPlan> {
    let plan = state
        .gateway
        .create_plan_for_site(user.caller(), query.site_id.as_deref())
        .await?;
    Ok(ApiResponse::created(CreatedPlan { plan_id: plan.id }))
}

/// PUT /api/plan - partial update, then revalidate the site's hostnames
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<UpdatePlanBody>, JsonRejection>,
) -> ApiResult<Plan> {
    let Json(mut body) = body.map_err(|rejection| {
        tracing::debug!("rejected plan update body: {}", rejection);
        ApiError::bad_request(format!("Invalid plan body: {}", rejection.body_text()))
    })?;
    let plan_id = body.id.take();
    let mutation = state
        .gateway
        .update_plan(user.caller(), plan_id.as_deref(), body.into())
        .await?;
    Ok(ApiResponse::success(mutation.value).with_warnings(mutation.warnings))
}

/// DELETE /api/plan?planId=
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> ApiResult<()> {
    let mutation = state
        .gateway
        .delete_plan(user.caller(), query.plan_id.as_deref())
        .await?;
    Ok(ApiResponse::success(()).with_warnings(mutation.warnings))
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method, ALLOWED_METHODS)
}

fn parse_published(raw: Option<&str>) -> Result<Option<bool>, ApiError> {
    match raw {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(ApiError::bad_request("Query parameter 'published' must be true or false")),
    }
}
