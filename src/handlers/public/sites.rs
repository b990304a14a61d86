use axum::extract::{Path, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{PlanPage, PublicSiteReader, SiteData};

/// GET /sites/:site - site and its published plans
pub async fn site_get(State(state): State<AppState>, Path(site): Path<String>) -> ApiResult<SiteData> {
    let mut reader = PublicSiteReader::for_request(state.store.clone());
    let data = reader
        .site_data(&site)
        .await?
        .ok_or_else(|| ApiError::not_found("Site not found"))?;
    Ok(ApiResponse::success(data))
}

/// GET /sites/:site/:slug - published plan with adjacent plans
pub async fn plan_get(
    State(state): State<AppState>,
    Path((site, slug)): Path<(String, String)>,
) -> ApiResult<PlanPage> {
    let mut reader = PublicSiteReader::for_request(state.store.clone());
    let page = reader
        .plan_data(&site, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan not found"))?;
    Ok(ApiResponse::success(page))
}
