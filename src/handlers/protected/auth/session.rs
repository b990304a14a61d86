use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /api/auth/whoami - Identity resolved from the current session
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<WhoAmI> {
    Ok(ApiResponse::success(WhoAmI {
        id: user.user_id,
        name: user.name,
        email: user.email,
    }))
}
