use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::services::CallerId;

const SESSION_COOKIE: &str = "session-token";

/// Authenticated user context extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn caller(&self) -> CallerId {
        CallerId(self.user_id)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Session middleware: resolves the caller or answers 401
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token).map_err(|e| {
        tracing::debug!("rejected session token: {}", e);
        ApiError::unauthorized("Invalid or expired session")
    })?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!(user_id = %auth_user.user_id, "session resolved");
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Bearer token from the Authorization header, falling back to the session cookie
fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| "Authorization header must use Bearer token format".to_string())?;
        if token.trim().is_empty() {
            return Err("Empty session token".to_string());
        }
        return Ok(token.trim().to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| "Missing session".to_string())
}
