use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity taken from a verified bearer token.
///
/// Declaring `AuthUser` as a handler argument makes the route protected:
/// a missing, malformed, expired or forged token rejects the request with
/// 401 before the handler body runs.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { email: claims.email }
    }
}

impl AuthUser {
    /// Whether the token asserts exactly this email.
    pub fn is(&self, email: &str) -> bool {
        self.email.as_deref() == Some(email)
    }

    /// 403 unless the token asserts exactly this email.
    pub fn require_email(&self, email: &str) -> Result<(), ApiError> {
        if self.is(email) {
            return Ok(());
        }
        warn!(token_email = ?self.email, requested = email, "email mismatch on scoped route");
        Err(ApiError::forbidden("forbidden access"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = extract_jwt_from_headers(&parts.headers).map_err(|msg| {
            warn!("{} on {}", msg, parts.uri.path());
            ApiError::unauthorized("unauthorized access")
        })?;

        let claims = state.tokens.verify(token).map_err(|e| {
            warn!("token rejected on {}: {}", parts.uri.path(), e);
            ApiError::unauthorized("unauthorized access")
        })?;

        Ok(AuthUser::from(claims))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers.get(AUTHORIZATION).ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
