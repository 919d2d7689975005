use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiResult;
use crate::middleware::JsonBody;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /jwt - sign the posted object as a bearer token.
///
/// Input: any JSON object; a string `email` becomes the identity claim.
/// Output: `{ "token": "eyJhbGciOiJIUzI1NiI..." }`, valid for the configured
/// lifetime. Nothing about the caller is checked.
pub async fn jwt_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.tokens.issue(payload)?;
    Ok(Json(TokenResponse { token }))
}
