use axum::{extract::State, Json};
use tracing::debug;

use crate::database::models::NewClassOffering;
use crate::database::{Document, InsertResult};
use crate::error::ApiResult;
use crate::handlers::EmailQuery;
use crate::middleware::{AuthUser, JsonBody, QueryParams};
use crate::state::AppState;

/// GET /classes?email= - classes owned by the token's email
pub async fn classes_by_email(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let Some(email) = query.email else {
        return Ok(Json(vec![]));
    };
    user.require_email(&email)?;
    Ok(Json(state.classes.list_by_email(&email).await?))
}

/// POST /class - submit a class for review
pub async fn class_post(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(class): JsonBody<NewClassOffering>,
) -> ApiResult<Json<InsertResult>> {
    debug!(token_email = ?user.email, owner = %class.email, "class submission");
    Ok(Json(state.classes.create(class).await?))
}

/// GET /pending - every class awaiting review
///
/// Any valid token may list pending classes; an `email` query is accepted
/// but not compared with the token.
pub async fn pending_get(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.classes.pending().await?))
}
