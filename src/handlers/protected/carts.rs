use axum::{extract::State, Json};
use tracing::debug;

use crate::database::{DeleteResult, Document};
use crate::error::ApiResult;
use crate::handlers::{parse_id, EmailQuery};
use crate::middleware::{AuthUser, PathParam, QueryParams};
use crate::state::AppState;

/// GET /carts?email= - the caller's cart
pub async fn carts_get(
    State(state): State<AppState>,
    user: AuthUser,
    QueryParams(query): QueryParams<EmailQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let Some(email) = query.email else {
        return Ok(Json(vec![]));
    };
    user.require_email(&email)?;
    Ok(Json(state.carts.list_by_email(&email).await?))
}

/// DELETE /carts/:id
pub async fn cart_delete(State(state): State<AppState>, user: AuthUser, PathParam(id): PathParam<String>) -> ApiResult<Json<DeleteResult>> {
    let id = parse_id(&id)?;
    debug!(token_email = ?user.email, cart_id = %id, "cart delete");
    Ok(Json(state.carts.delete(id).await?))
}
