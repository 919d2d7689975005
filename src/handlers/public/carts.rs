use axum::{extract::State, Json};
use serde_json::Value;

use crate::database::models::NewCartItem;
use crate::error::ApiResult;
use crate::handlers::create_response;
use crate::middleware::JsonBody;
use crate::state::AppState;

/// POST /carts - add a class to a cart unless it is already booked
pub async fn carts_post(State(state): State<AppState>, JsonBody(item): JsonBody<NewCartItem>) -> ApiResult<Json<Value>> {
    let outcome = state.carts.create(item).await?;
    Ok(Json(create_response(outcome, "cart already exists")))
}
