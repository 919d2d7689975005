use axum::{extract::State, Json};
use serde_json::Value;

use crate::database::models::{NewUser, UserRole};
use crate::database::{Document, UpdateResult};
use crate::error::ApiResult;
use crate::handlers::{create_response, parse_id};
use crate::middleware::{JsonBody, PathParam};
use crate::state::AppState;

/// GET /users
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.users.list_all().await?))
}

/// POST /users - register unless the email is taken
///
/// A taken email answers 200 with `{"message": "user already exists"}`.
pub async fn users_post(State(state): State<AppState>, JsonBody(user): JsonBody<NewUser>) -> ApiResult<Json<Value>> {
    let outcome = state.users.create(user).await?;
    Ok(Json(create_response(outcome, "user already exists")))
}

/// PATCH /users/admin/:id
pub async fn make_admin(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.set_role(id, UserRole::Admin).await?))
}

/// PATCH /users/Instructor/:id
pub async fn make_instructor(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.set_role(id, UserRole::Instructor).await?))
}
