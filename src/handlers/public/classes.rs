use axum::{extract::State, Json};

use crate::database::models::ClassStatus;
use crate::database::{Document, UpdateResult};
use crate::error::ApiResult;
use crate::handlers::parse_id;
use crate::middleware::PathParam;
use crate::state::AppState;

/// GET /classes/all
pub async fn classes_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.classes.list_all().await?))
}

/// GET /classes/:id - zero or one class
pub async fn class_get(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Json<Vec<Document>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.classes.get_by_id(id).await?))
}

/// GET /home/classes - most enrolled first
pub async fn home_classes(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.classes.home(state.home_page_limit()).await?))
}

/// PATCH /approve/:id
pub async fn approve_patch(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    Ok(Json(state.classes.set_status(id, ClassStatus::Approved).await?))
}

/// PATCH /deny/:id
pub async fn deny_patch(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    Ok(Json(state.classes.set_status(id, ClassStatus::Deny).await?))
}
