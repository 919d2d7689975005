use axum::{extract::State, Json};

use crate::database::Document;
use crate::error::ApiResult;
use crate::handlers::parse_id;
use crate::middleware::PathParam;
use crate::state::AppState;

pub async fn instructors_list(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.instructors.list_all().await?))
}

pub async fn instructor_get(State(state): State<AppState>, PathParam(id): PathParam<String>) -> ApiResult<Json<Vec<Document>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.instructors.get_by_id(id).await?))
}

pub async fn home_instructors(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.instructors.home(state.home_page_limit()).await?))
}
