use axum::{extract::State, Json};
use serde::Serialize;

use crate::database::models::UserRole;
use crate::error::ApiResult;
use crate::middleware::{AuthUser, PathParam};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AdminCheck {
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct InstructorCheck {
    pub instructor: bool,
}

/// GET /users/admin/:email
pub async fn admin_check(State(state): State<AppState>, user: AuthUser, PathParam(email): PathParam<String>) -> ApiResult<Json<AdminCheck>> {
    let admin = role_for_self(&state, &user, &email, UserRole::Admin).await?;
    Ok(Json(AdminCheck { admin }))
}

/// GET /users/instructor/:email
pub async fn instructor_check(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(email): PathParam<String>,
) -> ApiResult<Json<InstructorCheck>> {
    let instructor = role_for_self(&state, &user, &email, UserRole::Instructor).await?;
    Ok(Json(InstructorCheck { instructor }))
}

// Asking about someone else's role is answered `false` without a lookup.
async fn role_for_self(state: &AppState, user: &AuthUser, email: &str, role: UserRole) -> ApiResult<bool> {
    if !user.is(email) {
        return Ok(false);
    }
    Ok(state.users.has_role(email, role).await?)
}
