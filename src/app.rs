use axum::{
    http::{HeaderValue, Method, Uri},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::state::AppState;

/// The full HTTP surface. Protected handlers authenticate through their
/// `AuthUser` argument, so public and protected methods can share a path.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/jwt", post(public::jwt_post))
        .merge(class_routes())
        .merge(instructor_routes())
        .merge(user_routes())
        .merge(cart_routes())
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(protected::classes_by_email))
        .route("/classes/all", get(public::classes_all))
        .route("/classes/:id", get(public::class_get))
        .route("/class", post(protected::class_post))
        .route("/home/classes", get(public::home_classes))
        .route("/pending", get(protected::pending_get))
        .route("/approve/:id", patch(public::approve_patch))
        .route("/deny/:id", patch(public::deny_patch))
}

fn instructor_routes() -> Router<AppState> {
    Router::new()
        .route("/instructors", get(public::instructors_list))
        .route("/instructors/:id", get(public::instructor_get))
        .route("/home/instructors", get(public::home_instructors))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(public::users_get).post(public::users_post))
        // GET takes an email, PATCH an identifier.
        .route("/users/admin/:key", get(protected::admin_check).patch(public::make_admin))
        .route("/users/instructor/:email", get(protected::instructor_check))
        .route("/users/Instructor/:id", patch(public::make_instructor))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/carts", get(protected::carts_get).post(public::carts_post))
        .route("/carts/:id", delete(protected::cart_delete))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
