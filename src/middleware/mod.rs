pub mod auth;
pub mod json;
pub mod params;

pub use auth::AuthUser;
pub use json::JsonBody;
pub use params::{PathParam, QueryParams};
