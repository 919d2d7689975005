// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token via the `AuthUser` extractor).
// Routes in both tiers share paths in places, so protection is declared per
// handler argument rather than per router layer.
pub mod protected; // Tier 2: valid bearer token required
pub mod public;    // Tier 1: no authentication

use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::InsertResult;
use crate::error::ApiError;
use crate::services::CreateOutcome;

/// `?email=` on the email-scoped list routes.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Path identifiers must be well-formed UUIDs.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("invalid identifier: {}", raw)))
}

/// Insert summary on success, `{"message": sentinel}` when refused as a duplicate.
pub(crate) fn create_response(outcome: CreateOutcome, sentinel: &str) -> Value {
    match outcome {
        CreateOutcome::Created(inserted) => insert_summary(inserted),
        CreateOutcome::AlreadyExists => json!({ "message": sentinel }),
    }
}

pub(crate) fn insert_summary(inserted: InsertResult) -> Value {
    json!(inserted)
}
