use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// JSON request body deserialised into `T`, with rejections rendered as
/// `ApiError` instead of axum's plain-text defaults.
///
/// Syntax errors, a wrong content type and non-object bodies are
/// `INVALID_JSON`; a missing required field is a `VALIDATION_ERROR` naming
/// that field.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;

        if !value.is_object() {
            return Err(ApiError::invalid_json("Request body must be a JSON object"));
        }

        serde_json::from_value(value).map(JsonBody).map_err(body_error)
    }
}

fn body_error(err: serde_json::Error) -> ApiError {
    let message = err.to_string();
    match missing_field_name(&message) {
        Some(field) => ApiError::missing_field(field),
        None => ApiError::invalid_json(message),
    }
}

// serde reports a missing field as "missing field `name`".
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}
