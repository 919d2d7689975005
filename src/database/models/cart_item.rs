use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::lenient;

/// Body of `POST /carts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    /// Identifier of the booked class.
    pub booked_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
