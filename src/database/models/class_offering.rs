use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::lenient;

/// Review state of a class. `Pending` is the only non-terminal state.
/// Decisions are written as `Approved`/`Deny`; lowercase spellings from
/// older records are still recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassStatus {
    #[default]
    #[serde(rename = "pending", alias = "Pending")]
    Pending,
    #[serde(rename = "Approved", alias = "approved")]
    Approved,
    #[serde(rename = "Deny", alias = "deny")]
    Deny,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approved => "Approved",
            ClassStatus::Deny => "Deny",
        }
    }
}

/// Body of `POST /class`. Any `status` in the body lands in `extra` and is
/// overwritten on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassOffering {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub available_seats: Option<Number>,
    #[serde(default = "lenient::zero", deserialize_with = "lenient::count")]
    pub enrolled: Number,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
