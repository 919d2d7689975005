use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Roles are written as `Admin`/`Instructor`; lowercase spellings from older
/// records are still recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "instructor")]
    Instructor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Instructor => "Instructor",
        }
    }
}

/// Stored account as seen by role checks. Everything but the key and the
/// role stays untyped so that odd records still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    /// Absent for ordinary accounts. Kept raw since other tools write
    /// values such as `default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role
            .as_ref()
            .and_then(Value::as_str)
            .is_some_and(|stored| stored.eq_ignore_ascii_case(role.as_str()))
    }
}

/// Body of `POST /users`. A `role` in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
