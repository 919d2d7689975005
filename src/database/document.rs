use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::manager::DatabaseError;
use crate::filter::ID_FIELD;

/// A schema-less record. The identifier is carried in the `_id` field.
pub type Document = Map<String, Value>;

/// The four logical collections of the camp database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Classes,
    Instructors,
    Users,
    Carts,
}

impl Collection {
    pub const ALL: [Collection; 4] = [Collection::Classes, Collection::Instructors, Collection::Users, Collection::Carts];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Classes => "classes",
            Collection::Instructors => "instructors",
            Collection::Users => "users",
            Collection::Carts => "carts",
        }
    }

    pub fn from_name(name: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.table_name() == name)
    }

    /// Field that must be unique across the collection, if any.
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("email"),
            Collection::Carts => Some("booked_id"),
            Collection::Classes | Collection::Instructors => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertResult {
    pub fn new(inserted_id: Uuid) -> Self {
        Self { acknowledged: true, inserted_id }
    }
}

/// Mutation summary for a field update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self { acknowledged: true, matched_count, modified_count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self { acknowledged: true, deleted_count }
    }
}

/// Serialize a value into a document, dropping any caller-supplied `_id`.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        other => Err(DatabaseError::QueryError(format!("document must be a JSON object, got {}", other))),
    }
}

/// Attach the identifier to stored data, producing the wire document.
pub fn with_id(id: Uuid, mut data: Document) -> Document {
    data.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summaries_use_driver_field_names() {
        let update = serde_json::to_value(UpdateResult::new(1, 0)).unwrap();
        assert_eq!(update, json!({ "acknowledged": true, "matchedCount": 1, "modifiedCount": 0 }));

        let delete = serde_json::to_value(DeleteResult::new(1)).unwrap();
        assert_eq!(delete, json!({ "acknowledged": true, "deletedCount": 1 }));

        let id = Uuid::new_v4();
        let insert = serde_json::to_value(InsertResult::new(id)).unwrap();
        assert_eq!(insert["insertedId"], json!(id.to_string()));
    }

    #[test]
    fn to_document_strips_id_and_rejects_scalars() {
        let doc = to_document(&json!({ "_id": "abc", "email": "a@x.com" })).unwrap();
        assert!(doc.get("_id").is_none());
        assert_eq!(doc["email"], json!("a@x.com"));
        assert!(to_document(&json!(5)).is_err());
    }

    #[test]
    fn unique_keys_per_collection() {
        assert_eq!(Collection::Users.unique_key(), Some("email"));
        assert_eq!(Collection::Carts.unique_key(), Some("booked_id"));
        assert_eq!(Collection::Classes.unique_key(), None);
        assert_eq!(Collection::Instructors.to_string(), "instructors");
        assert_eq!(Collection::from_name("carts"), Some(Collection::Carts));
        assert_eq!(Collection::from_name("tenants"), None);
    }
}
