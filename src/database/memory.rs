use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{with_id, Collection, DeleteResult, Document, InsertResult, UpdateResult};
use super::manager::DatabaseError;
use super::store::DocumentStore;
use crate::filter::filter_where::json_eq;
use crate::filter::{Filter, ID_FIELD};

/// In-process store for development and tests. Documents are kept in
/// insertion order per collection behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert documents with generated identifiers, returning them.
    pub async fn seed(&self, collection: Collection, documents: Vec<Document>) -> Vec<Uuid> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        documents
            .into_iter()
            .map(|mut doc| {
                doc.remove(ID_FIELD);
                let id = Uuid::new_v4();
                docs.push(with_id(id, doc));
                id
            })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(match collections.get(&collection) {
            Some(docs) => filter.apply(docs.iter()),
            None => vec![],
        })
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertResult, DatabaseError> {
        document.remove(ID_FIELD);
        let id = Uuid::new_v4();
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(with_id(id, document));
        Ok(InsertResult::new(id))
    }

    async fn insert_unique(&self, collection: Collection, mut document: Document) -> Result<Option<InsertResult>, DatabaseError> {
        let key = collection
            .unique_key()
            .ok_or_else(|| DatabaseError::QueryError(format!("collection {} has no unique key", collection)))?;

        document.remove(ID_FIELD);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if let Some(value) = document.get(key) {
            if docs.iter().any(|d| d.get(key).is_some_and(|existing| json_eq(existing, value))) {
                return Ok(None);
            }
        }

        let id = Uuid::new_v4();
        docs.push(with_id(id, document));
        Ok(Some(InsertResult::new(id)))
    }

    async fn update_one(&self, collection: Collection, filter: &Filter, mut set: Document) -> Result<UpdateResult, DatabaseError> {
        set.remove(ID_FIELD);
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter.matches(d)))
        else {
            return Ok(UpdateResult::new(0, 0));
        };

        let changed = set
            .iter()
            .any(|(k, v)| !doc.get(k).is_some_and(|existing| json_eq(existing, v)));
        if changed {
            for (k, v) in set {
                doc.insert(k, v);
            }
        }
        Ok(UpdateResult::new(1, u64::from(changed)))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteResult::new(0));
        };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }

    async fn ensure_collections(&self) -> Result<(), DatabaseError> {
        let mut collections = self.collections.write().await;
        for collection in Collection::ALL {
            collections.entry(collection).or_default();
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_and_find_by_id() {
        let store = MemoryStore::new();
        let result = store.insert_one(Collection::Classes, doc(json!({ "title": "Piano" }))).await.unwrap();

        let found = store.find(Collection::Classes, &Filter::by_id(result.inserted_id)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["_id"], json!(result.inserted_id.to_string()));
        assert_eq!(found[0]["title"], json!("Piano"));

        let missing = store.find(Collection::Classes, &Filter::by_id(Uuid::new_v4())).await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn insert_unique_refuses_duplicates() {
        let store = MemoryStore::new();
        let first = store.insert_unique(Collection::Users, doc(json!({ "email": "a@x.com" }))).await.unwrap();
        assert!(first.is_some());
        let second = store.insert_unique(Collection::Users, doc(json!({ "email": "a@x.com" }))).await.unwrap();
        assert!(second.is_none());

        let count = store.count(Collection::Users, &Filter::new().eq("email", "a@x.com")).await.unwrap();
        assert_eq!(count, 1);

        assert!(store.insert_unique(Collection::Classes, doc(json!({}))).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_unique_inserts_keep_one() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let mut handles = vec![];
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_unique(Collection::Carts, doc(json!({ "booked_id": "c1" }))).await.unwrap()
            }));
        }
        let mut created = 0;
        for h in handles {
            if h.await.unwrap().is_some() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn update_reports_matched_and_modified() {
        let store = MemoryStore::new();
        let id = store.insert_one(Collection::Classes, doc(json!({ "status": "pending" }))).await.unwrap().inserted_id;

        let first = store
            .update_one(Collection::Classes, &Filter::by_id(id), doc(json!({ "status": "Approved" })))
            .await
            .unwrap();
        assert_eq!(first, UpdateResult::new(1, 1));

        let second = store
            .update_one(Collection::Classes, &Filter::by_id(id), doc(json!({ "status": "Approved" })))
            .await
            .unwrap();
        assert_eq!(second, UpdateResult::new(1, 0));

        let none = store
            .update_one(Collection::Classes, &Filter::by_id(Uuid::new_v4()), doc(json!({ "status": "Deny" })))
            .await
            .unwrap();
        assert_eq!(none, UpdateResult::new(0, 0));
    }

    #[tokio::test]
    async fn delete_removes_one_document() {
        let store = MemoryStore::new();
        let ids = store
            .seed(Collection::Carts, vec![doc(json!({ "booked_id": "a" })), doc(json!({ "booked_id": "b" }))])
            .await;

        let deleted = store.delete_one(Collection::Carts, &Filter::by_id(ids[0])).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
        let again = store.delete_one(Collection::Carts, &Filter::by_id(ids[0])).await.unwrap();
        assert_eq!(again.deleted_count, 0);
        assert_eq!(store.count(Collection::Carts, &Filter::new()).await.unwrap(), 1);
    }
}
