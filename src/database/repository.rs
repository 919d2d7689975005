use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::database::document::{to_document, Collection, DeleteResult, Document, InsertResult, UpdateResult};
use crate::database::manager::DatabaseError;
use crate::database::store::DocumentStore;
use crate::filter::Filter;

/// View over one collection of the document store. `T` is the read shape:
/// a model for typed lookups or [`Document`] to pass records through as stored.
pub struct Repository<T> {
    collection: Collection,
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection,
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: DeserializeOwned + Serialize + Send,
{
    pub fn new(collection: Collection, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection,
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn select_any(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        self.store
            .find(self.collection, filter)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(Value::Object(doc)).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn select_one(&self, filter: &Filter) -> Result<Option<T>, DatabaseError> {
        let filter = filter.clone().limit(1);
        Ok(self.select_any(&filter).await?.into_iter().next())
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        self.store.count(self.collection, filter).await
    }

    pub async fn insert<N: Serialize>(&self, record: &N) -> Result<InsertResult, DatabaseError> {
        self.store.insert_one(self.collection, to_document(record)?).await
    }

    /// `None` when a record with the same unique key already exists.
    pub async fn insert_unique<N: Serialize>(&self, record: &N) -> Result<Option<InsertResult>, DatabaseError> {
        self.store.insert_unique(self.collection, to_document(record)?).await
    }

    pub async fn update_fields(&self, filter: &Filter, set: Document) -> Result<UpdateResult, DatabaseError> {
        self.store.update_one(self.collection, filter, set).await
    }

    pub async fn delete_one(&self, filter: &Filter) -> Result<DeleteResult, DatabaseError> {
        self.store.delete_one(self.collection, filter).await
    }
}
