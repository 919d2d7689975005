use async_trait::async_trait;

use super::document::{Collection, DeleteResult, Document, InsertResult, UpdateResult};
use super::manager::DatabaseError;
use crate::filter::Filter;

/// Storage seam shared by request handlers. Every operation is a single
/// query or mutation; nothing coordinates across calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching `filter`, in filter order (insertion order by default).
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError>;

    /// Insert with a freshly generated identifier.
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertResult, DatabaseError>;

    /// Insert unless a document with the same value for the collection's
    /// unique key already exists; `None` when one does. The check and the
    /// insert are atomic.
    async fn insert_unique(&self, collection: Collection, document: Document) -> Result<Option<InsertResult>, DatabaseError>;

    /// Merge `set` into the first document matching `filter`. A field already
    /// holding the requested value counts as matched, not modified.
    async fn update_one(&self, collection: Collection, filter: &Filter, set: Document) -> Result<UpdateResult, DatabaseError>;

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, DatabaseError>;

    /// Create collections and unique indexes if missing. Idempotent.
    async fn ensure_collections(&self) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn close(&self);
}
