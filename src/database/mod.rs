pub mod document;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use document::{Collection, DeleteResult, Document, InsertResult, UpdateResult};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;
pub use store::DocumentStore;
