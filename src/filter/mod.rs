pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use error::FilterError;

/// Document identifier field, mapped to the key column in SQL.
pub const ID_FIELD: &str = "_id";
