use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::CreateOutcome;
use crate::database::models::NewCartItem;
use crate::database::{Collection, DatabaseError, DeleteResult, Document, DocumentStore, Repository};
use crate::filter::Filter;

#[derive(Clone)]
pub struct CartService {
    repo: Repository<Document>,
}

impl CartService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repository::new(Collection::Carts, store),
        }
    }

    pub async fn list_by_email(&self, email: &str) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::new().eq("email", email)).await
    }

    /// At most one cart item may reference a given class.
    pub async fn create(&self, item: NewCartItem) -> Result<CreateOutcome, DatabaseError> {
        let outcome = CreateOutcome::from(self.repo.insert_unique(&item).await?);
        match &outcome {
            CreateOutcome::Created(inserted) => info!(cart_id = %inserted.inserted_id, booked_id = %item.booked_id, "cart item added"),
            CreateOutcome::AlreadyExists => debug!(booked_id = %item.booked_id, "cart item already exists"),
        }
        Ok(outcome)
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeleteResult, DatabaseError> {
        let result = self.repo.delete_one(&Filter::by_id(id)).await?;
        info!(cart_id = %id, deleted = result.deleted_count, "cart item removed");
        Ok(result)
    }

    pub async fn count_by_booked_id(&self, booked_id: &str) -> Result<u64, DatabaseError> {
        self.repo.count(&Filter::new().eq("booked_id", booked_id)).await
    }
}
