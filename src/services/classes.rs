use std::sync::Arc;

use serde_json::{json, Map};
use tracing::info;
use uuid::Uuid;

use crate::database::models::{ClassStatus, NewClassOffering};
use crate::database::{Collection, DatabaseError, Document, DocumentStore, InsertResult, Repository, UpdateResult};
use crate::filter::Filter;

const RANKING_FIELD: &str = "enrolled";

#[derive(Clone)]
pub struct ClassService {
    repo: Repository<Document>,
}

impl ClassService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repository::new(Collection::Classes, store),
        }
    }

    /// Classes owned by the given instructor email.
    pub async fn list_by_email(&self, email: &str) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::new().eq("email", email)).await
    }

    pub async fn list_all(&self) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::new()).await
    }

    /// Zero or one class.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::by_id(id)).await
    }

    /// New classes always enter review as pending, whatever the body says.
    pub async fn create(&self, mut class: NewClassOffering) -> Result<InsertResult, DatabaseError> {
        class.extra.insert("status".to_string(), json!(ClassStatus::Pending));
        let inserted = self.repo.insert(&class).await?;
        info!(class_id = %inserted.inserted_id, owner = %class.email, "class submitted for review");
        Ok(inserted)
    }

    /// Most-enrolled classes with at least one student.
    pub async fn home(&self, limit: i64) -> Result<Vec<Document>, DatabaseError> {
        let filter = Filter::new().gt(RANKING_FIELD, 0).sort_desc(RANKING_FIELD).limit(limit);
        self.repo.select_any(&filter).await
    }

    pub async fn pending(&self) -> Result<Vec<Document>, DatabaseError> {
        self.repo
            .select_any(&Filter::new().eq("status", ClassStatus::Pending.as_str()))
            .await
    }

    pub async fn set_status(&self, id: Uuid, status: ClassStatus) -> Result<UpdateResult, DatabaseError> {
        let mut set = Map::new();
        set.insert("status".to_string(), json!(status));
        let result = self.repo.update_fields(&Filter::by_id(id), set).await?;
        info!(
            class_id = %id,
            status = status.as_str(),
            matched = result.matched_count,
            modified = result.modified_count,
            "class status updated"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::{json, Value};

    fn doc(v: Value) -> crate::database::Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_forces_pending() {
        let store = Arc::new(MemoryStore::new());
        let service = ClassService::new(store);

        let body: NewClassOffering = serde_json::from_value(json!({
            "email": "t@x.com",
            "title": "Cello",
            "status": "Approved"
        }))
        .unwrap();
        let inserted = service.create(body).await.unwrap();

        let stored = service.get_by_id(inserted.inserted_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["status"], "pending");
        assert_eq!(stored[0]["enrolled"], 0);
        assert_eq!(service.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn home_ranks_by_enrollment() {
        let store = Arc::new(MemoryStore::new());
        let mut docs = vec![doc(json!({ "title": "empty", "enrolled": 0 }))];
        for n in 1..=8 {
            docs.push(doc(json!({ "title": format!("c{n}"), "enrolled": n })));
        }
        store.seed(Collection::Classes, docs).await;

        let top = ClassService::new(store).home(6).await.unwrap();
        let enrolled: Vec<i64> = top.iter().filter_map(|c| c["enrolled"].as_i64()).collect();
        assert_eq!(enrolled, vec![8, 7, 6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn set_status_reports_no_change_on_repeat() {
        let store = Arc::new(MemoryStore::new());
        let ids = store
            .seed(Collection::Classes, vec![doc(json!({ "title": "Flute", "status": "pending" }))])
            .await;
        let service = ClassService::new(store);

        let first = service.set_status(ids[0], ClassStatus::Approved).await.unwrap();
        assert_eq!((first.matched_count, first.modified_count), (1, 1));
        let second = service.set_status(ids[0], ClassStatus::Approved).await.unwrap();
        assert_eq!((second.matched_count, second.modified_count), (1, 0));

        let missing = service.set_status(Uuid::new_v4(), ClassStatus::Deny).await.unwrap();
        assert_eq!(missing.matched_count, 0);

        let stored = service.get_by_id(ids[0]).await.unwrap();
        assert_eq!(stored[0]["status"], "Approved");
    }

    #[tokio::test]
    async fn odd_records_are_returned_as_stored() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Collection::Classes,
                vec![
                    doc(json!({ "title": "Harp", "enrolled": 12.0, "status": "Approved", "price": "90" })),
                    doc(json!({ "title": "Oboe", "enrolled": 3, "status": 7 })),
                ],
            )
            .await;
        let service = ClassService::new(store);

        let all = service.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        let top = service.home(6).await.unwrap();
        assert_eq!(top[0]["title"], "Harp");
        assert_eq!(top[0]["enrolled"], json!(12.0));
        assert_eq!(top[0]["price"], "90");
    }
}
