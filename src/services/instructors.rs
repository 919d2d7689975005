use std::sync::Arc;

use uuid::Uuid;

use crate::database::{Collection, DatabaseError, Document, DocumentStore, Repository};
use crate::filter::Filter;

const RANKING_FIELD: &str = "students_enrolled";

/// Read-only access to instructor profiles.
#[derive(Clone)]
pub struct InstructorService {
    repo: Repository<Document>,
}

impl InstructorService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repository::new(Collection::Instructors, store),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::new()).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::by_id(id)).await
    }

    pub async fn home(&self, limit: i64) -> Result<Vec<Document>, DatabaseError> {
        let filter = Filter::new().gt(RANKING_FIELD, 0).sort_desc(RANKING_FIELD).limit(limit);
        self.repo.select_any(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn home_skips_instructors_without_students() {
        let store = Arc::new(MemoryStore::new());
        let docs = [json!(0), json!(12.0), json!(3), json!(40)]
            .into_iter()
            .map(|n| json!({ "name": format!("i{n}"), "students_enrolled": n }).as_object().cloned().unwrap())
            .collect();
        store.seed(Collection::Instructors, docs).await;

        let top = InstructorService::new(store).home(6).await.unwrap();
        let counts: Vec<f64> = top.iter().filter_map(|i| i["students_enrolled"].as_f64()).collect();
        assert_eq!(counts, vec![40.0, 12.0, 3.0]);
        assert_eq!(top[1]["students_enrolled"], json!(12.0));
    }
}
