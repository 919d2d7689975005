use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::CreateOutcome;
use crate::database::models::{NewUser, User, UserRole};
use crate::database::{Collection, DatabaseError, Document, DocumentStore, Repository, UpdateResult};
use crate::filter::Filter;

#[derive(Clone)]
pub struct UserService {
    repo: Repository<Document>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repository::new(Collection::Users, store),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Document>, DatabaseError> {
        self.repo.select_any(&Filter::new()).await
    }

    /// Register a user unless the email is already taken. Roles are only
    /// granted through `set_role`.
    pub async fn create(&self, mut user: NewUser) -> Result<CreateOutcome, DatabaseError> {
        user.extra.remove("role");
        let outcome = CreateOutcome::from(self.repo.insert_unique(&user).await?);
        match &outcome {
            CreateOutcome::Created(inserted) => info!(user_id = %inserted.inserted_id, email = %user.email, "user registered"),
            CreateOutcome::AlreadyExists => debug!(email = %user.email, "user already exists"),
        }
        Ok(outcome)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        match self.repo.select_one(&Filter::new().eq("email", email)).await? {
            Some(doc) => Ok(Some(serde_json::from_value(Value::Object(doc))?)),
            None => Ok(None),
        }
    }

    /// False when no user has this email.
    pub async fn has_role(&self, email: &str, role: UserRole) -> Result<bool, DatabaseError> {
        Ok(self
            .find_by_email(email)
            .await?
            .map(|user| user.has_role(role))
            .unwrap_or(false))
    }

    pub async fn set_role(&self, id: Uuid, role: UserRole) -> Result<UpdateResult, DatabaseError> {
        let mut set = Map::new();
        set.insert("role".to_string(), json!(role));
        let result = self.repo.update_fields(&Filter::by_id(id), set).await?;
        info!(user_id = %id, role = role.as_str(), modified = result.modified_count, "user role updated");
        Ok(result)
    }

    pub async fn count_by_email(&self, email: &str) -> Result<u64, DatabaseError> {
        self.repo.count(&Filter::new().eq("email", email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn new_user(v: serde_json::Value) -> NewUser {
        serde_json::from_value(v).unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_refused() {
        let service = UserService::new(Arc::new(MemoryStore::new()));

        let first = service.create(new_user(json!({ "email": "a@x.com", "name": "Ana" }))).await.unwrap();
        assert!(matches!(first, CreateOutcome::Created(_)));
        let second = service.create(new_user(json!({ "email": "a@x.com", "name": "Other" }))).await.unwrap();
        assert_eq!(second, CreateOutcome::AlreadyExists);

        assert_eq!(service.count_by_email("a@x.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn role_in_body_is_ignored_until_granted() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        let created = service
            .create(new_user(json!({ "email": "b@x.com", "role": "admin" })))
            .await
            .unwrap();
        let CreateOutcome::Created(inserted) = created else { panic!("expected insert") };

        assert!(!service.has_role("b@x.com", UserRole::Admin).await.unwrap());
        service.set_role(inserted.inserted_id, UserRole::Admin).await.unwrap();
        assert!(service.has_role("b@x.com", UserRole::Admin).await.unwrap());
        assert!(!service.has_role("b@x.com", UserRole::Instructor).await.unwrap());
        assert!(!service.has_role("nobody@x.com", UserRole::Admin).await.unwrap());
    }

    #[tokio::test]
    async fn unrecognised_role_is_not_an_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                Collection::Users,
                vec![json!({ "email": "c@x.com", "role": "default", "name": ["C", "D"] }).as_object().cloned().unwrap()],
            )
            .await;
        let service = UserService::new(store);

        assert!(!service.has_role("c@x.com", UserRole::Admin).await.unwrap());
        assert_eq!(service.list_all().await.unwrap()[0]["role"], "default");
    }
}
