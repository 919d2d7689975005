#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use summer_camp_api::database::{
    Collection, DatabaseError, DeleteResult, Document, DocumentStore, InsertResult, MemoryStore, UpdateResult,
};
use summer_camp_api::filter::Filter;
use summer_camp_api::{build_router, AppConfig, AppState};

pub const TEST_SECRET: &str = "summer-camp-test-secret";

/// Memory store that counts every call made through the store trait.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        self.hit();
        self.inner.find(collection, filter).await
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        self.hit();
        self.inner.count(collection, filter).await
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertResult, DatabaseError> {
        self.hit();
        self.inner.insert_one(collection, document).await
    }

    async fn insert_unique(&self, collection: Collection, document: Document) -> Result<Option<InsertResult>, DatabaseError> {
        self.hit();
        self.inner.insert_unique(collection, document).await
    }

    async fn update_one(&self, collection: Collection, filter: &Filter, set: Document) -> Result<UpdateResult, DatabaseError> {
        self.hit();
        self.inner.update_one(collection, filter, set).await
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, DatabaseError> {
        self.hit();
        self.inner.delete_one(collection, filter).await
    }

    async fn ensure_collections(&self) -> Result<(), DatabaseError> {
        self.inner.ensure_collections().await
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.inner.health_check().await
    }

    async fn close(&self) {}
}

/// The real router over an in-memory store, driven in-process.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<CountingStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let store = Arc::new(CountingStore::default());
        let state = AppState::new(AppConfig::in_memory(TEST_SECRET), store.clone())?;
        Ok(Self {
            router: build_router(state.clone()),
            state,
            store,
        })
    }

    /// Insert raw documents, bypassing the HTTP surface and the call counter.
    pub async fn seed(&self, collection: Collection, docs: Vec<Value>) -> Vec<Uuid> {
        let docs = docs
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self.store.inner.seed(collection, docs).await
    }

    pub fn token_for(&self, email: &str) -> Result<String> {
        let payload = json!({ "email": email }).as_object().cloned().unwrap_or_default();
        Ok(self.state.tokens.issue(payload)?)
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await.context("router call failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str) -> Result<TestResponse> {
        self.request(Method::PATCH, uri, None, None).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, token, None).await
    }
}

pub fn array(body: &Value) -> Vec<Value> {
    body.as_array().cloned().unwrap_or_default()
}
