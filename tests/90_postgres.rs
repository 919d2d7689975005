// Runs against a live database: DATABASE_URL=postgres://... cargo test -- --ignored
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use summer_camp_api::database::{Collection, DocumentStore, PgStore};
use summer_camp_api::filter::Filter;

async fn store() -> Result<Arc<PgStore>> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await?;
    let store = Arc::new(PgStore::new(pool));
    store.ensure_collections().await?;
    Ok(store)
}

fn doc(v: serde_json::Value) -> summer_camp_api::database::Document {
    v.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
#[ignore]
async fn unique_insert_survives_concurrent_callers() -> Result<()> {
    let store = store().await?;
    let booked_id = format!("pg-test-{}", uuid::Uuid::new_v4());

    let mut handles = vec![];
    for _ in 0..8 {
        let store = store.clone();
        let booked_id = booked_id.clone();
        handles.push(tokio::spawn(async move {
            store.insert_unique(Collection::Carts, doc(json!({ "booked_id": booked_id }))).await
        }));
    }
    let mut created = 0;
    for handle in handles {
        if handle.await??.is_some() {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let filter = Filter::new().eq("booked_id", booked_id.as_str());
    assert_eq!(store.count(Collection::Carts, &filter).await?, 1);
    store.delete_one(Collection::Carts, &filter).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn update_counts_match_driver_semantics() -> Result<()> {
    let store = store().await?;
    let inserted = store
        .insert_one(Collection::Classes, doc(json!({ "title": "pg-test", "status": "pending", "enrolled": 3 })))
        .await?;
    let by_id = Filter::by_id(inserted.inserted_id);

    let first = store.update_one(Collection::Classes, &by_id, doc(json!({ "status": "Approved" }))).await?;
    assert_eq!((first.matched_count, first.modified_count), (1, 1));
    let second = store.update_one(Collection::Classes, &by_id, doc(json!({ "status": "Approved" }))).await?;
    assert_eq!((second.matched_count, second.modified_count), (1, 0));

    let found = store.find(Collection::Classes, &by_id).await?;
    assert_eq!(found[0]["status"], "Approved");
    assert_eq!(found[0]["_id"], inserted.inserted_id.to_string());

    let top = store
        .find(Collection::Classes, &Filter::new().gt("enrolled", 0).sort_desc("enrolled").limit(6))
        .await?;
    assert!(top.len() <= 6);

    assert_eq!(store.delete_one(Collection::Classes, &by_id).await?.deleted_count, 1);
    Ok(())
}
