use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, types::Json, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::document::{with_id, Collection, DeleteResult, Document, InsertResult, UpdateResult};
use super::manager::DatabaseError;
use super::store::DocumentStore;
use crate::filter::{Filter, SqlParam, SqlResult};

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

/// PostgreSQL-backed store. Each collection is a table of
/// `(id UUID, data JSONB, created_at TIMESTAMPTZ)`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn unique_index_name(collection: Collection, key: &str) -> String {
        format!("{}_{}_key", collection.table_name(), key)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let sql_result = filter.to_sql(collection.table_name())?;
        let rows = bind_all(sqlx::query(&sql_result.query), &sql_result)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<Document, DatabaseError> {
                let id: Uuid = row.try_get("id")?;
                let Json(data): Json<Value> = row.try_get("data")?;
                match data {
                    Value::Object(map) => Ok(with_id(id, map)),
                    other => Err(DatabaseError::QueryError(format!("row {} holds non-object data: {}", id, other))),
                }
            })
            .collect()
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql_result = filter.to_count_sql(collection.table_name())?;
        let row = bind_all(sqlx::query(&sql_result.query), &sql_result)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertResult, DatabaseError> {
        let id = Uuid::new_v4();
        let sql = format!("INSERT INTO \"{}\" (\"id\", \"data\") VALUES ($1, $2)", collection.table_name());
        sqlx::query(&sql)
            .bind(id)
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await?;
        Ok(InsertResult::new(id))
    }

    async fn insert_unique(&self, collection: Collection, document: Document) -> Result<Option<InsertResult>, DatabaseError> {
        let key = collection
            .unique_key()
            .ok_or_else(|| DatabaseError::QueryError(format!("collection {} has no unique key", collection)))?;

        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO \"{table}\" (\"id\", \"data\") VALUES ($1, $2) ON CONFLICT ((\"data\"->>'{key}')) DO NOTHING",
            table = collection.table_name(),
            key = key
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            Ok(None)
        } else {
            Ok(Some(InsertResult::new(id)))
        }
    }

    async fn update_one(&self, collection: Collection, filter: &Filter, set: Document) -> Result<UpdateResult, DatabaseError> {
        // $1 is the patch; filter placeholders follow it.
        let where_result = filter.to_where_sql(1)?;
        let sql = format!(
            r#"
            WITH target AS (
                SELECT "id" FROM "{table}" WHERE {predicate} ORDER BY "created_at" ASC LIMIT 1
            ), updated AS (
                UPDATE "{table}" AS t SET "data" = t."data" || $1
                FROM target
                WHERE t."id" = target."id" AND NOT (t."data" @> $1)
                RETURNING t."id"
            )
            SELECT (SELECT COUNT(*) FROM target) AS matched, (SELECT COUNT(*) FROM updated) AS modified
            "#,
            table = collection.table_name(),
            predicate = where_result.query
        );

        let query = sqlx::query(&sql).bind(Json(Value::Object(set)));
        let row = bind_all(query, &where_result).fetch_one(&self.pool).await?;
        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(UpdateResult::new(matched.max(0) as u64, modified.max(0) as u64))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, DatabaseError> {
        let where_result = filter.to_where_sql(0)?;
        let sql = format!(
            r#"
            WITH target AS (
                SELECT "id" FROM "{table}" WHERE {predicate} ORDER BY "created_at" ASC LIMIT 1
            )
            DELETE FROM "{table}" AS t USING target WHERE t."id" = target."id"
            "#,
            table = collection.table_name(),
            predicate = where_result.query
        );
        let result = bind_all(sqlx::query(&sql), &where_result).execute(&self.pool).await?;
        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn ensure_collections(&self) -> Result<(), DatabaseError> {
        for collection in Collection::ALL {
            let table = collection.table_name();
            let create = format!(
                r#"CREATE TABLE IF NOT EXISTS "{}" (
                    "id" UUID PRIMARY KEY,
                    "data" JSONB NOT NULL,
                    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now()
                )"#,
                table
            );
            sqlx::query(&create).execute(&self.pool).await?;

            if let Some(key) = collection.unique_key() {
                let index = format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON \"{}\" ((\"data\"->>'{}'))",
                    Self::unique_index_name(collection, key),
                    table,
                    key
                );
                sqlx::query(&index).execute(&self.pool).await?;
            }
            info!("Collection ready: {}", table);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

fn bind_all<'q>(mut query: PgQuery<'q>, sql_result: &SqlResult) -> PgQuery<'q> {
    for param in &sql_result.params {
        query = bind_param(query, param);
    }
    query
}

fn bind_param<'q>(query: PgQuery<'q>, param: &SqlParam) -> PgQuery<'q> {
    match param {
        SqlParam::Json(v) => query.bind(Json(v.clone())),
        SqlParam::JsonArray(values) => query.bind(values.iter().cloned().map(Json).collect::<Vec<_>>()),
        SqlParam::Float(f) => query.bind(*f),
        SqlParam::Text(s) => query.bind(s.clone()),
        SqlParam::Uuid(id) => query.bind(*id),
        SqlParam::UuidArray(ids) => query.bind(ids.clone()),
    }
}
