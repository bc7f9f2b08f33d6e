// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocumentStore, Fields, StoredDocument},
};

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        let fields = match row.data {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        StoredDocument {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            fields,
        }
    }
}

// Document Store de produção: tabela `documents` (JSONB) no Postgres.
// Usamos as funções de query em tempo de execução porque o esquema é dinâmico.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredDocument::from))
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND data -> $2::text = $3
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: Uuid, fields: Fields) -> Result<bool, AppError> {
        // `||` em JSONB faz o merge raso: chaves novas sobrescrevem, o resto fica
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(fields))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, AppError> {
        // Um único UPDATE: o lock de linha do Postgres serializa incrementos concorrentes
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE documents
            SET data = jsonb_set(
                    data,
                    ARRAY[$3::text],
                    to_jsonb(GREATEST(COALESCE((data ->> $3::text)::bigint, 0) + $4::bigint, 0))
                ),
                updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING (data ->> $3::text)::bigint
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }
}
