// src/db/memory_store.rs

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocumentStore, Fields, StoredDocument},
};

#[derive(Debug, Clone)]
struct Row {
    seq: u64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    fields: Fields,
}

impl Row {
    fn to_document(&self, id: Uuid) -> StoredDocument {
        StoredDocument {
            id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            fields: self.fields.clone(),
        }
    }
}

// Store em memória (STORE_BACKEND=memory e testes).
// Toda escrita passa pelo mesmo write lock, então increment é atômico.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<Uuid, Row>>>,
    seq: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|rows| rows.get(&id))
            .map(|row| row.to_document(id)))
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        let Some(rows) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<(&Uuid, &Row)> = rows
            .iter()
            .filter(|(_, row)| row.fields.get(field) == Some(value))
            .collect();
        matches.sort_by(|(_, a), (_, b)| {
            b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq))
        });

        Ok(matches.into_iter().map(|(id, row)| row.to_document(*id)).collect())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let row = Row {
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            created_at: Utc::now(),
            updated_at: None,
            fields,
        };

        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().insert(id, row);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: Uuid, fields: Fields) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        let Some(row) = collections.get_mut(collection).and_then(|rows| rows.get_mut(&id)) else {
            return Ok(false);
        };

        row.fields.extend(fields);
        row.updated_at = Some(Utc::now());
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|rows| rows.remove(&id))
            .is_some())
    }

    async fn increment(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, AppError> {
        let mut collections = self.collections.write().await;
        let Some(row) = collections.get_mut(collection).and_then(|rows| rows.get_mut(&id)) else {
            return Ok(None);
        };

        let current = row.fields.get(field).and_then(Value::as_i64).unwrap_or(0);
        let next = (current + delta).max(0);
        row.fields.insert(field.to_string(), Value::from(next));
        row.updated_at = Some(Utc::now());
        Ok(Some(next))
    }
}
