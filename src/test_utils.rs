// src/test_utils.rs
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocumentStore, Fields, StoredDocument},
    services::sms::SmsSender,
    storage::BlobStore,
};

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

// Blob store que só anota as chamadas de delete (e pode falhar todas elas)
#[derive(Default)]
pub(crate) struct RecordingBlobStore {
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl RecordingBlobStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn upload(&self, path: &str, _bytes: &[u8]) -> Result<String, AppError> {
        self.uploaded.lock().unwrap().push(path.to_string());
        Ok(format!("http://blobs.test/{}", path))
    }

    async fn download_url(&self, path: &str) -> Result<String, AppError> {
        Ok(format!("http://blobs.test/{}", path))
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.deleted.lock().unwrap().push(path.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("blob store offline".into()));
        }
        Ok(())
    }
}

// Document store fora do ar: toda chamada falha
pub(crate) struct FailingStore;

fn offline() -> AppError {
    AppError::StoreUnavailable("document store offline".into())
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _: &str, _: Uuid) -> Result<Option<StoredDocument>, AppError> {
        Err(offline())
    }

    async fn query(&self, _: &str, _: &str, _: &Value) -> Result<Vec<StoredDocument>, AppError> {
        Err(offline())
    }

    async fn insert(&self, _: &str, _: Fields) -> Result<Uuid, AppError> {
        Err(offline())
    }

    async fn update(&self, _: &str, _: Uuid, _: Fields) -> Result<bool, AppError> {
        Err(offline())
    }

    async fn delete(&self, _: &str, _: Uuid) -> Result<bool, AppError> {
        Err(offline())
    }

    async fn increment(&self, _: &str, _: Uuid, _: &str, _: i64) -> Result<Option<i64>, AppError> {
        Err(offline())
    }
}

// Guarda os SMS em vez de enviar
#[derive(Default)]
pub(crate) struct CapturingSmsSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingSmsSender {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Último código enviado para o telefone.
    pub(crate) fn last_code(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == phone)
            .map(|(_, code)| code.clone())
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsSender for CapturingSmsSender {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), AppError> {
        self.sent.lock().unwrap().push((phone.to_string(), code.to_string()));
        Ok(())
    }
}
