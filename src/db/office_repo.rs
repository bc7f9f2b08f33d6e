// src/db/office_repo.rs

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{to_fields, DocumentStore},
    models::office::{CreateOfficePayload, Office, OfficeCounter, OfficeStatus, UpdateOfficePayload, OFFICES_COLLECTION},
};

// Escritórios nunca são apagados; só desativados
#[derive(Clone)]
pub struct OfficeRepository {
    store: Arc<dyn DocumentStore>,
}

impl OfficeRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Office>, AppError> {
        self.store
            .get(OFFICES_COLLECTION, id)
            .await?
            .map(|doc| doc.into_entity())
            .transpose()
    }

    pub async fn get(&self, id: Uuid) -> Result<Office, AppError> {
        self.find_by_id(id).await?.ok_or(AppError::OfficeNotFound(id))
    }

    pub async fn create(&self, owner_id: Uuid, payload: &CreateOfficePayload) -> Result<Office, AppError> {
        let mut fields = to_fields(payload)?;
        fields.insert("ownerId".into(), json!(owner_id));
        fields.insert("status".into(), json!(OfficeStatus::Active));
        fields.insert("isActive".into(), Value::Bool(true));
        for counter in OfficeCounter::ALL {
            fields.insert(counter.field_name().into(), Value::from(0));
        }

        let id = self.store.insert(OFFICES_COLLECTION, fields).await?;
        self.get(id).await
    }

    /// Só campos descritivos; o payload não tem como carregar contadores.
    pub async fn update(&self, id: Uuid, payload: &UpdateOfficePayload) -> Result<Office, AppError> {
        let fields = to_fields(payload)?;
        if !self.store.update(OFFICES_COLLECTION, id, fields).await? {
            return Err(AppError::OfficeNotFound(id));
        }
        self.get(id).await
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<Office, AppError> {
        let fields = to_fields(&json!({ "isActive": false, "status": OfficeStatus::Suspended }))?;
        if !self.store.update(OFFICES_COLLECTION, id, fields).await? {
            return Err(AppError::OfficeNotFound(id));
        }
        self.get(id).await
    }
}
