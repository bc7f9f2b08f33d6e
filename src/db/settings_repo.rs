// src/db/settings_repo.rs

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::document_store::{to_fields, DocumentStore, StoredDocument},
    models::notification::{
        NotificationSettings, UpdateNotificationSettingsPayload, NOTIFICATION_SETTINGS_COLLECTION,
    },
};

// Preferências de notificação: um registro por escritório
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn DocumentStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn find_row(&self, office_id: Uuid) -> Result<Option<StoredDocument>, AppError> {
        let rows = self
            .store
            .query(NOTIFICATION_SETTINGS_COLLECTION, "officeId", &json!(office_id))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Se ainda não existe registro, devolve os padrões (sem gravar nada).
    pub async fn get_settings(&self, office_id: Uuid) -> Result<NotificationSettings, AppError> {
        match self.find_row(office_id).await? {
            Some(row) => Ok(serde_json::from_value(Value::Object(row.fields))?),
            None => Ok(NotificationSettings::default()),
        }
    }

    // UPSERT: cria com os padrões + o que veio, ou faz merge parcial
    pub async fn upsert_settings(
        &self,
        office_id: Uuid,
        input: &UpdateNotificationSettingsPayload,
    ) -> Result<NotificationSettings, AppError> {
        input.validate()?;
        let changes = to_fields(input)?;

        match self.find_row(office_id).await? {
            Some(row) => {
                self.store.update(NOTIFICATION_SETTINGS_COLLECTION, row.id, changes).await?;
            }
            None => {
                let mut fields = to_fields(&NotificationSettings::default())?;
                fields.extend(changes);
                fields.insert("officeId".into(), json!(office_id));
                self.store.insert(NOTIFICATION_SETTINGS_COLLECTION, fields).await?;
            }
        }

        self.get_settings(office_id).await
    }
}
