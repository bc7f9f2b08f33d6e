// src/services/counter_service.rs

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{DocumentStore, Fields},
    models::office::{OfficeCounter, OFFICES_COLLECTION},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOutcome {
    Updated(i64),
    // Escritório não existe: nada foi gravado
    Skipped,
}

/// Mantém os seis contadores desnormalizados do escritório.
#[derive(Clone)]
pub struct OfficeCounterService {
    store: Arc<dyn DocumentStore>,
}

impl OfficeCounterService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn adjust(
        &self,
        office_id: Uuid,
        counter: OfficeCounter,
        delta: i64,
    ) -> Result<CounterOutcome, AppError> {
        let updated = self
            .store
            .increment(OFFICES_COLLECTION, office_id, counter.field_name(), delta)
            .await?;

        match updated {
            Some(value) => Ok(CounterOutcome::Updated(value)),
            None => {
                tracing::warn!(
                    office_id = %office_id,
                    counter = counter.field_name(),
                    delta,
                    "counter update skipped: office not found"
                );
                Ok(CounterOutcome::Skipped)
            }
        }
    }

    /// Recalcula os seis contadores a partir das linhas vivas e grava tudo num só update.
    pub async fn reconcile(&self, office_id: Uuid) -> Result<Fields, AppError> {
        if self.store.get(OFFICES_COLLECTION, office_id).await?.is_none() {
            return Err(AppError::OfficeNotFound(office_id));
        }

        let office_value = json!(office_id);
        let mut counts = Fields::new();
        for counter in OfficeCounter::ALL {
            let rows = self
                .store
                .query(counter.kind().collection(), "officeId", &office_value)
                .await?;
            counts.insert(counter.field_name().to_string(), Value::from(rows.len() as i64));
        }

        // O escritório pode ter sumido entre o get e aqui
        if !self.store.update(OFFICES_COLLECTION, office_id, counts.clone()).await? {
            return Err(AppError::OfficeNotFound(office_id));
        }

        tracing::info!(office_id = %office_id, "contadores reconciliados");
        Ok(counts)
    }
}
