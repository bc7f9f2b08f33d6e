// src/db/entity_repo.rs

use std::{marker::PhantomData, sync::Arc};

use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::document_store::{to_fields, DocumentStore, Fields},
    models::entity::{EntityRef, OfficeEntity},
    services::counter_service::OfficeCounterService,
    storage::BlobStore,
};

// Campos que só o store/repositório escrevem
const PROTECTED_FIELDS: [&str; 4] = ["id", "officeId", "createdAt", "updatedAt"];

/// Repositório genérico para qualquer coleção que pertence a um escritório.
///
/// Insert e delete mantêm o contador do escritório (quando o tipo tem um).
/// Delete também remove o arquivo anexado, em modo best-effort.
pub struct EntityRepository<E: OfficeEntity> {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    counters: OfficeCounterService,
    _entity: PhantomData<fn() -> E>,
}

// derive(Clone) exigiria E: Clone
impl<E: OfficeEntity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            blobs: self.blobs.clone(),
            counters: self.counters.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: OfficeEntity> EntityRepository<E> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        counters: OfficeCounterService,
    ) -> Self {
        Self { store, blobs, counters, _entity: PhantomData }
    }

    fn collection(&self) -> &'static str {
        E::KIND.collection()
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::EntityNotFound { kind: E::KIND, id }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<E, AppError> {
        self.store
            .get(self.collection(), id)
            .await?
            .ok_or_else(|| Self::not_found(id))?
            .into_entity()
    }

    /// Igual a `get_by_id`, mas um registro de outro escritório conta como inexistente.
    pub async fn get_in_office(&self, office_id: Uuid, id: Uuid) -> Result<E, AppError> {
        let entity = self.get_by_id(id).await?;
        if entity.office_id() != office_id {
            return Err(Self::not_found(id));
        }
        Ok(entity)
    }

    pub async fn list_by_office(&self, office_id: Uuid) -> Result<Vec<E>, AppError> {
        self.store
            .query(self.collection(), "officeId", &json!(office_id))
            .await?
            .into_iter()
            .map(|doc| doc.into_entity())
            .collect()
    }

    pub async fn count_by_office(&self, office_id: Uuid) -> Result<usize, AppError> {
        let rows = self.store.query(self.collection(), "officeId", &json!(office_id)).await?;
        Ok(rows.len())
    }

    pub async fn insert(&self, office_id: Uuid, draft: &E::Draft) -> Result<Uuid, AppError> {
        // 1. Valida antes de qualquer chamada ao store
        draft.validate()?;

        // 2. Referências precisam existir no mesmo escritório
        self.check_references(office_id, E::draft_references(draft)).await?;

        // 3. Grava. O store atribui id e createdAt
        let mut fields = strip_protected(to_fields(draft)?);
        fields.insert("officeId".into(), json!(office_id));
        let id = self.store.insert(self.collection(), fields).await?;

        // 4. Contador do escritório
        if let Some(counter) = E::KIND.counter() {
            self.counters.adjust(office_id, counter, 1).await?;
        }

        tracing::debug!(kind = %E::KIND, %id, office_id = %office_id, "registro criado");
        Ok(id)
    }

    /// Merge parcial. Não mexe em contador.
    pub async fn update(&self, id: Uuid, patch: &E::Patch) -> Result<E, AppError> {
        patch.validate()?;

        let current = self.get_by_id(id).await?;
        current.validate_merged(patch)?;
        self.check_references(current.office_id(), E::patch_references(patch)).await?;

        let fields = strip_protected(to_fields(patch)?);
        if !self.store.update(self.collection(), id, fields).await? {
            return Err(Self::not_found(id));
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<E, AppError> {
        let entity = self.get_by_id(id).await?;
        self.remove(&entity).await?;
        Ok(entity)
    }

    /// Remove um registro já carregado: blob (best-effort), linha, contador. Nessa ordem.
    pub async fn remove(&self, entity: &E) -> Result<(), AppError> {
        let id = entity.id();

        // 1. Arquivo anexado. Falha aqui deixa um blob órfão, nunca uma linha apontando para nada
        if let Some(path) = entity.attached_blob() {
            if let Err(e) = self.blobs.delete(path).await {
                tracing::warn!(kind = %E::KIND, %id, path, error = %e, "orphaned blob: delete failed");
            }
        }

        // 2. A linha. Se outra requisição já apagou, não decrementa de novo
        if !self.store.delete(self.collection(), id).await? {
            return Err(Self::not_found(id));
        }

        // 3. Contador
        if let Some(counter) = E::KIND.counter() {
            self.counters.adjust(entity.office_id(), counter, -1).await?;
        }

        tracing::debug!(kind = %E::KIND, %id, "registro removido");
        Ok(())
    }

    async fn check_references(&self, office_id: Uuid, refs: Vec<EntityRef>) -> Result<(), AppError> {
        let office = json!(office_id);
        for reference in refs {
            let target = self.store.get(reference.kind().collection(), reference.id()).await?;
            let same_office = target.is_some_and(|doc| doc.fields.get("officeId") == Some(&office));
            if !same_office {
                return Err(AppError::InvalidReference(reference));
            }
        }
        Ok(())
    }
}

fn strip_protected(mut fields: Fields) -> Fields {
    for key in PROTECTED_FIELDS {
        fields.remove(key);
    }
    fields
}
