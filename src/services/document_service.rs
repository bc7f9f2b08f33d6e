// src/services/document_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{EntityRepository, SettingsRepository},
    models::{
        document::{Document, DocumentDraft, DocumentMetadata, DocumentPatch, DocumentView, ExpiryStatus},
        entity::{EntityKind, OfficeEntity},
    },
    storage::BlobStore,
};

#[derive(Clone)]
pub struct DocumentService {
    repo: EntityRepository<Document>,
    blobs: Arc<dyn BlobStore>,
    settings_repo: SettingsRepository,
}

impl DocumentService {
    pub fn new(
        repo: EntityRepository<Document>,
        blobs: Arc<dyn BlobStore>,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self { repo, blobs, settings_repo }
    }

    /// Sobe o arquivo e grava o registro com `filePath` e `fileUrl`.
    /// Se a gravação falhar, o arquivo recém-enviado é apagado (best-effort).
    pub async fn upload_document(
        &self,
        office_id: Uuid,
        metadata: DocumentMetadata,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Document, AppError> {
        // 1. Metadados inválidos nem chegam ao blob store
        metadata.validate()?;

        // 2. Upload
        let path = format!(
            "offices/{}/documents/{}_{}",
            office_id,
            Utc::now().timestamp_millis(),
            sanitize_file_name(file_name)
        );
        let url = self.blobs.upload(&path, bytes).await?;

        // 3. Registro (valida referências e ajusta documentsCount)
        let draft = DocumentDraft {
            metadata,
            file_path: Some(path.clone()),
            file_url: Some(url),
            upload_date: Utc::now(),
        };
        let id = match self.repo.insert(office_id, &draft).await {
            Ok(id) => id,
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&path).await {
                    tracing::warn!(path = %path, error = %cleanup, "orphaned blob: upload rollback failed");
                }
                return Err(e);
            }
        };

        tracing::info!(office_id = %office_id, document_id = %id, "documento enviado");
        self.repo.get_by_id(id).await
    }

    /// Apaga o arquivo (best-effort), o registro e decrementa documentsCount.
    pub async fn delete_document(&self, office_id: Uuid, id: Uuid) -> Result<Document, AppError> {
        let document = self.repo.get_in_office(office_id, id).await?;
        self.repo.remove(&document).await?;
        Ok(document)
    }

    /// Só metadados; o arquivo não muda.
    pub async fn update_document(
        &self,
        office_id: Uuid,
        id: Uuid,
        patch: &DocumentPatch,
        today: NaiveDate,
    ) -> Result<DocumentView, AppError> {
        self.repo.get_in_office(office_id, id).await?;
        let document = self.repo.update(id, patch).await?;
        let window = self.reminder_window(office_id).await?;
        Ok(view(document, today, window))
    }

    pub async fn download_url(&self, office_id: Uuid, id: Uuid) -> Result<String, AppError> {
        let document = self.repo.get_in_office(office_id, id).await?;
        let path = document
            .attached_blob()
            .ok_or(AppError::EntityNotFound { kind: EntityKind::Document, id })?;
        self.blobs.download_url(path).await
    }

    pub async fn get_document(&self, office_id: Uuid, id: Uuid, today: NaiveDate) -> Result<DocumentView, AppError> {
        let document = self.repo.get_in_office(office_id, id).await?;
        let window = self.reminder_window(office_id).await?;
        Ok(view(document, today, window))
    }

    pub async fn list_documents(&self, office_id: Uuid, today: NaiveDate) -> Result<Vec<DocumentView>, AppError> {
        let window = self.reminder_window(office_id).await?;
        let documents = self.repo.list_by_office(office_id).await?;
        Ok(documents.into_iter().map(|d| view(d, today, window)).collect())
    }

    /// Vencidos ou vencendo dentro da janela `daysBeforeExpiry`, o que vence primeiro vem antes.
    pub async fn list_expiring(&self, office_id: Uuid, today: NaiveDate) -> Result<Vec<DocumentView>, AppError> {
        let mut expiring: Vec<DocumentView> = self
            .list_documents(office_id, today)
            .await?
            .into_iter()
            .filter(|v| matches!(v.expiry_status, ExpiryStatus::Expired | ExpiryStatus::ExpiringSoon))
            .collect();
        expiring.sort_by_key(|v| v.document.expiry_date);
        Ok(expiring)
    }

    async fn reminder_window(&self, office_id: Uuid) -> Result<i64, AppError> {
        Ok(self.settings_repo.get_settings(office_id).await?.days_before_expiry)
    }
}

fn view(document: Document, today: NaiveDate, window: i64) -> DocumentView {
    let expiry_status = document.expiry_status(today, window);
    DocumentView { document, expiry_status }
}

// Só letras, dígitos, '.', '-' e '_' no nome do arquivo
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { "file".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{document_store::DocumentStore, MemoryDocumentStore},
        models::{
            document::DocumentType,
            entity::DocumentOwner,
            notification::UpdateNotificationSettingsPayload,
            office::OFFICES_COLLECTION,
        },
        services::counter_service::OfficeCounterService,
        test_utils::{init_test_tracing, RecordingBlobStore},
    };
    use serde_json::json;

    struct Fixture {
        service: DocumentService,
        store: Arc<MemoryDocumentStore>,
        blobs: Arc<RecordingBlobStore>,
        settings: SettingsRepository,
        office_id: Uuid,
        driver_id: Uuid,
    }

    async fn fixture() -> Fixture {
        init_test_tracing();
        let store = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(RecordingBlobStore::new());
        let dyn_store: Arc<dyn DocumentStore> = store.clone();
        let settings = SettingsRepository::new(dyn_store.clone());
        let repo = EntityRepository::new(dyn_store.clone(), blobs.clone(), OfficeCounterService::new(dyn_store));
        let service = DocumentService::new(repo, blobs.clone(), settings.clone());

        let office_id = store
            .insert(OFFICES_COLLECTION, crate::db::document_store::to_fields(&json!({ "name": "A" })).unwrap())
            .await
            .unwrap();
        let driver_id = store
            .insert("drivers", crate::db::document_store::to_fields(&json!({ "officeId": office_id })).unwrap())
            .await
            .unwrap();

        Fixture { service, store, blobs, settings, office_id, driver_id }
    }

    fn metadata(owner: DocumentOwner, expiry: Option<NaiveDate>) -> DocumentMetadata {
        DocumentMetadata {
            name: "Carteira".into(),
            document_type: DocumentType::License,
            entity: owner,
            expiry_date: expiry,
            notes: None,
        }
    }

    #[tokio::test]
    async fn upload_stores_path_and_url_then_delete_cascades() {
        let fx = fixture().await;
        let doc = fx
            .service
            .upload_document(fx.office_id, metadata(DocumentOwner::Driver(fx.driver_id), None), "minha carteira.pdf", b"%PDF")
            .await
            .unwrap();

        let path = doc.file_path.clone().unwrap();
        assert!(path.starts_with(&format!("offices/{}/documents/", fx.office_id)));
        assert!(path.ends_with("_minha_carteira.pdf"));
        assert_eq!(doc.file_url.as_deref(), Some(format!("http://blobs.test/{}", path).as_str()));

        fx.service.delete_document(fx.office_id, doc.id).await.unwrap();
        assert_eq!(fx.blobs.deleted(), vec![path]);

        let office = fx.store.get(OFFICES_COLLECTION, fx.office_id).await.unwrap().unwrap();
        assert_eq!(office.fields["documentsCount"], 0);
    }

    #[tokio::test]
    async fn failed_insert_removes_the_uploaded_blob() {
        let fx = fixture().await;
        let stranger = DocumentOwner::Vehicle(Uuid::new_v4());

        let result = fx.service.upload_document(fx.office_id, metadata(stranger, None), "x.pdf", b"x").await;

        assert!(matches!(result, Err(AppError::InvalidReference(_))));
        assert_eq!(fx.blobs.uploaded(), fx.blobs.deleted());
        assert_eq!(fx.blobs.deleted().len(), 1);
    }

    #[tokio::test]
    async fn invalid_metadata_never_uploads() {
        let fx = fixture().await;
        let mut bad = metadata(DocumentOwner::Driver(fx.driver_id), None);
        bad.name = String::new();

        let result = fx.service.upload_document(fx.office_id, bad, "x.pdf", b"x").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(fx.blobs.uploaded().is_empty());
    }

    #[tokio::test]
    async fn expiring_list_follows_office_reminder_window() {
        let fx = fixture().await;
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let owner = DocumentOwner::Driver(fx.driver_id);

        for days in [-2, 5, 20] {
            let expiry = today + chrono::Duration::days(days);
            fx.service
                .upload_document(fx.office_id, metadata(owner, Some(expiry)), "d.pdf", b"d")
                .await
                .unwrap();
        }
        fx.service.upload_document(fx.office_id, metadata(owner, None), "n.pdf", b"n").await.unwrap();

        let expiring = fx.service.list_expiring(fx.office_id, today).await.unwrap();
        let statuses: Vec<ExpiryStatus> = expiring.iter().map(|v| v.expiry_status).collect();
        assert_eq!(statuses, vec![ExpiryStatus::Expired, ExpiryStatus::ExpiringSoon]);

        let wider = UpdateNotificationSettingsPayload { days_before_expiry: Some(30), ..Default::default() };
        fx.settings.upsert_settings(fx.office_id, &wider).await.unwrap();
        assert_eq!(fx.service.list_expiring(fx.office_id, today).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn download_url_requires_an_attached_file() {
        let fx = fixture().await;
        let doc = fx
            .service
            .upload_document(fx.office_id, metadata(DocumentOwner::Driver(fx.driver_id), None), "a.pdf", b"a")
            .await
            .unwrap();

        let url = fx.service.download_url(fx.office_id, doc.id).await.unwrap();
        assert!(url.ends_with("_a.pdf"));
        assert!(fx.service.download_url(Uuid::new_v4(), doc.id).await.is_err());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("carteira de motorista.pdf"), "carteira_de_motorista.pdf");
        assert_eq!(sanitize_file_name(".."), "file");
    }
}
