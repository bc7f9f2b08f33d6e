// src/models/document.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::entity::{DocumentOwner, EntityKind, EntityRef, OfficeEntity};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    License,
    Insurance,
    Registration,
    #[default]
    Other,
}

// Calculado na leitura, nunca gravado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ExpiryStatus {
    Valid,
    ExpiringSoon,
    Expired,
    NoExpiry,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub office_id: Uuid,

    pub name: String,
    #[serde(default)]
    pub document_type: DocumentType,
    pub entity: DocumentOwner,

    pub file_path: Option<String>,
    pub file_url: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn expiry_status(&self, today: NaiveDate, days_before_expiry: i64) -> ExpiryStatus {
        match self.expiry_date {
            None => ExpiryStatus::NoExpiry,
            Some(expiry) if expiry < today => ExpiryStatus::Expired,
            Some(expiry) if (expiry - today).num_days() <= days_before_expiry => {
                ExpiryStatus::ExpiringSoon
            }
            Some(_) => ExpiryStatus::Valid,
        }
    }
}

/// Metadados informados pelo usuário no upload (o arquivo vem à parte).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[validate(length(min = 1, message = "Document name is required"))]
    #[schema(example = "Driving license")]
    pub name: String,

    #[serde(default)]
    pub document_type: DocumentType,

    pub entity: DocumentOwner,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// O que de fato vai para o store: metadados + onde o arquivo foi parar
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    #[serde(flatten)]
    #[validate(nested)]
    pub metadata: DocumentMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[validate(length(min = 1, message = "Document name is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<DocumentOwner>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Documento como sai na API: o registro mais o status de validade.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: Document,
    pub expiry_status: ExpiryStatus,
}

impl OfficeEntity for Document {
    const KIND: EntityKind = EntityKind::Document;
    type Draft = DocumentDraft;
    type Patch = DocumentPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }

    fn draft_references(draft: &DocumentDraft) -> Vec<EntityRef> {
        vec![draft.metadata.entity.into()]
    }

    fn patch_references(patch: &DocumentPatch) -> Vec<EntityRef> {
        patch.entity.map(EntityRef::from).into_iter().collect()
    }

    // filePath tem prioridade; registros antigos só têm a URL
    fn attached_blob(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .or(self.file_url.as_deref())
            .filter(|p| !p.is_empty())
    }
}
