// src/models/entity.rs

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::{auth::Permission, office::OfficeCounter};

// ---
// 1. EntityKind: os tipos de entidade que pertencem a um escritório
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Driver,
    Vehicle,
    Contract,
    Payment,
    Document,
    Alert,
    Notification,
}

impl EntityKind {
    /// Nome da coleção no Document Store.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Driver => "drivers",
            EntityKind::Vehicle => "vehicles",
            EntityKind::Contract => "contracts",
            EntityKind::Payment => "payments",
            EntityKind::Document => "documents",
            EntityKind::Alert => "alerts",
            EntityKind::Notification => "notifications",
        }
    }

    /// Contador do escritório mantido para este tipo. Notificações não são contadas.
    pub fn counter(self) -> Option<OfficeCounter> {
        match self {
            EntityKind::Driver => Some(OfficeCounter::Drivers),
            EntityKind::Vehicle => Some(OfficeCounter::Vehicles),
            EntityKind::Contract => Some(OfficeCounter::Contracts),
            EntityKind::Payment => Some(OfficeCounter::Payments),
            EntityKind::Document => Some(OfficeCounter::Documents),
            EntityKind::Alert => Some(OfficeCounter::Alerts),
            EntityKind::Notification => None,
        }
    }

    /// Permissão exigida para criar/alterar/remover registros deste tipo.
    pub fn manage_permission(self) -> Permission {
        match self {
            EntityKind::Driver => Permission::ManageDrivers,
            EntityKind::Vehicle => Permission::ManageVehicles,
            EntityKind::Contract => Permission::ManageContracts,
            EntityKind::Payment => Permission::ManagePayments,
            EntityKind::Document => Permission::ManageDocuments,
            EntityKind::Alert | EntityKind::Notification => Permission::ManageAlerts,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Driver => "driver",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Contract => "contract",
            EntityKind::Payment => "payment",
            EntityKind::Document => "document",
            EntityKind::Alert => "alert",
            EntityKind::Notification => "notification",
        };
        f.write_str(name)
    }
}

// ---
// 2. Referências polimórficas (tag + id num só tipo)
// ---
// No JSON: { "type": "driver", "id": "..." }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
pub enum EntityRef {
    Driver(Uuid),
    Vehicle(Uuid),
    Contract(Uuid),
    Document(Uuid),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Driver(_) => EntityKind::Driver,
            EntityRef::Vehicle(_) => EntityKind::Vehicle,
            EntityRef::Contract(_) => EntityKind::Contract,
            EntityRef::Document(_) => EntityKind::Document,
        }
    }

    pub fn id(&self) -> Uuid {
        match *self {
            EntityRef::Driver(id)
            | EntityRef::Vehicle(id)
            | EntityRef::Contract(id)
            | EntityRef::Document(id) => id,
        }
    }
}

// Dono de um documento: só motorista ou veículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
pub enum DocumentOwner {
    Driver(Uuid),
    Vehicle(Uuid),
}

impl From<DocumentOwner> for EntityRef {
    fn from(owner: DocumentOwner) -> Self {
        match owner {
            DocumentOwner::Driver(id) => EntityRef::Driver(id),
            DocumentOwner::Vehicle(id) => EntityRef::Vehicle(id),
        }
    }
}

// ---
// 3. O contrato de uma entidade guardada numa "coleção contada"
// ---
/// Tudo o que o EntityRepository genérico precisa saber sobre um tipo de entidade.
pub trait OfficeEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Payload de criação (sem id, officeId e timestamps)
    type Draft: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    /// Payload de atualização parcial: só os campos presentes são gravados
    type Patch: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    fn id(&self) -> Uuid;

    fn office_id(&self) -> Uuid;

    /// Registros que precisam existir no mesmo escritório antes da gravação.
    fn draft_references(_draft: &Self::Draft) -> Vec<EntityRef> {
        Vec::new()
    }

    fn patch_references(_patch: &Self::Patch) -> Vec<EntityRef> {
        Vec::new()
    }

    /// Regras que cruzam o patch com o registro gravado (ex.: período do contrato).
    fn validate_merged(&self, _patch: &Self::Patch) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Caminho do arquivo no Blob Store ligado a este registro (apagado junto com ele).
    fn attached_blob(&self) -> Option<&str> {
        None
    }
}
