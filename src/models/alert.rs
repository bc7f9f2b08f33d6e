// src/models/alert.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::entity::{EntityKind, EntityRef, OfficeEntity};

// Prioridade canônica: low|medium|high. info/warning/critical são aceitos como sinônimos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AlertPriority {
    #[serde(alias = "info")]
    Low,
    #[default]
    #[serde(alias = "warning")]
    Medium,
    #[serde(alias = "critical")]
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AlertStatus {
    #[default]
    #[serde(alias = "open")]
    Active,
    #[serde(alias = "closed")]
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub office_id: Uuid,

    pub title: String,
    pub description: String,
    pub alert_date: NaiveDate,
    #[serde(default)]
    pub priority: AlertPriority,
    #[serde(default)]
    pub status: AlertStatus,
    pub entity: Option<EntityRef>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertDraft {
    #[validate(length(min = 2, message = "Title must be at least 2 characters"))]
    #[schema(example = "Insurance expiring")]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub alert_date: NaiveDate,

    #[serde(default)]
    pub priority: AlertPriority,

    #[serde(default)]
    pub status: AlertStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertPatch {
    #[validate(length(min = 2, message = "Title must be at least 2 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<AlertPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OfficeEntity for Alert {
    const KIND: EntityKind = EntityKind::Alert;
    type Draft = AlertDraft;
    type Patch = AlertPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }

    fn draft_references(draft: &AlertDraft) -> Vec<EntityRef> {
        draft.entity.into_iter().collect()
    }

    fn patch_references(patch: &AlertPatch) -> Vec<EntityRef> {
        patch.entity.into_iter().collect()
    }
}
