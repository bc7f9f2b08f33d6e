// src/models/contract.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::validation::{validate_phone, validate_positive_amount},
    models::entity::{EntityKind, EntityRef, OfficeEntity},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ContractStatus {
    Active,
    #[default]
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: Uuid,
    pub office_id: Uuid,

    pub contract_number: String,
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub client_name: String,
    pub client_phone: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = f64)]
    pub amount: Decimal,

    #[serde(default)]
    pub status: ContractStatus,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contract_period"))]
pub struct ContractDraft {
    #[validate(length(min = 1, message = "Contract number is required"))]
    #[schema(example = "CT-2025-001")]
    pub contract_number: String,

    pub driver_id: Uuid,
    pub vehicle_id: Uuid,

    #[validate(length(min = 2, message = "Client name must be at least 2 characters"))]
    pub client_name: String,

    #[validate(custom(function = "validate_phone"))]
    pub client_phone: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(value_type = f64, example = 3500.0)]
    pub amount: Decimal,

    #[serde(default)]
    pub status: ContractStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn validate_contract_period(draft: &ContractDraft) -> Result<(), ValidationError> {
    check_period(Some(draft.start_date), Some(draft.end_date))
}

// Patch com as duas pontas; com uma só, quem checa é o validate_merged
fn validate_patch_period(patch: &ContractPatch) -> Result<(), ValidationError> {
    check_period(patch.start_date, patch.end_date)
}

fn check_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            let mut err = ValidationError::new("period");
            err.message = Some("End date must not be before start date".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_patch_period"))]
pub struct ContractPatch {
    #[validate(length(min = 1, message = "Contract number is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,

    #[validate(length(min = 2, message = "Client name must be at least 2 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_positive_amount"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContractStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OfficeEntity for Contract {
    const KIND: EntityKind = EntityKind::Contract;
    type Draft = ContractDraft;
    type Patch = ContractPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }

    fn draft_references(draft: &ContractDraft) -> Vec<EntityRef> {
        vec![EntityRef::Driver(draft.driver_id), EntityRef::Vehicle(draft.vehicle_id)]
    }

    fn patch_references(patch: &ContractPatch) -> Vec<EntityRef> {
        patch
            .driver_id
            .map(EntityRef::Driver)
            .into_iter()
            .chain(patch.vehicle_id.map(EntityRef::Vehicle))
            .collect()
    }

    fn validate_merged(&self, patch: &ContractPatch) -> Result<(), ValidationErrors> {
        let start = patch.start_date.unwrap_or(self.start_date);
        let end = patch.end_date.unwrap_or(self.end_date);
        check_period(Some(start), Some(end)).map_err(|err| {
            let mut errors = ValidationErrors::new();
            errors.add("__all__", err);
            errors
        })
    }
}
