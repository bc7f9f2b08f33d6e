// src/models/payment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::validate_positive_amount,
    models::entity::{EntityKind, EntityRef, OfficeEntity},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    CreditCard,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PaymentType {
    Income,
    Expense,
}

// Vocabulário único. Os nomes antigos do formulário ("completed", "due")
// continuam aceitos na leitura e são gravados no formato novo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    #[serde(alias = "completed")]
    Paid,
    #[default]
    #[serde(alias = "due")]
    Pending,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub office_id: Uuid,

    pub description: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub status: PaymentStatus,

    pub driver_id: Option<Uuid>,
    pub contract_id: Option<Uuid>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    #[validate(length(min = 1, message = "Description is required"))]
    #[schema(example = "Weekly rental")]
    pub description: String,

    #[validate(custom(function = "validate_positive_amount"))]
    #[schema(value_type = f64, example = 750.0)]
    pub amount: Decimal,

    pub payment_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(rename = "type")]
    pub payment_type: PaymentType,

    #[serde(default)]
    pub status: PaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    #[validate(length(min = 1, message = "Description is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(custom(function = "validate_positive_amount"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn linked_records(driver_id: Option<Uuid>, contract_id: Option<Uuid>) -> Vec<EntityRef> {
    driver_id
        .map(EntityRef::Driver)
        .into_iter()
        .chain(contract_id.map(EntityRef::Contract))
        .collect()
}

impl OfficeEntity for Payment {
    const KIND: EntityKind = EntityKind::Payment;
    type Draft = PaymentDraft;
    type Patch = PaymentPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }

    fn draft_references(draft: &PaymentDraft) -> Vec<EntityRef> {
        linked_records(draft.driver_id, draft.contract_id)
    }

    fn patch_references(patch: &PaymentPatch) -> Vec<EntityRef> {
        linked_records(patch.driver_id, patch.contract_id)
    }
}
