// src/models/driver.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::validate_phone,
    models::entity::{EntityKind, OfficeEntity},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DriverStatus {
    #[default]
    Active,
    Inactive,
    OnLeave,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: Uuid,
    pub office_id: Uuid,

    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub national_id: String,

    pub license_number: String,
    pub license_expiry: NaiveDate,

    pub address: Option<String>,
    #[serde(default)]
    pub status: DriverStatus,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverDraft {
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    #[schema(example = "Khalid")]
    pub first_name: String,

    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    #[schema(example = "Al-Harbi")]
    pub last_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+966501234567")]
    pub phone: String,

    #[validate(email(message = "Invalid email"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "National ID is required"))]
    pub national_id: String,

    #[validate(length(min = 1, message = "License number is required"))]
    pub license_number: String,

    pub license_expiry: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub status: DriverStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DriverPatch {
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "National ID is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    #[validate(length(min = 1, message = "License number is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_expiry: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DriverStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OfficeEntity for Driver {
    const KIND: EntityKind = EntityKind::Driver;
    type Draft = DriverDraft;
    type Patch = DriverPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_rejects_bad_phone_and_short_name() {
        let draft: DriverDraft = serde_json::from_value(json!({
            "firstName": "K",
            "lastName": "Al-Harbi",
            "phone": "123",
            "nationalId": "1029384756",
            "licenseNumber": "LIC-1",
            "licenseExpiry": "2027-01-31"
        }))
        .unwrap();

        let errors = draft.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn status_uses_camel_case_on_the_wire() {
        assert_eq!(serde_json::to_value(DriverStatus::OnLeave).unwrap(), json!("onLeave"));
    }
}
