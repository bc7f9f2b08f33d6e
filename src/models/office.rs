// src/models/office.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::validation::validate_phone, models::entity::EntityKind};

pub const OFFICES_COLLECTION: &str = "offices";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum BusinessType {
    #[default]
    Taxi,
    Delivery,
    Private,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OfficeStatus {
    #[default]
    Active,
    Suspended,
}

// ---
// 1. Office (o "Tenant")
// ---
// Os seis contadores são desnormalizados: só o OfficeCounterService mexe neles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: Uuid,
    #[schema(example = "Taxi Al-Noor")]
    pub name: String,
    pub address: Option<String>,
    #[schema(example = "+966501234567")]
    pub phone: String,
    pub email: Option<String>,
    pub city: Option<String>,
    pub license_number: String,
    pub tax_number: Option<String>,
    #[serde(default)]
    pub business_type: BusinessType,
    pub owner_id: Uuid,
    #[serde(default)]
    pub status: OfficeStatus,
    pub is_active: bool,

    #[serde(default)]
    pub drivers_count: i64,
    #[serde(default)]
    pub vehicles_count: i64,
    #[serde(default)]
    pub contracts_count: i64,
    #[serde(default)]
    pub payments_count: i64,
    #[serde(default)]
    pub documents_count: i64,
    #[serde(default)]
    pub alerts_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Office {
    pub fn count(&self, counter: OfficeCounter) -> i64 {
        match counter {
            OfficeCounter::Drivers => self.drivers_count,
            OfficeCounter::Vehicles => self.vehicles_count,
            OfficeCounter::Contracts => self.contracts_count,
            OfficeCounter::Payments => self.payments_count,
            OfficeCounter::Documents => self.documents_count,
            OfficeCounter::Alerts => self.alerts_count,
        }
    }
}

// ---
// 2. Os contadores
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OfficeCounter {
    Drivers,
    Vehicles,
    Contracts,
    Payments,
    Documents,
    Alerts,
}

impl OfficeCounter {
    pub const ALL: [OfficeCounter; 6] = [
        OfficeCounter::Drivers,
        OfficeCounter::Vehicles,
        OfficeCounter::Contracts,
        OfficeCounter::Payments,
        OfficeCounter::Documents,
        OfficeCounter::Alerts,
    ];

    /// Nome do campo no registro do escritório.
    pub fn field_name(self) -> &'static str {
        match self {
            OfficeCounter::Drivers => "driversCount",
            OfficeCounter::Vehicles => "vehiclesCount",
            OfficeCounter::Contracts => "contractsCount",
            OfficeCounter::Payments => "paymentsCount",
            OfficeCounter::Documents => "documentsCount",
            OfficeCounter::Alerts => "alertsCount",
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            OfficeCounter::Drivers => EntityKind::Driver,
            OfficeCounter::Vehicles => EntityKind::Vehicle,
            OfficeCounter::Contracts => EntityKind::Contract,
            OfficeCounter::Payments => EntityKind::Payment,
            OfficeCounter::Documents => EntityKind::Document,
            OfficeCounter::Alerts => EntityKind::Alert,
        }
    }
}

// ---
// 3. Payloads
// ---
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficePayload {
    #[validate(length(min = 2, message = "Office name must be at least 2 characters"))]
    #[schema(example = "Taxi Al-Noor")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+966501234567")]
    pub phone: String,

    #[validate(email(message = "Invalid email"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[validate(length(min = 1, message = "License number is required"))]
    pub license_number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,

    #[serde(default)]
    pub business_type: BusinessType,
}

// Só campos descritivos. Contadores, dono e status ficam de fora de propósito.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfficePayload {
    #[validate(length(min = 2, message = "Office name must be at least 2 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[validate(length(min = 1, message = "License number is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<BusinessType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_payload_cannot_carry_counters() {
        let payload: UpdateOfficePayload =
            serde_json::from_value(json!({ "name": "Novo Nome", "driversCount": 99 })).unwrap();
        let fields = serde_json::to_value(&payload).unwrap();

        assert_eq!(fields, json!({ "name": "Novo Nome" }));
    }

    #[test]
    fn counter_fields_match_office_record() {
        let names: Vec<_> = OfficeCounter::ALL.iter().map(|c| c.field_name()).collect();
        assert_eq!(
            names,
            ["driversCount", "vehiclesCount", "contractsCount", "paymentsCount", "documentsCount", "alertsCount"]
        );
    }
}
