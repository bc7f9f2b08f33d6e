// src/models/vehicle.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::validate_vehicle_year,
    models::entity::{EntityKind, OfficeEntity},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum VehicleStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub office_id: Uuid,

    pub make: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    pub color: String,
    pub vin: String,

    pub registration_number: String,
    pub registration_expiry: NaiveDate,
    pub insurance_number: String,
    pub insurance_expiry: NaiveDate,

    #[serde(default)]
    pub status: VehicleStatus,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDraft {
    #[validate(length(min = 1, message = "Make is required"))]
    #[schema(example = "Toyota")]
    pub make: String,

    #[validate(length(min = 1, message = "Model is required"))]
    #[schema(example = "Camry")]
    pub model: String,

    #[validate(custom(function = "validate_vehicle_year"))]
    #[schema(example = 2023)]
    pub year: i32,

    #[validate(length(min = 1, message = "Plate number is required"))]
    pub plate_number: String,

    #[validate(length(min = 1, message = "Color is required"))]
    pub color: String,

    // VIN padrão: 17 caracteres
    #[validate(length(equal = 17, message = "VIN must have 17 characters"))]
    pub vin: String,

    #[validate(length(min = 1, message = "Registration number is required"))]
    pub registration_number: String,
    pub registration_expiry: NaiveDate,

    #[validate(length(min = 1, message = "Insurance number is required"))]
    pub insurance_number: String,
    pub insurance_expiry: NaiveDate,

    #[serde(default)]
    pub status: VehicleStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePatch {
    #[validate(length(min = 1, message = "Make is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,

    #[validate(length(min = 1, message = "Model is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[validate(custom(function = "validate_vehicle_year"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[validate(length(min = 1, message = "Plate number is required"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[validate(length(equal = 17, message = "VIN must have 17 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_expiry: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_expiry: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OfficeEntity for Vehicle {
    const KIND: EntityKind = EntityKind::Vehicle;
    type Draft = VehicleDraft;
    type Patch = VehiclePatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }
}
