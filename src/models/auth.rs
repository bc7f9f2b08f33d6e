// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_phone;

pub const USERS_COLLECTION: &str = "users";
pub const OTP_COLLECTION: &str = "otpChallenges";

// Papel global do usuário. NÃO é usado para autorizar operações num escritório:
// isso é papel da lista de capacidades (OfficeAccess).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    #[default]
    Owner,
    Admin,
    Staff,
    Accountant,
    Supervisor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageDrivers,
    ManageVehicles,
    ManageContracts,
    ManagePayments,
    ManageDocuments,
    ManageAlerts,
    ManageStaff,
    ViewAnalytics,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::ManageDrivers,
        Permission::ManageVehicles,
        Permission::ManageContracts,
        Permission::ManagePayments,
        Permission::ManageDocuments,
        Permission::ManageAlerts,
        Permission::ManageStaff,
        Permission::ViewAnalytics,
        Permission::ManageSettings,
    ];
}

// Uma entrada da lista de capacidades: (escritório, permissões)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficeAccess {
    pub office_id: Uuid,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Mohammed")]
    pub name: String,
    #[schema(example = "+966501234567")]
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub office_access: Vec<OfficeAccess>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NoOfficeAccess,
    MissingPermission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_granted(self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

impl User {
    pub fn office_access(&self, office_id: Uuid) -> Option<&OfficeAccess> {
        self.office_access.iter().find(|a| a.office_id == office_id)
    }

    /// Verificação por pertença ao conjunto; o `role` não entra na conta.
    pub fn check_access(&self, office_id: Uuid, permission: Permission) -> AccessDecision {
        match self.office_access(office_id) {
            None => AccessDecision::Denied(DenialReason::NoOfficeAccess),
            Some(access) if access.permissions.contains(&permission) => AccessDecision::Granted,
            Some(_) => AccessDecision::Denied(DenialReason::MissingPermission),
        }
    }
}

// ---
// OTP
// ---
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    pub id: Uuid,
    pub phone: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpPayload {
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+966501234567")]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpPayload {
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+966501234567")]
    pub phone: String,

    #[validate(length(equal = 6, message = "The code has 6 digits"))]
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "At least one permission is required"))]
    pub permissions: Vec<Permission>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expira junto com o timeout de sessão
    pub iat: usize,
}
