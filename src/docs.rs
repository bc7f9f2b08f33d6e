// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

// As rotas CRUD genéricas (/drivers, /vehicles, /contracts, /payments, /alerts)
// não entram em `paths`; os schemas delas estão registrados abaixo.
#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::request_otp,
        handlers::auth::verify_otp,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_my_offices,

        // --- Offices ---
        handlers::offices::create_office,
        handlers::offices::get_office,
        handlers::offices::update_office,
        handlers::offices::deactivate_office,
        handlers::offices::reconcile_counters,
        handlers::offices::grant_staff_access,

        // --- Documents ---
        handlers::documents::upload_document,
        handlers::documents::list_documents,
        handlers::documents::list_expiring_documents,
        handlers::documents::get_document,
        handlers::documents::update_document,
        handlers::documents::delete_document,
        handlers::documents::download_url,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::create_notification,
        handlers::notifications::mark_as_read,
        handlers::notifications::delete_notification,
        handlers::notifications::get_settings,
        handlers::notifications::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::Permission,
            models::auth::OfficeAccess,
            models::auth::User,
            models::auth::RequestOtpPayload,
            models::auth::VerifyOtpPayload,
            models::auth::AuthResponse,
            models::auth::GrantAccessPayload,
            handlers::auth::OtpRequestedResponse,

            // --- Offices ---
            models::office::BusinessType,
            models::office::OfficeStatus,
            models::office::Office,
            models::office::CreateOfficePayload,
            models::office::UpdateOfficePayload,

            // --- Referências ---
            models::entity::EntityKind,
            models::entity::EntityRef,
            models::entity::DocumentOwner,

            // --- Drivers ---
            models::driver::DriverStatus,
            models::driver::Driver,
            models::driver::DriverDraft,
            models::driver::DriverPatch,

            // --- Vehicles ---
            models::vehicle::VehicleStatus,
            models::vehicle::Vehicle,
            models::vehicle::VehicleDraft,
            models::vehicle::VehiclePatch,

            // --- Contracts ---
            models::contract::ContractStatus,
            models::contract::Contract,
            models::contract::ContractDraft,
            models::contract::ContractPatch,

            // --- Payments ---
            models::payment::PaymentMethod,
            models::payment::PaymentType,
            models::payment::PaymentStatus,
            models::payment::Payment,
            models::payment::PaymentDraft,
            models::payment::PaymentPatch,

            // --- Alerts ---
            models::alert::AlertPriority,
            models::alert::AlertStatus,
            models::alert::Alert,
            models::alert::AlertDraft,
            models::alert::AlertPatch,

            // --- Documents ---
            models::document::DocumentType,
            models::document::ExpiryStatus,
            models::document::Document,
            models::document::DocumentMetadata,
            models::document::DocumentPatch,
            models::document::DocumentView,
            handlers::documents::UploadDocumentForm,
            handlers::documents::DownloadUrlResponse,

            // --- Notifications ---
            models::notification::NotificationType,
            models::notification::Notification,
            models::notification::NotificationDraft,
            models::notification::NotificationSettings,
            models::notification::UpdateNotificationSettingsPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login por código SMS (OTP)"),
        (name = "Users", description = "Dados do Usuário e Escritórios"),
        (name = "Offices", description = "Cadastro e Gestão do Escritório"),
        (name = "Documents", description = "Arquivos de Motoristas e Veículos"),
        (name = "Notifications", description = "Notificações e Preferências de Lembrete")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
