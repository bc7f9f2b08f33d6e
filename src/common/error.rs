// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::{
        auth::Permission,
        entity::{EntityKind, EntityRef},
    },
};

// Nosso tipo de erro de domínio. Os repositórios e serviços só conhecem este tipo;
// quem fala HTTP é o ApiError lá embaixo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    #[error("Referência inválida: {0:?}")]
    InvalidReference(EntityRef),

    #[error("Cabeçalho x-office-id ausente ou inválido")]
    InvalidOfficeHeader,

    #[error("{kind} {id} não encontrado")]
    EntityNotFound { kind: EntityKind, id: Uuid },

    #[error("Escritório {0} não encontrado")]
    OfficeNotFound(Uuid),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Código de verificação inválido")]
    InvalidOtp,

    #[error("Código de verificação expirado")]
    OtpExpired,

    #[error("Tentativas de verificação esgotadas")]
    TooManyAttempts,

    #[error("Sem acesso ao escritório {0}")]
    AccessDenied(Uuid),

    #[error("Permissão ausente: {0:?}")]
    PermissionDenied(Permission),

    #[error("Escritório {0} desativado")]
    OfficeInactive(Uuid),

    #[error("O acesso do dono do escritório não pode ser alterado")]
    OwnerAccessLocked,

    #[error("Arquivo fora do alcance do usuário")]
    FileAccessDenied,

    #[error("Token CSRF inválido")]
    CsrfTokenInvalid,

    #[error("Limite de requisições excedido")]
    RateLimitExceeded,

    // Falhas de transporte/backend. Propagam sem retry até a borda da requisição.
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Store indisponível: {0}")]
    StoreUnavailable(String),

    #[error("Erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

// ---
// ApiError: o que de fato sai pela resposta HTTP
// ---
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedBody(_)
            | AppError::InvalidReference(_)
            | AppError::InvalidOfficeHeader => StatusCode::BAD_REQUEST,
            AppError::InvalidToken
            | AppError::InvalidOtp
            | AppError::OtpExpired
            | AppError::TooManyAttempts => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_)
            | AppError::PermissionDenied(_)
            | AppError::OfficeInactive(_)
            | AppError::OwnerAccessLocked
            | AppError::FileAccessDenied
            | AppError::CsrfTokenInvalid => StatusCode::FORBIDDEN,
            AppError::EntityNotFound { .. }
            | AppError::OfficeNotFound(_)
            | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave do catálogo de mensagens (ver common/i18n.rs)
    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::MalformedBody(_) => "malformed_body",
            AppError::InvalidReference(_) => "invalid_reference",
            AppError::InvalidOfficeHeader => "invalid_office_header",
            AppError::EntityNotFound { .. } => "entity_not_found",
            AppError::OfficeNotFound(_) => "office_not_found",
            AppError::UserNotFound => "user_not_found",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidOtp => "invalid_otp",
            AppError::OtpExpired => "otp_expired",
            AppError::TooManyAttempts => "too_many_attempts",
            AppError::AccessDenied(_) | AppError::FileAccessDenied => "access_denied",
            AppError::PermissionDenied(_) => "permission_denied",
            AppError::OfficeInactive(_) => "office_inactive",
            AppError::OwnerAccessLocked => "owner_access_locked",
            AppError::CsrfTokenInvalid => "csrf_invalid",
            AppError::RateLimitExceeded => "rate_limited",
            _ => "internal_error",
        }
    }

    /// Converte o erro de domínio numa resposta localizada.
    /// Erros de store/inesperados viram uma mensagem genérica; o detalhe só vai para o log.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status_code();
        let error = i18n.translate(&locale.0, self.message_key());

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
            return ApiError { status, error, details: None };
        }

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::MalformedBody(reason) => Some(json!({ "body": reason })),
            AppError::InvalidReference(reference) => Some(json!({ "reference": reference })),
            AppError::EntityNotFound { kind, id } => Some(json!({ "kind": kind, "id": id })),
            AppError::PermissionDenied(permission) => Some(json!({ "permission": permission })),
            _ => None,
        };

        ApiError { status, error, details }
    }
}
