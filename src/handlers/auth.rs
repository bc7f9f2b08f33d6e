// src/handlers/auth.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::json_body,
    middleware::{
        auth::{AuthenticatedUser, SESSION_COOKIE},
        csrf::CSRF_COOKIE,
        i18n::Locale,
    },
    models::{
        auth::{AuthResponse, RequestOtpPayload, User, VerifyOtpPayload},
        office::Office,
    },
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestedResponse {
    pub expires_at: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/api/auth/otp/request",
    tag = "Auth",
    request_body = RequestOtpPayload,
    responses(
        (status = 200, description = "Código enviado por SMS", body = OtpRequestedResponse),
        (status = 400, description = "Telefone inválido")
    )
)]
pub async fn request_otp(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Result<Json<RequestOtpPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(body, &locale, &app_state.i18n_store)?;

    let expires_at = app_state
        .auth_service
        .request_code(&payload.phone)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OtpRequestedResponse { expires_at }))
}

#[utoipa::path(
    post,
    path = "/api/auth/otp/verify",
    tag = "Auth",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "Sessão criada (também enviada nos cookies session_token e csrf_token)", body = AuthResponse),
        (status = 401, description = "Código inválido, expirado ou tentativas esgotadas")
    )
)]
pub async fn verify_otp(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    body: Result<Json<VerifyOtpPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(body, &locale, &app_state.i18n_store)?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .verify_code(&payload.phone, &payload.code)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Sessão de navegador: cookie HttpOnly + token CSRF legível pelo front.
    // Cookies de sessão; quem expira de verdade é o JWT.
    let session = Cookie::build((SESSION_COOKIE, response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    let csrf = Cookie::build((CSRF_COOKIE, uuid::Uuid::new_v4().simple().to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(session).add(csrf), Json(response)))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

#[utoipa::path(
    get,
    path = "/api/users/me/offices",
    tag = "Users",
    responses(
        (status = 200, description = "Escritórios em que o usuário tem acesso", body = Vec<Office>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_offices(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let offices = app_state
        .office_service
        .offices_for_user(&user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(offices))
}
