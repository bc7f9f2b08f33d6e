// src/handlers/offices.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermManageSettings, PermManageStaff, RequirePermission},
        tenancy::OfficeContext,
    },
    models::{
        auth::{GrantAccessPayload, User},
        office::{CreateOfficePayload, Office, UpdateOfficePayload},
    },
};

// Cadastro: só precisa estar autenticado. O criador recebe todas as permissões.
#[utoipa::path(
    post,
    path = "/api/offices",
    tag = "Offices",
    request_body = CreateOfficePayload,
    responses(
        (status = 201, description = "Escritório cadastrado", body = Office),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_office(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    body: Result<Json<CreateOfficePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(body, &locale, &app_state.i18n_store)?;

    let office = app_state
        .office_service
        .register_office(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(office)))
}

#[utoipa::path(
    get,
    path = "/api/office",
    tag = "Offices",
    responses((status = 200, description = "Escritório atual, com os contadores", body = Office)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn get_office(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
) -> Result<impl IntoResponse, ApiError> {
    let office = app_state
        .office_service
        .get_office(office.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(office))
}

#[utoipa::path(
    put,
    path = "/api/office",
    tag = "Offices",
    request_body = UpdateOfficePayload,
    responses((status = 200, description = "Escritório atualizado", body = Office)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn update_office(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageSettings>,
    body: Result<Json<UpdateOfficePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(body, &locale, &app_state.i18n_store)?;

    let office = app_state
        .office_service
        .update_office(office.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(office))
}

#[utoipa::path(
    post,
    path = "/api/office/deactivate",
    tag = "Offices",
    responses((status = 200, description = "Escritório desativado", body = Office)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn deactivate_office(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageSettings>,
) -> Result<impl IntoResponse, ApiError> {
    let office = app_state
        .office_service
        .deactivate_office(office.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(office))
}

/// Recalcula os contadores a partir das coleções (corrige deriva).
#[utoipa::path(
    post,
    path = "/api/office/counters/reconcile",
    tag = "Offices",
    responses(
        (status = 200, description = "Contadores recalculados", body = Office),
        (status = 404, description = "Escritório não existe")
    ),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn reconcile_counters(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageSettings>,
) -> Result<impl IntoResponse, ApiError> {
    let office = app_state
        .office_service
        .reconcile_counters(office.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(office))
}

#[utoipa::path(
    post,
    path = "/api/office/staff",
    tag = "Offices",
    request_body = GrantAccessPayload,
    responses(
        (status = 200, description = "Permissões do usuário neste escritório substituídas", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn grant_staff_access(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageStaff>,
    body: Result<Json<GrantAccessPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(body, &locale, &app_state.i18n_store)?;

    let user = app_state
        .office_service
        .grant_staff_access(office.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(user))
}
