// src/handlers/notifications.rs

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::{
        i18n::Locale,
        rbac::{PermManageAlerts, PermManageSettings, RequirePermission},
        tenancy::OfficeContext,
    },
    models::notification::{
        Notification, NotificationDraft, NotificationSettings, UpdateNotificationSettingsPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Notificações do escritório", body = Vec<Notification>)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = app_state
        .notification_service
        .list(office.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(notifications))
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    request_body = NotificationDraft,
    responses((status = 201, description = "Notificação criada (não lida)", body = Notification)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn create_notification(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageAlerts>,
    body: Result<Json<NotificationDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = json_body(body, &locale, &app_state.i18n_store)?;

    let notification = app_state
        .notification_service
        .create(office.0, &draft)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(notification)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    responses((status = 200, description = "Notificação marcada como lida", body = Notification)),
    params(
        ("id" = Uuid, Path, description = "ID da Notificação"),
        ("x-office-id" = Uuid, Header, description = "ID do Escritório")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_as_read(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = app_state
        .notification_service
        .mark_as_read(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(notification))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    responses((status = 204, description = "Notificação removida")),
    params(
        ("id" = Uuid, Path, description = "ID da Notificação"),
        ("x-office-id" = Uuid, Header, description = "ID do Escritório")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_notification(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageAlerts>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .notification_service
        .delete(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/notifications/settings",
    tag = "Notifications",
    responses((status = 200, description = "Preferências (defaults se nunca salvas)", body = NotificationSettings)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .notification_service
        .get_settings(office.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/notifications/settings",
    tag = "Notifications",
    request_body = UpdateNotificationSettingsPayload,
    responses((status = 200, description = "Preferências salvas", body = NotificationSettings)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageSettings>,
    body: Result<Json<UpdateNotificationSettingsPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = json_body(body, &locale, &app_state.i18n_store)?;

    let settings = app_state
        .notification_service
        .update_settings(office.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}
