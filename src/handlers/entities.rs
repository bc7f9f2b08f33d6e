// src/handlers/entities.rs
//
// Rotas CRUD genéricas para as coleções contadas (motoristas, veículos, contratos,
// pagamentos, alertas). Leitura só exige acesso ao escritório; escrita exige a
// permissão `manage_*` do tipo.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::{
        i18n::Locale,
        rbac::{ManageEntity, RequirePermission},
        tenancy::OfficeContext,
    },
    models::entity::OfficeEntity,
};

pub fn entity_routes<E: OfficeEntity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entities::<E>).post(create_entity::<E>))
        .route(
            "/{id}",
            get(get_entity::<E>).put(update_entity::<E>).delete(delete_entity::<E>),
        )
}

pub async fn list_entities<E: OfficeEntity>(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
) -> Result<impl IntoResponse, ApiError> {
    let entities = app_state
        .repository::<E>()
        .list_by_office(office.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entities))
}

pub async fn create_entity<E: OfficeEntity>(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<ManageEntity<E>>,
    body: Result<Json<E::Draft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = json_body(body, &locale, &app_state.i18n_store)?;
    let repo = app_state.repository::<E>();

    // 1. Insere (valida, checa referências e incrementa o contador)
    let id = repo
        .insert(office.0, &draft)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // 2. Devolve o registro como ficou gravado
    let created = repo
        .get_by_id(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_entity<E: OfficeEntity>(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entity = app_state
        .repository::<E>()
        .get_in_office(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entity))
}

pub async fn update_entity<E: OfficeEntity>(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<ManageEntity<E>>,
    Path(id): Path<Uuid>,
    body: Result<Json<E::Patch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = json_body(body, &locale, &app_state.i18n_store)?;
    let repo = app_state.repository::<E>();

    // Registro de outro escritório responde como inexistente
    repo.get_in_office(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = repo
        .update(id, &patch)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}

pub async fn delete_entity<E: OfficeEntity>(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<ManageEntity<E>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = app_state.repository::<E>();

    let entity = repo
        .get_in_office(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    repo.remove(&entity)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
