// src/handlers/documents.rs

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::json_body,
    middleware::{
        i18n::Locale,
        rbac::{PermManageDocuments, RequirePermission},
        tenancy::OfficeContext,
    },
    models::document::{DocumentMetadata, DocumentPatch, DocumentView},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadUrlResponse {
    pub url: String,
}

// Formato do multipart: parte "metadata" (JSON) + parte "file" (binário)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentForm {
    /// JSON com name, documentType, entity, expiryDate e notes
    pub metadata: String,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

struct UploadParts {
    metadata: DocumentMetadata,
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadParts, AppError> {
    let mut metadata = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedBody(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("metadata") => {
                let raw = field.text().await.map_err(|e| AppError::MalformedBody(e.body_text()))?;
                let parsed: DocumentMetadata = serde_json::from_str(&raw)
                    .map_err(|e| AppError::MalformedBody(format!("metadata: {e}")))?;
                metadata = Some(parsed);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let bytes = field.bytes().await.map_err(|e| AppError::MalformedBody(e.body_text()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            // Partes desconhecidas são ignoradas
            _ => {}
        }
    }

    let metadata = metadata.ok_or_else(|| AppError::MalformedBody("parte 'metadata' ausente".into()))?;
    let (file_name, bytes) = file.ok_or_else(|| AppError::MalformedBody("parte 'file' ausente".into()))?;
    Ok(UploadParts { metadata, file_name, bytes })
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body(content = UploadDocumentForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Arquivo enviado e documento registrado", body = DocumentView),
        (status = 400, description = "Multipart ou metadados inválidos")
    ),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn upload_document(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageDocuments>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let document = app_state
        .document_service
        .upload_document(office.0, upload.metadata, &upload.file_name, &upload.bytes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let view = app_state
        .document_service
        .get_document(office.0, document.id, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    responses((status = 200, description = "Documentos do escritório (mais recentes primeiro)", body = Vec<DocumentView>)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .document_service
        .list_documents(office.0, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/expiring",
    tag = "Documents",
    responses((status = 200, description = "Vencidos ou vencendo dentro de daysBeforeExpiry", body = Vec<DocumentView>)),
    params(("x-office-id" = Uuid, Header, description = "ID do Escritório")),
    security(("api_jwt" = []))
)]
pub async fn list_expiring_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .document_service
        .list_expiring(office.0, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(documents))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    responses(
        (status = 200, description = "Documento", body = DocumentView),
        (status = 404, description = "Documento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Documento"),
        ("x-office-id" = Uuid, Header, description = "ID do Escritório")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .document_service
        .get_document(office.0, id, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    tag = "Documents",
    request_body = DocumentPatch,
    responses((status = 200, description = "Metadados atualizados", body = DocumentView)),
    params(
        ("id" = Uuid, Path, description = "ID do Documento"),
        ("x-office-id" = Uuid, Header, description = "ID do Escritório")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_document(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageDocuments>,
    Path(id): Path<Uuid>,
    body: Result<Json<DocumentPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = json_body(body, &locale, &app_state.i18n_store)?;

    let view = app_state
        .document_service
        .update_document(office.0, id, &patch, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(view))
}

/// Apaga o arquivo (best-effort) e depois o registro.
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    responses(
        (status = 204, description = "Documento removido"),
        (status = 404, description = "Documento não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Documento"),
        ("x-office-id" = Uuid, Header, description = "ID do Escritório")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    _guard: RequirePermission<PermManageDocuments>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .document_service
        .delete_document(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/download-url",
    tag = "Documents",
    responses((status = 200, description = "URL de download do arquivo", body = DownloadUrlResponse)),
    params(
        ("id" = Uuid, Path, description = "ID do Documento"),
        ("x-office-id" = Uuid, Header, description = "ID do Escritório")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_url(
    State(app_state): State<AppState>,
    locale: Locale,
    office: OfficeContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let url = app_state
        .document_service
        .download_url(office.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(DownloadUrlResponse { url }))
}
