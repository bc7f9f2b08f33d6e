// src/middleware/tenancy.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// O nome do nosso cabeçalho HTTP customizado
pub const OFFICE_ID_HEADER: &str = "x-office-id";

/// Escritório em que a requisição opera. Só existe depois do `tenant_guard`.
#[derive(Debug, Clone, Copy)]
pub struct OfficeContext(pub Uuid);

fn office_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers.get(OFFICE_ID_HEADER).ok_or(AppError::InvalidOfficeHeader)?;
    let value_str = value.to_str().map_err(|_| AppError::InvalidOfficeHeader)?;
    Uuid::parse_str(value_str.trim()).map_err(|_| AppError::InvalidOfficeHeader)
}

// Roda depois do auth_guard: o usuário já está nas extensions
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    // 1. Qual escritório?
    let office_id = office_id_from_headers(request.headers()).map_err(reject)?;

    // 2. O usuário tem alguma entrada de acesso nele?
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| reject(AppError::InvalidToken))?;
    if user.0.office_access(office_id).is_none() {
        tracing::warn!(user_id = %user.0.id, office_id = %office_id, "acesso negado ao escritório");
        return Err(reject(AppError::AccessDenied(office_id)));
    }

    // 3. Escritório desativado só aceita leitura
    if !matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        let office = app_state.office_service.find_office(office_id).await.map_err(reject)?;
        if office.is_some_and(|o| !o.is_active) {
            tracing::warn!(office_id = %office_id, method = %request.method(), "escrita em escritório desativado");
            return Err(reject(AppError::OfficeInactive(office_id)));
        }
    }

    request.extensions_mut().insert(OfficeContext(office_id));
    Ok(next.run(request).await)
}

/// Escritório dono de um arquivo servido em /files: `offices/{officeId}/...`.
fn office_id_from_blob_path(path: &str) -> Option<Uuid> {
    let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
    if segments.peek() == Some(&"files") {
        segments.next();
    }
    if segments.next()? != "offices" {
        return None;
    }
    let office_id = Uuid::parse_str(segments.next()?).ok()?;

    // Precisa apontar para algo dentro do escritório, sem voltar diretórios
    segments.peek()?;
    if segments.any(|s| s == "." || s == ".." || s.contains('%') || s.contains('\\')) {
        return None;
    }
    Some(office_id)
}

// Roda depois do auth_guard, na frente do ServeDir de /files
pub async fn blob_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());
    let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| reject(AppError::InvalidToken))?;

    let allowed = office_id_from_blob_path(request.uri().path())
        .is_some_and(|office_id| user.0.office_access(office_id).is_some());
    if !allowed {
        tracing::warn!(user_id = %user.0.id, path = request.uri().path(), "arquivo negado");
        return Err(reject(AppError::FileAccessDenied));
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for OfficeContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<OfficeContext>().copied().ok_or_else(|| {
            let app_state = AppState::from_ref(state);
            AppError::InvalidOfficeHeader.to_api_error(&Locale::from_headers(&parts.headers), &app_state.i18n_store)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_office_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(OFFICE_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(office_id_from_headers(&headers).unwrap(), id);
    }

    #[test]
    fn missing_or_garbage_header_is_rejected() {
        assert!(matches!(office_id_from_headers(&HeaderMap::new()), Err(AppError::InvalidOfficeHeader)));

        let mut headers = HeaderMap::new();
        headers.insert(OFFICE_ID_HEADER, HeaderValue::from_static("escritorio-1"));
        assert!(matches!(office_id_from_headers(&headers), Err(AppError::InvalidOfficeHeader)));
    }

    #[test]
    fn blob_path_names_its_office() {
        let id = Uuid::new_v4();
        assert_eq!(office_id_from_blob_path(&format!("/files/offices/{id}/documents/1_cnh.pdf")), Some(id));
        assert_eq!(office_id_from_blob_path(&format!("/offices/{id}/documents/1_cnh.pdf")), Some(id));
    }

    #[test]
    fn blob_path_without_office_or_with_traversal_is_refused() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert_eq!(office_id_from_blob_path("/files/outros/arquivo.pdf"), None);
        assert_eq!(office_id_from_blob_path("/files/offices/abc/documents/1.pdf"), None);
        assert_eq!(office_id_from_blob_path(&format!("/files/offices/{id}")), None);
        assert_eq!(office_id_from_blob_path(&format!("/files/offices/{id}/../{other}/documents/1.pdf")), None);
        assert_eq!(office_id_from_blob_path(&format!("/files/offices/{id}/%2e%2e/{other}/1.pdf")), None);
    }
}
