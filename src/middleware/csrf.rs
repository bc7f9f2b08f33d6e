// src/middleware/csrf.rs

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::SESSION_COOKIE, i18n::Locale},
};

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

// Double-submit: só vale para sessões de navegador (cookie). Bearer não precisa.
fn csrf_ok(method: &Method, headers: &HeaderMap) -> bool {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return true;
    }

    let has_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if has_bearer {
        return true;
    }

    let jar = CookieJar::from_headers(headers);
    if jar.get(SESSION_COOKIE).is_none() {
        return true;
    }

    let header_token = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
    match (jar.get(CSRF_COOKIE), header_token) {
        (Some(cookie), Some(token)) => !token.is_empty() && cookie.value() == token,
        _ => false,
    }
}

pub async fn csrf_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !csrf_ok(request.method(), request.headers()) {
        tracing::warn!(path = %request.uri().path(), "token CSRF ausente ou divergente");
        let locale = Locale::from_headers(request.headers());
        return Err(AppError::CsrfTokenInvalid.to_api_error(&locale, &app_state.i18n_store));
    }
    Ok(next.run(request).await)
}
