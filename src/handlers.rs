// src/handlers.rs

use axum::{extract::rejection::JsonRejection, Json};

use crate::{
    common::{
        error::{ApiError, AppError},
        i18n::I18nStore,
    },
    middleware::i18n::Locale,
};

pub mod auth;
pub mod documents;
pub mod entities;
pub mod notifications;
pub mod offices;

// Corpo JSON que não desserializa vira 400 localizado, no mesmo formato dos outros erros
pub(crate) fn json_body<T>(
    body: Result<Json<T>, JsonRejection>,
    locale: &Locale,
    i18n: &I18nStore,
) -> Result<T, ApiError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::MalformedBody(rejection.body_text()).to_api_error(locale, i18n))
}
