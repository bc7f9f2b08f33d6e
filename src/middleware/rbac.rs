// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::OfficeContext},
    models::{
        auth::{AccessDecision, Permission},
        entity::OfficeEntity,
    },
};

/// 1. O Trait que define qual capacidade uma rota exige
pub trait PermissionDef: Send + Sync + 'static {
    fn permission() -> Permission;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
// Nada de consulta ao banco aqui: a lista de capacidades já veio com o usuário.
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);
        let reject = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| reject(AppError::InvalidToken))?;

        // B. Extrai Escritório
        let office = parts
            .extensions
            .get::<OfficeContext>()
            .ok_or_else(|| reject(AppError::InvalidOfficeHeader))?;

        // C. Verifica a capacidade
        let required = T::permission();
        match user.0.check_access(office.0, required) {
            AccessDecision::Granted => Ok(RequirePermission(PhantomData)),
            AccessDecision::Denied(reason) => {
                tracing::warn!(user_id = %user.0.id, office_id = %office.0, ?required, ?reason, "permissão negada");
                Err(reject(AppError::PermissionDenied(required)))
            }
        }
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermManageStaff;
impl PermissionDef for PermManageStaff {
    fn permission() -> Permission { Permission::ManageStaff }
}

pub struct PermManageSettings;
impl PermissionDef for PermManageSettings {
    fn permission() -> Permission { Permission::ManageSettings }
}

pub struct PermManageDocuments;
impl PermissionDef for PermManageDocuments {
    fn permission() -> Permission { Permission::ManageDocuments }
}

pub struct PermManageAlerts;
impl PermissionDef for PermManageAlerts {
    fn permission() -> Permission { Permission::ManageAlerts }
}

/// Permissão de escrita derivada do tipo da entidade (usada pelas rotas genéricas).
pub struct ManageEntity<E>(PhantomData<fn() -> E>);

impl<E: OfficeEntity> PermissionDef for ManageEntity<E> {
    fn permission() -> Permission {
        E::KIND.manage_permission()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{driver::Driver, payment::Payment};

    #[test]
    fn entity_routes_require_the_kind_permission() {
        assert_eq!(ManageEntity::<Driver>::permission(), Permission::ManageDrivers);
        assert_eq!(ManageEntity::<Payment>::permission(), Permission::ManagePayments);
    }
}
