// src/db/user_repo.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{to_fields, DocumentStore},
    models::auth::{OfficeAccess, OtpChallenge, Permission, User, UserRole, OTP_COLLECTION, USERS_COLLECTION},
};

// O repositório de usuários e dos desafios OTP
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.store
            .get(USERS_COLLECTION, id)
            .await?
            .map(|doc| doc.into_entity())
            .transpose()
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        self.store
            .query(USERS_COLLECTION, "phone", &json!(phone))
            .await?
            .into_iter()
            .next()
            .map(|doc| doc.into_entity())
            .transpose()
    }

    /// Primeiro login de um telefone: o usuário nasce como owner e sem escritórios.
    pub async fn create(&self, phone: &str) -> Result<User, AppError> {
        let fields = to_fields(&json!({
            "name": phone,
            "phone": phone,
            "email": null,
            "role": UserRole::Owner,
            "isActive": true,
            "lastLogin": null,
            "officeAccess": [],
        }))?;
        let id = self.store.insert(USERS_COLLECTION, fields).await?;

        self.find_by_id(id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        let fields = to_fields(&json!({ "lastLogin": at }))?;
        if !self.store.update(USERS_COLLECTION, id, fields).await? {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    /// Define as permissões do usuário num escritório (substitui a entrada, se houver).
    pub async fn grant_office_access(
        &self,
        user_id: Uuid,
        office_id: Uuid,
        permissions: Vec<Permission>,
    ) -> Result<User, AppError> {
        let mut user = self.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)?;

        let mut unique: Vec<Permission> = Vec::with_capacity(permissions.len());
        for permission in permissions {
            if !unique.contains(&permission) {
                unique.push(permission);
            }
        }
        let permissions = unique;
        match user.office_access.iter_mut().find(|a| a.office_id == office_id) {
            Some(entry) => entry.permissions = permissions,
            None => user.office_access.push(OfficeAccess { office_id, permissions }),
        }

        let fields = to_fields(&json!({ "officeAccess": user.office_access }))?;
        if !self.store.update(USERS_COLLECTION, user_id, fields).await? {
            return Err(AppError::UserNotFound);
        }
        self.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)
    }

    // ---
    // Desafios OTP
    // ---

    /// Um desafio ativo por telefone: o novo substitui os anteriores.
    pub async fn replace_challenge(
        &self,
        phone: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, AppError> {
        for old in self.store.query(OTP_COLLECTION, "phone", &json!(phone)).await? {
            self.store.delete(OTP_COLLECTION, old.id).await?;
        }

        let fields = to_fields(&json!({
            "phone": phone,
            "codeHash": code_hash,
            "expiresAt": expires_at,
            "attempts": 0,
        }))?;
        self.store.insert(OTP_COLLECTION, fields).await
    }

    pub async fn find_challenge(&self, phone: &str) -> Result<Option<OtpChallenge>, AppError> {
        self.store
            .query(OTP_COLLECTION, "phone", &json!(phone))
            .await?
            .into_iter()
            .next()
            .map(|doc| doc.into_entity())
            .transpose()
    }

    /// Conta mais uma tentativa e devolve o total (atômico no store).
    pub async fn record_attempt(&self, challenge_id: Uuid) -> Result<Option<i64>, AppError> {
        self.store.increment(OTP_COLLECTION, challenge_id, "attempts", 1).await
    }

    pub async fn delete_challenge(&self, challenge_id: Uuid) -> Result<(), AppError> {
        self.store.delete(OTP_COLLECTION, challenge_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryDocumentStore;

    #[tokio::test]
    async fn new_user_is_owner_without_offices() {
        let repo = UserRepository::new(Arc::new(MemoryDocumentStore::new()));
        let user = repo.create("+966501234567").await.unwrap();

        assert_eq!(user.role, UserRole::Owner);
        assert!(user.office_access.is_empty());
        assert_eq!(repo.find_by_phone("+966501234567").await.unwrap().unwrap().id, user.id);
    }

    #[tokio::test]
    async fn granting_twice_replaces_the_entry() {
        let repo = UserRepository::new(Arc::new(MemoryDocumentStore::new()));
        let user = repo.create("+966501234567").await.unwrap();
        let office = Uuid::new_v4();

        repo.grant_office_access(user.id, office, vec![Permission::ManageDrivers]).await.unwrap();
        let user = repo
            .grant_office_access(user.id, office, vec![Permission::ManagePayments])
            .await
            .unwrap();

        assert_eq!(user.office_access.len(), 1);
        assert_eq!(user.office_access[0].permissions, vec![Permission::ManagePayments]);
    }

    #[tokio::test]
    async fn new_challenge_replaces_the_previous_one() {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = UserRepository::new(store.clone());
        let expires = Utc::now();

        let first = repo.replace_challenge("+966501234567", "h1", expires).await.unwrap();
        let second = repo.replace_challenge("+966501234567", "h2", expires).await.unwrap();

        assert!(store.get(OTP_COLLECTION, first).await.unwrap().is_none());
        let challenge = repo.find_challenge("+966501234567").await.unwrap().unwrap();
        assert_eq!(challenge.id, second);
        assert_eq!(challenge.code_hash, "h2");
        assert_eq!(repo.record_attempt(second).await.unwrap(), Some(1));
    }
}
