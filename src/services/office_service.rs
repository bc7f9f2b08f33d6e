// src/services/office_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{OfficeRepository, UserRepository},
    models::{
        auth::{GrantAccessPayload, Permission, User},
        office::{CreateOfficePayload, Office, UpdateOfficePayload},
    },
    services::counter_service::OfficeCounterService,
};

#[derive(Clone)]
pub struct OfficeService {
    office_repo: OfficeRepository,
    user_repo: UserRepository,
    counters: OfficeCounterService,
}

impl OfficeService {
    pub fn new(office_repo: OfficeRepository, user_repo: UserRepository, counters: OfficeCounterService) -> Self {
        Self { office_repo, user_repo, counters }
    }

    /// Cadastra o escritório e dá ao criador todas as permissões nele.
    pub async fn register_office(&self, owner: &User, payload: &CreateOfficePayload) -> Result<Office, AppError> {
        payload.validate()?;

        // 1. Cria o escritório (contadores zerados)
        let office = self.office_repo.create(owner.id, payload).await?;

        // 2. Vincula o dono com a lista completa de capacidades
        self.user_repo
            .grant_office_access(owner.id, office.id, Permission::ALL.to_vec())
            .await?;

        tracing::info!(office_id = %office.id, owner_id = %owner.id, "🏢 Escritório cadastrado");
        Ok(office)
    }

    pub async fn get_office(&self, office_id: Uuid) -> Result<Office, AppError> {
        self.office_repo.get(office_id).await
    }

    pub async fn find_office(&self, office_id: Uuid) -> Result<Option<Office>, AppError> {
        self.office_repo.find_by_id(office_id).await
    }

    pub async fn update_office(&self, office_id: Uuid, payload: &UpdateOfficePayload) -> Result<Office, AppError> {
        payload.validate()?;
        self.office_repo.update(office_id, payload).await
    }

    pub async fn deactivate_office(&self, office_id: Uuid) -> Result<Office, AppError> {
        let office = self.office_repo.deactivate(office_id).await?;
        tracing::info!(office_id = %office_id, "escritório desativado");
        Ok(office)
    }

    pub async fn reconcile_counters(&self, office_id: Uuid) -> Result<Office, AppError> {
        self.counters.reconcile(office_id).await?;
        self.office_repo.get(office_id).await
    }

    pub async fn grant_staff_access(&self, office_id: Uuid, payload: &GrantAccessPayload) -> Result<User, AppError> {
        payload.validate()?;
        let office = self.office_repo.get(office_id).await?;

        // A entrada do dono só nasce no cadastro do escritório
        if payload.user_id == office.owner_id {
            tracing::warn!(office_id = %office_id, user_id = %payload.user_id, "tentativa de alterar o acesso do dono");
            return Err(AppError::OwnerAccessLocked);
        }

        self.user_repo
            .grant_office_access(payload.user_id, office_id, payload.permissions.clone())
            .await
    }

    /// Escritórios em que o usuário tem alguma entrada de acesso.
    pub async fn offices_for_user(&self, user: &User) -> Result<Vec<Office>, AppError> {
        let mut offices = Vec::with_capacity(user.office_access.len());
        for access in &user.office_access {
            if let Some(office) = self.office_repo.find_by_id(access.office_id).await? {
                offices.push(office);
            }
        }
        Ok(offices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{document_store::DocumentStore, MemoryDocumentStore},
        models::{auth::AccessDecision, office::BusinessType},
        test_utils::init_test_tracing,
    };
    use std::sync::Arc;

    struct Fixture {
        service: OfficeService,
        users: UserRepository,
    }

    fn fixture() -> Fixture {
        init_test_tracing();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let users = UserRepository::new(store.clone());
        let service = OfficeService::new(
            OfficeRepository::new(store.clone()),
            users.clone(),
            OfficeCounterService::new(store),
        );
        Fixture { service, users }
    }

    fn payload(name: &str) -> CreateOfficePayload {
        CreateOfficePayload {
            name: name.into(),
            address: None,
            phone: "+966501234567".into(),
            email: Some("office@example.com".into()),
            city: None,
            license_number: "LIC-1".into(),
            tax_number: None,
            business_type: BusinessType::Private,
        }
    }

    #[tokio::test]
    async fn creator_gets_every_permission_on_the_new_office() {
        let fx = fixture();
        let owner = fx.users.create("+966501234567").await.unwrap();

        let office = fx.service.register_office(&owner, &payload("Taxi Al-Noor")).await.unwrap();

        let owner = fx.users.find_by_id(owner.id).await.unwrap().unwrap();
        for permission in Permission::ALL {
            assert_eq!(owner.check_access(office.id, permission), AccessDecision::Granted);
        }
        assert_eq!(fx.service.offices_for_user(&owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_office_is_rejected_before_any_write() {
        let fx = fixture();
        let owner = fx.users.create("+966501234567").await.unwrap();

        let result = fx.service.register_office(&owner, &payload("X")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let owner = fx.users.find_by_id(owner.id).await.unwrap().unwrap();
        assert!(owner.office_access.is_empty());
    }

    #[tokio::test]
    async fn staff_grant_is_scoped_to_one_office() {
        let fx = fixture();
        let owner = fx.users.create("+966500000001").await.unwrap();
        let staff = fx.users.create("+966500000002").await.unwrap();
        let office_a = fx.service.register_office(&owner, &payload("Escritório A")).await.unwrap();
        let office_b = fx.service.register_office(&owner, &payload("Escritório B")).await.unwrap();

        let grant = GrantAccessPayload { user_id: staff.id, permissions: vec![Permission::ManageDrivers] };
        let staff = fx.service.grant_staff_access(office_a.id, &grant).await.unwrap();

        assert!(staff.check_access(office_a.id, Permission::ManageDrivers).is_granted());
        assert!(!staff.check_access(office_a.id, Permission::ManagePayments).is_granted());
        assert!(!staff.check_access(office_b.id, Permission::ManageDrivers).is_granted());
    }

    #[tokio::test]
    async fn owner_access_cannot_be_replaced_by_a_grant() {
        let fx = fixture();
        let owner = fx.users.create("+966500000001").await.unwrap();
        let office = fx.service.register_office(&owner, &payload("Escritório A")).await.unwrap();

        let grant = GrantAccessPayload { user_id: owner.id, permissions: vec![Permission::ManageDrivers] };
        let result = fx.service.grant_staff_access(office.id, &grant).await;
        assert!(matches!(result, Err(AppError::OwnerAccessLocked)));

        let owner = fx.users.find_by_id(owner.id).await.unwrap().unwrap();
        for permission in Permission::ALL {
            assert!(owner.check_access(office.id, permission).is_granted());
        }
    }
}
