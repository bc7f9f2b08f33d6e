// src/services/notification_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EntityRepository, SettingsRepository},
    models::notification::{
        Notification, NotificationDraft, NotificationPatch, NotificationSettings,
        UpdateNotificationSettingsPayload,
    },
};

#[derive(Clone)]
pub struct NotificationService {
    repo: EntityRepository<Notification>,
    settings_repo: SettingsRepository,
}

impl NotificationService {
    pub fn new(repo: EntityRepository<Notification>, settings_repo: SettingsRepository) -> Self {
        Self { repo, settings_repo }
    }

    pub async fn list(&self, office_id: Uuid) -> Result<Vec<Notification>, AppError> {
        self.repo.list_by_office(office_id).await
    }

    pub async fn create(&self, office_id: Uuid, draft: &NotificationDraft) -> Result<Notification, AppError> {
        let id = self.repo.insert(office_id, draft).await?;
        self.repo.get_by_id(id).await
    }

    pub async fn mark_as_read(&self, office_id: Uuid, id: Uuid) -> Result<Notification, AppError> {
        self.repo.get_in_office(office_id, id).await?;
        self.repo.update(id, &NotificationPatch { read: Some(true) }).await
    }

    pub async fn delete(&self, office_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let notification = self.repo.get_in_office(office_id, id).await?;
        self.repo.remove(&notification).await
    }

    pub async fn get_settings(&self, office_id: Uuid) -> Result<NotificationSettings, AppError> {
        self.settings_repo.get_settings(office_id).await
    }

    pub async fn update_settings(
        &self,
        office_id: Uuid,
        input: &UpdateNotificationSettingsPayload,
    ) -> Result<NotificationSettings, AppError> {
        self.settings_repo.upsert_settings(office_id, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{document_store::DocumentStore, MemoryDocumentStore},
        models::notification::NotificationType,
        services::counter_service::OfficeCounterService,
        test_utils::{init_test_tracing, RecordingBlobStore},
    };
    use std::sync::Arc;

    fn service() -> NotificationService {
        init_test_tracing();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let repo = EntityRepository::new(
            store.clone(),
            Arc::new(RecordingBlobStore::new()),
            OfficeCounterService::new(store.clone()),
        );
        NotificationService::new(repo, SettingsRepository::new(store))
    }

    fn draft(title: &str) -> NotificationDraft {
        NotificationDraft {
            title: title.into(),
            message: "Seguro do veículo vence em 7 dias".into(),
            notification_type: NotificationType::Reminder,
            read: false,
        }
    }

    #[tokio::test]
    async fn notifications_start_unread_and_can_be_marked_read() {
        let service = service();
        let office = Uuid::new_v4();

        let created = service.create(office, &draft("Lembrete")).await.unwrap();
        assert!(!created.read);

        let read = service.mark_as_read(office, created.id).await.unwrap();
        assert!(read.read);
        assert_eq!(read.title, "Lembrete");
    }

    #[tokio::test]
    async fn other_offices_cannot_touch_a_notification() {
        let service = service();
        let office = Uuid::new_v4();
        let created = service.create(office, &draft("Lembrete")).await.unwrap();

        assert!(matches!(
            service.delete(Uuid::new_v4(), created.id).await,
            Err(AppError::EntityNotFound { .. })
        ));
        service.delete(office, created.id).await.unwrap();
        assert!(service.list(office).await.unwrap().is_empty());
    }
}
