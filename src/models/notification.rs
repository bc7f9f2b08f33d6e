// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::entity::{EntityKind, OfficeEntity};

pub const NOTIFICATION_SETTINGS_COLLECTION: &str = "notificationSettings";
pub const DEFAULT_DAYS_BEFORE_EXPIRY: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    #[default]
    Info,
    Warning,
    Reminder,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub office_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,

    // Toda notificação nasce não lida; o cliente não escolhe
    #[serde(skip_deserializing, default)]
    pub read: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl OfficeEntity for Notification {
    const KIND: EntityKind = EntityKind::Notification;
    type Draft = NotificationDraft;
    type Patch = NotificationPatch;

    fn id(&self) -> Uuid {
        self.id
    }

    fn office_id(&self) -> Uuid {
        self.office_id
    }
}

// ---
// Preferências de notificação (uma por escritório)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub sms_notifications: bool,
    pub app_notifications: bool,
    pub expiry_reminders: bool,
    pub payment_reminders: bool,
    pub contract_reminders: bool,
    pub maintenance_reminders: bool,
    pub days_before_expiry: i64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sms_notifications: true,
            app_notifications: true,
            expiry_reminders: true,
            payment_reminders: true,
            contract_reminders: true,
            maintenance_reminders: true,
            days_before_expiry: DEFAULT_DAYS_BEFORE_EXPIRY,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationSettingsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_reminders: Option<bool>,

    #[validate(range(min = 1, max = 90, message = "Must be between 1 and 90 days"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_before_expiry: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_cannot_create_a_read_notification() {
        let draft: NotificationDraft = serde_json::from_value(json!({
            "title": "Aviso",
            "message": "Olá",
            "read": true
        }))
        .unwrap();
        assert!(!draft.read);
        assert_eq!(serde_json::to_value(&draft).unwrap()["read"], json!(false));
    }

    #[test]
    fn missing_settings_fields_take_defaults() {
        let settings: NotificationSettings =
            serde_json::from_value(json!({ "smsNotifications": false })).unwrap();
        assert!(!settings.sms_notifications);
        assert!(settings.app_notifications);
        assert_eq!(settings.days_before_expiry, 7);
    }

    #[test]
    fn days_before_expiry_is_bounded() {
        let too_many = UpdateNotificationSettingsPayload { days_before_expiry: Some(91), ..Default::default() };
        let zero = UpdateNotificationSettingsPayload { days_before_expiry: Some(0), ..Default::default() };
        let ok = UpdateNotificationSettingsPayload { days_before_expiry: Some(30), ..Default::default() };

        assert!(too_many.validate().is_err());
        assert!(zero.validate().is_err());
        assert!(ok.validate().is_ok());
    }
}
