// src/services.rs

pub mod auth;
pub mod sms;
pub mod counter_service;
pub mod office_service;
pub mod document_service;
pub mod notification_service;
