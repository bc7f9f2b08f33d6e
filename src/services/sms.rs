// src/services/sms.rs

use async_trait::async_trait;

use crate::common::error::AppError;

/// Canal por onde o código OTP chega ao usuário.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), AppError>;
}

// Sem provedor de SMS configurado: o código vai para o log (desenvolvimento)
#[derive(Debug, Default, Clone)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_code(&self, phone: &str, code: &str) -> Result<(), AppError> {
        tracing::info!(phone, code, "📱 Código OTP (envio simulado)");
        Ok(())
    }
}
