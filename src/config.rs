// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{
        DocumentStore, EntityRepository, MemoryDocumentStore, OfficeRepository, PgDocumentStore,
        SettingsRepository, UserRepository,
    },
    middleware::rate_limit::RateLimiter,
    models::entity::OfficeEntity,
    services::{
        auth::AuthService,
        counter_service::OfficeCounterService,
        document_service::DocumentService,
        notification_service::NotificationService,
        office_service::OfficeService,
        sms::{LogSmsSender, SmsSender},
    },
    storage::{BlobStore, LocalBlobStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("STORE_BACKEND desconhecido: {other}"),
        }
    }
}

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub blob_root: String,
    pub blob_public_url: String,
    pub session_timeout_minutes: i64,
    pub otp_ttl_seconds: i64,
    pub otp_hash_cost: u32,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,
}

// Variável ausente -> default; presente mas inválida -> erro
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} inválido ({raw}): {e}")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store_backend = env_or("STORE_BACKEND", StoreBackend::Postgres)?;
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL deve ser definida quando STORE_BACKEND=postgres");
        }

        Ok(Self {
            store_backend,
            database_url,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            blob_root: env_or("BLOB_ROOT", "./uploads".to_string())?,
            blob_public_url: env_or("BLOB_PUBLIC_URL", "http://localhost:3000/files".to_string())?,
            session_timeout_minutes: env_or("SESSION_TIMEOUT_MINUTES", 60)?,
            otp_ttl_seconds: env_or("OTP_TTL_SECONDS", 300)?,
            otp_hash_cost: env_or("OTP_HASH_COST", bcrypt::DEFAULT_COST)?,
            rate_limit_max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", 100)?,
            rate_limit_window_seconds: env_or("RATE_LIMIT_WINDOW_SECONDS", 60)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub counters: OfficeCounterService,
    pub user_repo: UserRepository,
    pub auth_service: AuthService,
    pub office_service: OfficeService,
    pub document_service: DocumentService,
    pub notification_service: NotificationService,
    pub rate_limiter: RateLimiter,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let settings = Settings::from_env()?;

        // 1. Document Store
        let store: Arc<dyn DocumentStore> = match settings.store_backend {
            StoreBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.database_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgDocumentStore::new(db_pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Usando o store em memória: os dados somem ao reiniciar");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        // 2. Blob Store
        tokio::fs::create_dir_all(&settings.blob_root)
            .await
            .with_context(|| format!("Falha ao criar BLOB_ROOT ({})", settings.blob_root))?;
        let blobs: Arc<dyn BlobStore> =
            Arc::new(LocalBlobStore::new(&settings.blob_root, &settings.blob_public_url));

        Ok(Self::with_components(settings, store, blobs, Arc::new(LogSmsSender)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_components(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        let counters = OfficeCounterService::new(store.clone());
        let user_repo = UserRepository::new(store.clone());
        let settings_repo = SettingsRepository::new(store.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            sms,
            settings.jwt_secret.clone(),
            chrono::Duration::minutes(settings.session_timeout_minutes),
            chrono::Duration::seconds(settings.otp_ttl_seconds),
            settings.otp_hash_cost,
        );
        let office_service = OfficeService::new(
            OfficeRepository::new(store.clone()),
            user_repo.clone(),
            counters.clone(),
        );
        let document_service = DocumentService::new(
            EntityRepository::new(store.clone(), blobs.clone(), counters.clone()),
            blobs.clone(),
            settings_repo.clone(),
        );
        let notification_service = NotificationService::new(
            EntityRepository::new(store.clone(), blobs.clone(), counters.clone()),
            settings_repo,
        );
        let rate_limiter = RateLimiter::new(
            settings.rate_limit_max_requests,
            Duration::from_secs(settings.rate_limit_window_seconds),
        );

        Self {
            settings,
            store,
            blobs,
            counters,
            user_repo,
            auth_service,
            office_service,
            document_service,
            notification_service,
            rate_limiter,
            i18n_store: Arc::new(I18nStore::new()),
        }
    }

    /// Repositório de qualquer coleção contada, já ligado ao store, blobs e contadores.
    pub fn repository<E: OfficeEntity>(&self) -> EntityRepository<E> {
        EntityRepository::new(self.store.clone(), self.blobs.clone(), self.counters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_backend() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("Postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }
}
