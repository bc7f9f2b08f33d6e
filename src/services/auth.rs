// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{
    common::{
        error::AppError,
        validation::{normalize_phone, validate_phone},
    },
    db::UserRepository,
    models::auth::{AuthResponse, Claims, User},
    services::sms::SmsSender,
};

pub const MAX_OTP_ATTEMPTS: i64 = 5;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    sms: Arc<dyn SmsSender>,
    jwt_secret: String,
    session_timeout: Duration,
    otp_ttl: Duration,
    otp_hash_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        sms: Arc<dyn SmsSender>,
        jwt_secret: String,
        session_timeout: Duration,
        otp_ttl: Duration,
        otp_hash_cost: u32,
    ) -> Self {
        Self { user_repo, sms, jwt_secret, session_timeout, otp_ttl, otp_hash_cost }
    }

    /// Gera um código de 6 dígitos, guarda o hash e envia por SMS. Devolve quando ele expira.
    pub async fn request_code(&self, phone: &str) -> Result<DateTime<Utc>, AppError> {
        // 1. Normaliza e valida o telefone
        let phone = checked_phone(phone)?;

        // 2. Código + hash (bcrypt é caro: roda fora do runtime)
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let code_clone = code.clone();
        let cost = self.otp_hash_cost;
        let code_hash = tokio::task::spawn_blocking(move || hash(&code_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 3. Substitui qualquer desafio anterior
        let expires_at = Utc::now() + self.otp_ttl;
        self.user_repo.replace_challenge(&phone, &code_hash, expires_at).await?;

        // 4. Envia
        self.sms.send_code(&phone, &code).await?;
        tracing::info!(phone = %phone, "código OTP emitido");

        Ok(expires_at)
    }

    pub async fn verify_code(&self, phone: &str, code: &str) -> Result<AuthResponse, AppError> {
        let phone = checked_phone(phone)?;

        let challenge = self
            .user_repo
            .find_challenge(&phone)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        if challenge.expires_at <= Utc::now() {
            self.user_repo.delete_challenge(challenge.id).await?;
            return Err(AppError::OtpExpired);
        }

        // Conta a tentativa antes de verificar: chutes concorrentes também entram na conta
        let attempts = self
            .user_repo
            .record_attempt(challenge.id)
            .await?
            .ok_or(AppError::InvalidOtp)?;
        if attempts > MAX_OTP_ATTEMPTS {
            self.user_repo.delete_challenge(challenge.id).await?;
            return Err(AppError::TooManyAttempts);
        }

        let code_clone = code.to_owned();
        let hash_clone = challenge.code_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&code_clone, &hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação: {}", e))??;

        if !is_valid {
            return Err(AppError::InvalidOtp);
        }

        // Código certo: o desafio acaba aqui
        self.user_repo.delete_challenge(challenge.id).await?;

        let user = match self.user_repo.find_by_phone(&phone).await? {
            Some(user) => user,
            None => {
                let user = self.user_repo.create(&phone).await?;
                tracing::info!(user_id = %user.id, "novo usuário criado no primeiro login");
                user
            }
        };
        if !user.is_active {
            return Err(AppError::InvalidToken);
        }

        let now = Utc::now();
        self.user_repo.touch_last_login(user.id, now).await?;
        let (token, expires_at) = self.create_token(user.id)?;

        let mut user = user;
        user.last_login = Some(now);
        Ok(AuthResponse { token, expires_at, user })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    // O token vive o mesmo tempo que o timeout de sessão
    fn create_token(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_timeout;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;
        Ok((token, expires_at))
    }
}

fn checked_phone(phone: &str) -> Result<String, AppError> {
    let phone = normalize_phone(phone);
    if let Err(e) = validate_phone(&phone) {
        let mut errors = ValidationErrors::new();
        errors.add("phone", e);
        return Err(errors.into());
    }
    Ok(phone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{DocumentStore, MemoryDocumentStore},
        models::auth::{UserRole, OTP_COLLECTION},
        test_utils::{init_test_tracing, CapturingSmsSender},
    };

    struct Fixture {
        auth: AuthService,
        sms: Arc<CapturingSmsSender>,
        store: Arc<MemoryDocumentStore>,
    }

    fn fixture(otp_ttl: Duration) -> Fixture {
        init_test_tracing();
        let store = Arc::new(MemoryDocumentStore::new());
        let sms = Arc::new(CapturingSmsSender::new());
        let auth = AuthService::new(
            UserRepository::new(store.clone()),
            sms.clone(),
            "segredo-de-teste".into(),
            Duration::minutes(60),
            otp_ttl,
            4, // custo mínimo do bcrypt, para o teste ser rápido
        );
        Fixture { auth, sms, store }
    }

    fn wrong_code(right: &str) -> String {
        if right == "000000" { "111111".into() } else { "000000".into() }
    }

    #[tokio::test]
    async fn otp_login_creates_owner_and_issues_a_session_token() {
        let fx = fixture(Duration::seconds(300));

        fx.auth.request_code("966501234567").await.unwrap();
        let code = fx.sms.last_code("+966501234567").unwrap();
        assert_eq!(code.len(), 6);

        let response = fx.auth.verify_code("+966501234567", &code).await.unwrap();
        assert_eq!(response.user.role, UserRole::Owner);
        assert!(response.user.office_access.is_empty());
        assert!(response.user.last_login.is_some());

        let lifetime = response.expires_at - Utc::now();
        assert!(lifetime <= Duration::minutes(60) && lifetime > Duration::minutes(59));

        let user = fx.auth.validate_token(&response.token).await.unwrap();
        assert_eq!(user.id, response.user.id);

        // O código é de uso único
        assert!(matches!(
            fx.auth.verify_code("+966501234567", &code).await,
            Err(AppError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn second_login_reuses_the_same_user() {
        let fx = fixture(Duration::seconds(300));

        fx.auth.request_code("+966501234567").await.unwrap();
        let code = fx.sms.last_code("+966501234567").unwrap();
        let first = fx.auth.verify_code("+966501234567", &code).await.unwrap();

        fx.auth.request_code("+966501234567").await.unwrap();
        let code = fx.sms.last_code("+966501234567").unwrap();
        let second = fx.auth.verify_code("+966501234567", &code).await.unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_eq!(fx.sms.sent_count(), 2);
    }

    #[tokio::test]
    async fn attempts_are_capped() {
        let fx = fixture(Duration::seconds(300));
        fx.auth.request_code("+966501234567").await.unwrap();
        let code = fx.sms.last_code("+966501234567").unwrap();
        let wrong = wrong_code(&code);

        for _ in 0..MAX_OTP_ATTEMPTS {
            assert!(matches!(
                fx.auth.verify_code("+966501234567", &wrong).await,
                Err(AppError::InvalidOtp)
            ));
        }

        // Nem o código certo passa depois do limite
        assert!(matches!(
            fx.auth.verify_code("+966501234567", &code).await,
            Err(AppError::TooManyAttempts)
        ));
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_discarded() {
        let fx = fixture(Duration::seconds(-1));
        fx.auth.request_code("+966501234567").await.unwrap();
        let code = fx.sms.last_code("+966501234567").unwrap();

        assert!(matches!(
            fx.auth.verify_code("+966501234567", &code).await,
            Err(AppError::OtpExpired)
        ));
        let left = fx
            .store
            .query(OTP_COLLECTION, "phone", &serde_json::json!("+966501234567"))
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn invalid_phone_never_sends_sms() {
        let fx = fixture(Duration::seconds(300));
        let result = fx.auth.request_code("12ab").await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(fx.sms.sent_count(), 0);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let fx = fixture(Duration::seconds(300));
        assert!(matches!(
            fx.auth.validate_token("nao.e.um.jwt").await,
            Err(AppError::InvalidToken)
        ));
    }
}
