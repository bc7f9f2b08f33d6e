// src/middleware/rate_limit.rs

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

/// Janela fixa por cliente. Estado só deste processo: com várias instâncias
/// cada uma conta separado.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<String, Bucket>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self { buckets: Arc::new(RwLock::new(HashMap::new())), max_requests, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Conta a requisição e diz se ela ainda cabe na janela atual.
    pub async fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .entry(key.to_string())
            .or_insert(Bucket { count: 0, window_start: now });

        // Janela expirada: recomeça
        if now.duration_since(bucket.window_start) >= self.window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        bucket.count += 1;
        bucket.count <= self.max_requests
    }

    /// Remove os buckets cuja janela já acabou.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.duration_since(bucket.window_start) < self.window);
        before - buckets.len()
    }
}

// Primeiro IP do x-forwarded-for, depois x-real-ip
fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded.or(real_ip).unwrap_or("unknown").to_string()
}

pub async fn rate_limit_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(request.headers());

    if !app_state.rate_limiter.check(&key).await {
        tracing::warn!(client = %key, path = %request.uri().path(), "limite de requisições excedido");
        let locale = Locale::from_headers(request.headers());
        return Err(AppError::RateLimitExceeded.to_api_error(&locale, &app_state.i18n_store));
    }

    Ok(next.run(request).await)
}
