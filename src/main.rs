//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;
#[cfg(test)]
mod test_utils;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::handlers::entities::entity_routes;
use crate::middleware::{
    auth::auth_guard,
    csrf::csrf_guard,
    rate_limit::rate_limit_guard,
    tenancy::{blob_guard, tenant_guard},
};
use crate::models::{
    alert::Alert, contract::Contract, driver::Driver, payment::Payment, vehicle::Vehicle,
};

pub fn app(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/otp/request", post(handlers::auth::request_otp))
        .route("/otp/verify", post(handlers::auth::verify_otp));

    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/offices", get(handlers::auth::get_my_offices));

    let office_registration = Router::new()
        .route("/", post(handlers::offices::create_office));

    let office_routes = Router::new()
        .route("/"
               ,get(handlers::offices::get_office)
               .put(handlers::offices::update_office)
        )
        .route("/deactivate", post(handlers::offices::deactivate_office))
        .route("/counters/reconcile", post(handlers::offices::reconcile_counters))
        .route("/staff", post(handlers::offices::grant_staff_access));

    let document_routes = Router::new()
        .route("/"
               ,get(handlers::documents::list_documents)
               .post(handlers::documents::upload_document)
        )
        .route("/expiring", get(handlers::documents::list_expiring_documents))
        .route("/{id}"
               ,get(handlers::documents::get_document)
               .put(handlers::documents::update_document)
               .delete(handlers::documents::delete_document)
        )
        .route("/{id}/download-url", get(handlers::documents::download_url));

    let notification_routes = Router::new()
        .route("/"
               ,get(handlers::notifications::list_notifications)
               .post(handlers::notifications::create_notification)
        )
        .route("/settings"
               ,get(handlers::notifications::get_settings)
               .put(handlers::notifications::update_settings)
        )
        .route("/{id}", axum::routing::delete(handlers::notifications::delete_notification))
        .route("/{id}/read", post(handlers::notifications::mark_as_read));

    // Tudo que opera dentro de um escritório passa pelo tenant_guard (x-office-id)
    let office_scoped = Router::new()
        .nest("/office", office_routes)
        .nest("/drivers", entity_routes::<Driver>())
        .nest("/vehicles", entity_routes::<Vehicle>())
        .nest("/contracts", entity_routes::<Contract>())
        .nest("/payments", entity_routes::<Payment>())
        .nest("/alerts", entity_routes::<Alert>())
        .nest("/documents", document_routes)
        .nest("/notifications", notification_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ));

    // O último layer roda primeiro: auth -> csrf -> tenant
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/offices", office_registration)
        .merge(office_scoped)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            csrf_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Arquivos enviados: só para quem tem acesso ao escritório do caminho
    let file_routes = Router::new()
        .nest_service("/files", ServeDir::new(&app_state.settings.blob_root))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            blob_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(file_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    // Limpeza periódica dos buckets do rate limit
    let limiter = app_state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            let removed = limiter.sweep().await;
            tracing::debug!(removed, "buckets de rate limit expirados removidos");
        }
    });

    let addr = app_state.settings.bind_addr.clone();
    let router = app(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Settings, StoreBackend},
        db::MemoryDocumentStore,
        test_utils::{init_test_tracing, CapturingSmsSender, RecordingBlobStore},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        state: AppState,
        sms: Arc<CapturingSmsSender>,
    }

    fn test_settings(rate_limit_max_requests: u32) -> Settings {
        Settings {
            store_backend: StoreBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: "127.0.0.1:0".into(),
            blob_root: "./uploads".into(),
            blob_public_url: "http://blobs.test".into(),
            session_timeout_minutes: 60,
            otp_ttl_seconds: 300,
            otp_hash_cost: 4,
            rate_limit_max_requests,
            rate_limit_window_seconds: 60,
        }
    }

    fn test_app_with_limit(max_requests: u32) -> TestApp {
        test_app_with(test_settings(max_requests))
    }

    fn test_app_with(settings: Settings) -> TestApp {
        init_test_tracing();
        let sms = Arc::new(CapturingSmsSender::new());
        let state = AppState::with_components(
            settings,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(RecordingBlobStore::new()),
            sms.clone(),
        );
        TestApp { state, sms }
    }

    fn test_app() -> TestApp {
        test_app_with_limit(1_000)
    }

    impl TestApp {
        async fn send(&self, request: Request<Body>) -> Response {
            app(self.state.clone()).oneshot(request).await.unwrap()
        }

        async fn login(&self, phone: &str) -> String {
            self.state.auth_service.request_code(phone).await.unwrap();
            let code = self.sms.last_code(phone).unwrap();
            self.state.auth_service.verify_code(phone, &code).await.unwrap().token
        }

        async fn register_office(&self, token: &str) -> Uuid {
            let response = self
                .send(json_request("POST", "/api/offices", token, None, office_body()))
                .await;
            assert_eq!(response.status(), StatusCode::CREATED);
            let office = body_json(response).await;
            office["id"].as_str().unwrap().parse().unwrap()
        }
    }

    fn json_request(method: &str, uri: &str, token: &str, office_id: Option<Uuid>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(office_id) = office_id {
            builder = builder.header("x-office-id", office_id.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: &str, office_id: Option<Uuid>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        if let Some(office_id) = office_id {
            builder = builder.header("x-office-id", office_id.to_string());
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn office_body() -> Value {
        json!({
            "name": "Taxi Al-Noor",
            "phone": "+966501234567",
            "licenseNumber": "LIC-1",
            "businessType": "private"
        })
    }

    fn driver_body() -> Value {
        json!({
            "firstName": "Khalid",
            "lastName": "Al-Harbi",
            "phone": "+966502222222",
            "nationalId": "1029384756",
            "licenseNumber": "DL-1",
            "licenseExpiry": "2027-01-31"
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app();
        let response = app
            .send(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_require_a_valid_token() {
        let app = test_app();

        let missing = app
            .send(Request::builder().uri("/api/users/me").body(Body::empty()).unwrap())
            .await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let garbage = app.send(get_request("/api/users/me", "nao.e.jwt", None)).await;
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn office_routes_need_header_and_membership() {
        let app = test_app();
        let token = app.login("+966501111111").await;

        let no_header = app.send(get_request("/api/drivers", &token, None)).await;
        assert_eq!(no_header.status(), StatusCode::BAD_REQUEST);

        let stranger = app.send(get_request("/api/drivers", &token, Some(Uuid::new_v4()))).await;
        assert_eq!(stranger.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn driver_crud_keeps_the_office_counter() {
        let app = test_app();
        let token = app.login("+966501111111").await;
        let office_id = app.register_office(&token).await;

        let created = app
            .send(json_request("POST", "/api/drivers", &token, Some(office_id), driver_body()))
            .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let driver = body_json(created).await;
        assert_eq!(driver["officeId"], json!(office_id));

        let office = body_json(app.send(get_request("/api/office", &token, Some(office_id))).await).await;
        assert_eq!(office["driversCount"], 1);

        let uri = format!("/api/drivers/{}", driver["id"].as_str().unwrap());
        let deleted = app
            .send(
                Request::builder()
                    .method("DELETE")
                    .uri(&uri)
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header("x-office-id", office_id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let office = body_json(app.send(get_request("/api/office", &token, Some(office_id))).await).await;
        assert_eq!(office["driversCount"], 0);

        let gone = app.send(get_request(&uri, &token, Some(office_id))).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_bodies_are_rejected_with_400() {
        let app = test_app();
        let token = app.login("+966501111111").await;
        let office_id = app.register_office(&token).await;

        let malformed = app
            .send(json_request("POST", "/api/drivers", &token, Some(office_id), json!({ "firstName": 42 })))
            .await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let mut invalid = driver_body();
        invalid["phone"] = json!("123");
        let invalid = app
            .send(json_request("POST", "/api/drivers", &token, Some(office_id), invalid))
            .await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(invalid).await["details"]["phone"].is_array());
    }

    #[tokio::test]
    async fn staff_without_permission_gets_403() {
        let app = test_app();
        let owner_token = app.login("+966501111111").await;
        let office_id = app.register_office(&owner_token).await;

        let staff_token = app.login("+966503333333").await;
        let staff = app.state.user_repo.find_by_phone("+966503333333").await.unwrap().unwrap();

        let grant = app
            .send(json_request(
                "POST",
                "/api/office/staff",
                &owner_token,
                Some(office_id),
                json!({ "userId": staff.id, "permissions": ["manage_vehicles"] }),
            ))
            .await;
        assert_eq!(grant.status(), StatusCode::OK);

        // Pode ler, mas não pode criar motoristas
        let list = app.send(get_request("/api/drivers", &staff_token, Some(office_id))).await;
        assert_eq!(list.status(), StatusCode::OK);

        let create = app
            .send(json_request("POST", "/api/drivers", &staff_token, Some(office_id), driver_body()))
            .await;
        assert_eq!(create.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn cookie_sessions_need_the_csrf_header() {
        let app = test_app();
        let token = app.login("+966501111111").await;

        let cookie_request = |csrf_header: Option<&str>| {
            let mut builder = Request::builder()
                .method("POST")
                .uri("/api/offices")
                .header(header::COOKIE, format!("session_token={token}; csrf_token=abc123"))
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(value) = csrf_header {
                builder = builder.header("x-csrf-token", value);
            }
            builder.body(Body::from(office_body().to_string())).unwrap()
        };

        let forged = app.send(cookie_request(None)).await;
        assert_eq!(forged.status(), StatusCode::FORBIDDEN);

        let legit = app.send(cookie_request(Some("abc123"))).await;
        assert_eq!(legit.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn rate_limit_answers_429() {
        let app = test_app_with_limit(2);
        let health = || Request::builder().uri("/api/health").body(Body::empty()).unwrap();

        // O mesmo AppState (e o mesmo RateLimiter) atende as três chamadas
        assert_eq!(app.send(health()).await.status(), StatusCode::OK);
        assert_eq!(app.send(health()).await.status(), StatusCode::OK);
        assert_eq!(app.send(health()).await.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn otp_endpoints_issue_a_session() {
        let app = test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/otp/request")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "phone": "966504444444" }).to_string()))
            .unwrap();
        assert_eq!(app.send(request).await.status(), StatusCode::OK);

        let code = app.sms.last_code("+966504444444").unwrap();
        let verify = Request::builder()
            .method("POST")
            .uri("/api/auth/otp/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "phone": "+966504444444", "code": code }).to_string()))
            .unwrap();
        let response = app.send(verify).await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("session_token=")));
        assert!(cookies.iter().any(|c| c.starts_with("csrf_token=")));

        let session = body_json(response).await;
        let token = session["token"].as_str().unwrap();
        let me = body_json(app.send(get_request("/api/users/me", token, None)).await).await;
        assert_eq!(me["phone"], "+966504444444");
    }

    #[tokio::test]
    async fn uploaded_files_are_only_served_to_members_of_the_office() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = test_settings(1_000);
        settings.blob_root = dir.path().to_string_lossy().into_owned();
        let app = test_app_with(settings);

        let owner_token = app.login("+966501111111").await;
        let office_id = app.register_office(&owner_token).await;
        let stranger_token = app.login("+966505555555").await;
        app.register_office(&stranger_token).await;

        let relative = format!("offices/{office_id}/documents/1_license.pdf");
        std::fs::create_dir_all(dir.path().join(format!("offices/{office_id}/documents"))).unwrap();
        std::fs::write(dir.path().join(&relative), b"SECRET").unwrap();
        let uri = format!("/files/{relative}");

        let anonymous = app.send(Request::builder().uri(&uri).body(Body::empty()).unwrap()).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let stranger = app.send(get_request(&uri, &stranger_token, None)).await;
        assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

        let outside = app.send(get_request("/files/outros/1_license.pdf", &owner_token, None)).await;
        assert_eq!(outside.status(), StatusCode::FORBIDDEN);

        let owner = app.send(get_request(&uri, &owner_token, None)).await;
        assert_eq!(owner.status(), StatusCode::OK);
        let bytes = to_bytes(owner.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"SECRET");
    }

    #[tokio::test]
    async fn deactivated_office_is_read_only() {
        let app = test_app();
        let token = app.login("+966501111111").await;
        let office_id = app.register_office(&token).await;

        let deactivate = app
            .send(json_request("POST", "/api/office/deactivate", &token, Some(office_id), json!({})))
            .await;
        assert_eq!(deactivate.status(), StatusCode::OK);

        let create = app
            .send(json_request("POST", "/api/drivers", &token, Some(office_id), driver_body()))
            .await;
        assert_eq!(create.status(), StatusCode::FORBIDDEN);

        let list = app.send(get_request("/api/drivers", &token, Some(office_id))).await;
        assert_eq!(list.status(), StatusCode::OK);

        let office = body_json(app.send(get_request("/api/office", &token, Some(office_id))).await).await;
        assert_eq!(office["isActive"], false);
        assert_eq!(office["driversCount"], 0);
    }
}
