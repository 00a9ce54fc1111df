//! Shared harness for integration tests
//!
//! Builds the full router over the in-memory store with HS256 auth and drives
//! it in-process through `tower::ServiceExt::oneshot`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use pacientes_server::{
    api::create_router,
    config::{Config, DatabaseBackend},
    db::InMemoryPatientStore,
    state::AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemoryPatientStore>,
    user_token: String,
}

impl TestApp {
    pub fn build(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryPatientStore::new());
        let state = AppState::with_store(config, store.clone())?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            store,
            user_token: token_with_roles(&["USER"]),
        })
    }

    /// Request as a caller holding the `USER` role.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let token = self.user_token.clone();
        self.request_with_token(method, path, body, Some(&token))
            .await
    }

    pub async fn request_with_token(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let authorization = token.map(|t| format!("Bearer {t}"));
        let mut extra = Vec::new();
        if let Some(value) = authorization.as_deref() {
            extra.push(("authorization", value));
        }
        self.request_with_extra_headers(method, path, body, &extra)
            .await
    }

    /// Raw request: no credentials beyond the given headers.
    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        self.send(request).await
    }

    /// Send a body verbatim (for malformed JSON).
    pub async fn request_raw(
        &self,
        method: Method,
        path: &str,
        raw_body: &str,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.user_token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw_body.to_string()))?;

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> anyhow::Result<(StatusCode, HeaderMap, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, headers, body))
    }

    /// Create a patient and return its id.
    pub async fn create_patient(&self, body: Value) -> anyhow::Result<i64> {
        let (status, _headers, created) = self.request(Method::POST, "/pacientes", Some(body)).await?;
        assert_status(status, StatusCode::CREATED, "create patient");
        created["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("created patient has no id: {created}"))
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.backend = DatabaseBackend::Memory;
    config.auth.enabled = true;
    config.auth.hs256_secret = Some(TEST_SECRET.to_string());
    config.import.enabled = false;
    config
}

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> TestFuture,
{
    with_test_app_with_config(|_| {}, f).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> TestFuture,
{
    let mut config = test_config();
    configure(&mut config);
    let app = TestApp::build(config)?;
    f(app).await
}

pub fn token_with_roles(roles: &[&str]) -> String {
    token_with_claims(json!({
        "sub": "test-user",
        "preferred_username": "enfermeira.teste",
        "exp": chrono::Utc::now().timestamp() + 3600,
        "realm_access": { "roles": roles },
    }))
}

pub fn token_with_claims(claims: Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode test token")
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

/// A complete, valid create/replace payload.
pub fn valid_patient_json(cpf: &str) -> Value {
    json!({
        "identityNumber": cpf,
        "fullName": "João da Silva",
        "birthDate": "1990-01-30",
        "motherName": "Maria da Silva",
        "postalCode": "74000000",
        "street": "Rua 10",
        "streetNumber": "100",
        "complement": "Apto 201",
        "neighborhood": "Setor Central",
        "city": "Goiânia",
        "state": "GO",
        "mobilePhone": "62999998888",
        "guardianPhone": "62988887777",
        "email": "joao.silva@email.com",
        "sex": "Masculino",
        "healthCardNumber": "700001234567890",
        "isSmoker": false,
        "isDrinker": false,
        "hasSuspiciousLesion": false,
        "participatesInSmartMonitor": true
    })
}
