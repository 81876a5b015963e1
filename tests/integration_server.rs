//! End-to-end tests against a real listener.
//!
//! The server is started in-process on an ephemeral port with the artificial
//! latency disabled, then driven over HTTP with `reqwest`.

use anyhow::{Context, Result};
use diary_auth::{
    api::{self, ApiConfig, AppContext},
    APP_USER_AGENT,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

struct TestServer {
    base: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    async fn start(config: ApiConfig) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let ctx = AppContext::in_memory(config);
        let handle = tokio::spawn(api::serve(listener, ctx, async move {
            let _ = rx.await;
        }));

        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            base: format!("http://{addr}"),
            client,
            shutdown: Some(tx),
            handle,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?;
        let status = response.status();
        let body = response.json::<Value>().await?;
        Ok((status, body))
    }

    async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await??;
        Ok(())
    }
}

fn fast() -> ApiConfig {
    ApiConfig::new().with_latency(Duration::ZERO)
}

#[tokio::test]
async fn register_and_login_over_http() -> Result<()> {
    let server = TestServer::start(fast()).await?;

    let (status, body) = server
        .post(
            "/auth",
            &json!({"login": "anna", "email": "anna@example.com", "password": "secret"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = server
        .post("/auth/login", &json!({"login": "anna", "password": "secret"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = server
        .post("/auth", &json!({"login": "bob", "email": 5, "password": "p"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = server
        .post("/auth", &json!({"login": "anna", "password": "other"}))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["message"], json!("Пользователь уже существует"));

    server.stop().await
}

#[tokio::test]
async fn seed_user_and_bad_credentials() -> Result<()> {
    let server = TestServer::start(fast()).await?;

    let (status, _) = server
        .post("/auth/login", &json!({"login": "nikita", "password": "123"}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, wrong_password) = server
        .post("/auth/login", &json!({"login": "nikita", "password": "1234"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["ok"], json!(false));
    assert!(wrong_password.get("stack").is_none());

    let (status, unknown) = server
        .post("/auth/login", &json!({"login": "ghost", "password": "123"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["message"], wrong_password["message"]);

    let (status, body) = server
        .post("/auth/login", &json!({"login": "nikita"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Логин и пароль обязательны"));

    server.stop().await
}

#[tokio::test]
async fn unknown_route_and_docs() -> Result<()> {
    let server = TestServer::start(fast()).await?;

    let response = server
        .client
        .get(format!("{}/nope", server.base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
    let body = response.json::<Value>().await?;
    assert_eq!(body, json!({"ok": false, "message": "Маршрут не найден"}));

    let response = server
        .client
        .post(format!("{}/health", server.base))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>().await?;
    assert_eq!(body["message"], json!("Маршрут не найден"));

    let doc = server
        .client
        .get(format!("{}{}", server.base, api::DOCS_JSON_PATH))
        .send()
        .await?;
    assert_eq!(doc.status(), StatusCode::OK);
    let doc = doc.json::<Value>().await?;
    assert!(doc["paths"]["/auth"]["post"].is_object());
    assert!(doc["paths"]["/auth/login"]["post"].is_object());
    assert_eq!(doc["info"]["title"], json!("Emotion Diary API"));
    assert_eq!(doc["tags"][0]["name"], json!("Auth"));

    server.stop().await
}

#[tokio::test]
async fn default_latency_is_applied() -> Result<()> {
    let server = TestServer::start(ApiConfig::new()).await?;

    let started = Instant::now();
    let (status, _) = server
        .post("/auth/login", &json!({"login": "nikita", "password": "123"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(300));

    server.stop().await
}
