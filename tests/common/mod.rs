#![allow(dead_code)]

use std::sync::Arc;

use afriqai_admin::api::ApiClient;
use afriqai_admin::{AdminApp, HttpAuthGateway, MemoryTokenStorage, NavigationHistory, Settings};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_PREFIX: &str = "/api/v1";

/// Access token shaped like the backend's: Spring authorities, `type` claim.
pub fn access_token(username: &str, roles: &[&str], ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let roles: Vec<Value> = roles
        .iter()
        .map(|r| json!({ "authority": format!("ROLE_{}", r.to_uppercase()) }))
        .collect();
    encode(
        &Header::default(),
        &json!({
            "sub": username,
            "roles": roles,
            "type": "ACCESS",
            "iat": now,
            "exp": now + ttl_secs,
        }),
        &EncodingKey::from_secret(b"integration-secret"),
    )
    .expect("Failed to sign token")
}

pub fn base_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_PREFIX)
}

pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub fn gateway(server: &MockServer) -> HttpAuthGateway {
    HttpAuthGateway::new(ApiClient::new(&base_url(server)).expect("Failed to build client"))
}

pub struct TestApp {
    pub app: AdminApp,
    pub storage: Arc<MemoryTokenStorage>,
    pub history: Arc<NavigationHistory>,
}

pub fn spawn_app(server: &MockServer, storage: MemoryTokenStorage) -> TestApp {
    let settings = Settings::for_base_url(&base_url(server)).expect("Failed to load test config");
    let storage = Arc::new(storage);
    let history = Arc::new(NavigationHistory::new());
    let app = AdminApp::with_parts(
        settings,
        Arc::new(gateway(server)),
        storage.clone(),
        history.clone(),
    )
    .expect("Failed to build app");
    TestApp {
        app,
        storage,
        history,
    }
}
