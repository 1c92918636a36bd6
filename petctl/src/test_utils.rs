//! Shared fixtures for unit and HTTP tests.

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use crate::{
    AppState, build_router,
    api::models::auth::TokenResponse,
    auth::session::TokenService,
    config::{Config, DatabaseConfig},
    db::memory::{MemoryPets, MemoryUsers},
};

pub const TEST_SECRET: &str = "test-secret-key-for-petctl";

/// In-memory config with a fixed secret and a cheap Argon2 work factor.
pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some(TEST_SECRET.to_string()),
        database: DatabaseConfig::Memory,
        ..Default::default()
    };
    config.auth.password.argon2_memory_kib = 128;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config
}

pub fn create_test_state() -> AppState {
    let config = create_test_config();
    let tokens = TokenService::from_config(&config).expect("test token service");

    AppState::builder()
        .config(config)
        .users(Arc::new(MemoryUsers::new()))
        .pets(Arc::new(MemoryPets::new()))
        .tokens(Arc::new(tokens))
        .build()
}

/// Router over fresh in-memory stores. The state is returned so tests can inspect the stores
/// and verify tokens directly.
pub fn create_test_server() -> (TestServer, AppState) {
    let state = create_test_state();
    let router = build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}

/// Register through the HTTP surface and return the issued token.
pub async fn register_user(server: &TestServer, name: &str, email: &str, password: &str) -> String {
    let response = server
        .post("/api/users")
        .json(&json!({ "name": name, "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<TokenResponse>().token
}
