//! Shared fixtures for client integration tests

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use staffdir_client::{ApiClient, CredentialStore, MemoryStore};
use wiremock::MockServer;

/// Store holding a logged-in session with `token`
pub fn logged_in(token: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let record = json!({
        "username": "ann@example.com",
        "role": "Admin",
        "token": token,
        "email": "ann@example.com"
    });
    store.set("authUser", &record.to_string()).unwrap();
    store.set("token", token).unwrap();
    store.set("role", "Admin").unwrap();
    store
}

pub fn client(server: &MockServer, store: Arc<MemoryStore>) -> ApiClient {
    ApiClient::builder()
        .base_url(server.uri())
        .store(store)
        .build()
        .unwrap()
}

pub fn stored_token(store: &MemoryStore) -> Option<String> {
    let raw = store.get("authUser").unwrap()?;
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    record["token"].as_str().map(str::to_owned)
}
