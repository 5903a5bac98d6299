// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared helpers for tests that talk to a mocked Supabase.

use std::net::TcpListener;
use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Settings;
use crate::providers::SupabaseClient;
use crate::state::AppState;

pub const JWT_SECRET: &str = "test-jwt-secret-for-the-gateway";
pub const ANON_KEY: &str = "anon-key";
pub const SERVICE_KEY: &str = "service-key";

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn provider_client(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(server.uri(), ANON_KEY, SERVICE_KEY, Duration::from_secs(5))
        .expect("client builds")
}

pub fn settings(supabase_url: &str) -> Settings {
    let url = supabase_url.to_string();
    Settings::from_lookup(|name| match name {
        "SUPABASE_URL" => Some(url.clone()),
        "SUPABASE_KEY" => Some(ANON_KEY.to_string()),
        "SUPABASE_SERVICE_KEY" => Some(SERVICE_KEY.to_string()),
        "SUPABASE_JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .expect("test settings are valid")
}

pub fn app_state(server: &MockServer) -> AppState {
    AppState::with_client(settings(&server.uri()), provider_client(server))
}

/// State pointing at an address nothing listens on.
pub fn offline_state() -> AppState {
    let settings = settings("http://127.0.0.1:9");
    let client = SupabaseClient::new(
        "http://127.0.0.1:9",
        ANON_KEY,
        SERVICE_KEY,
        Duration::from_millis(500),
    )
    .expect("client builds");
    AppState::with_client(settings, client)
}

/// HS256 token for `user_id`, valid for ten minutes.
pub fn token_for(user_id: &str) -> String {
    sign(&json!({
        "sub": user_id,
        "exp": chrono::Utc::now().timestamp() + 600,
        "aud": "authenticated",
        "role": "authenticated",
        "session_id": format!("sess-{user_id}")
    }))
}

pub fn expired_token_for(user_id: &str) -> String {
    sign(&json!({
        "sub": user_id,
        "exp": chrono::Utc::now().timestamp() - 600,
    }))
}

pub fn sign(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

pub fn user_json(user_id: &str, is_superuser: bool) -> Value {
    json!({
        "id": user_id,
        "aud": "authenticated",
        "role": "authenticated",
        "email": format!("{user_id}@example.com"),
        "app_metadata": { "provider": "email" },
        "user_metadata": { "is_superuser": is_superuser, "full_name": "Test User" }
    })
}

/// Make the provider recognize `token` as a live session for `user`.
pub async fn mount_session(server: &MockServer, token: &str, user: Value) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(server)
        .await;
}
