// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase client: GoTrue auth endpoints, PostgREST tables and storage.
//!
//! One client is built at startup and shared through `AppState`. It carries
//! both credential tiers (anon key, service-role key) as immutable
//! configuration; each call picks one through [`Credential`].

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::query::{Credential, Filter, Page};
use crate::config::Settings;
use crate::models::{AuthResponse, Session, User};

const AUTH_PATH: &str = "/auth/v1";
const REST_PATH: &str = "/rest/v1";
const STORAGE_PATH: &str = "/storage/v1";

/// Longest provider error body echoed into an error message.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Supabase request failed: {0}")]
    Transport(String),

    #[error("Supabase returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Supabase response was invalid: {0}")]
    InvalidResponse(String),

    #[error("refusing to {0} rows without a filter")]
    UnfilteredMutation(&'static str),
}

impl ProviderError {
    /// HTTP status reported by the provider, if it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for a client-facing error body.
    pub fn detail(&self) -> String {
        match self {
            ProviderError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    service_key: String,
    http: Client,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_key: service_key.into(),
            http,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        Self::new(
            settings.supabase_url.as_str(),
            settings.anon_key.clone(),
            settings.service_key.clone(),
            settings.provider_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------

    /// Register a new account. `data` becomes the user's `user_metadata`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        data: Value,
    ) -> Result<AuthResponse, ProviderError> {
        let request = self
            .auth_request(Method::POST, "/signup", Credential::Anon)
            .json(&json!({ "email": email, "password": password, "data": data }));
        let response: Value = send_json(request, "POST /signup").await?;

        // With email confirmation enabled the provider answers with a bare
        // user; otherwise with a session that embeds the user.
        if response.get("access_token").is_some() {
            let session: Session = decode(response, "signup session")?;
            Ok(AuthResponse {
                user: session.user.clone(),
                session: Some(session),
            })
        } else if response.get("id").is_some() {
            Ok(AuthResponse {
                user: Some(decode(response, "signup user")?),
                session: None,
            })
        } else {
            let user = response
                .get("user")
                .cloned()
                .map(|u| decode(u, "signup user"))
                .transpose()?;
            Ok(AuthResponse { user, session: None })
        }
    }

    /// Password grant. Returns the new session (with its user).
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let request = self
            .auth_request(Method::POST, "/token", Credential::Anon)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        send_json(request, "POST /token?grant_type=password").await
    }

    /// Refresh-token grant.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let request = self
            .auth_request(Method::POST, "/token", Credential::Anon)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        send_json(request, "POST /token?grant_type=refresh_token").await
    }

    /// Revoke the session bound to `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let request = self.auth_request(Method::POST, "/logout", Credential::User(access_token));
        send_empty(request, "POST /logout").await
    }

    /// Fetch the user bound to `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<User, ProviderError> {
        let request = self.auth_request(Method::GET, "/user", Credential::User(access_token));
        send_json(request, "GET /user").await
    }

    /// Reachability of the auth service.
    pub async fn health(&self) -> Result<(), ProviderError> {
        let request = self.auth_request(Method::GET, "/health", Credential::Anon);
        send_empty(request, "GET /health").await
    }

    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------

    /// Rows of `table` matching every clause of `filter`, in provider order.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &Filter,
        credential: Credential<'_>,
        page: Option<Page>,
    ) -> Result<Vec<T>, ProviderError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter.to_query());
        if let Some(page) = page {
            query.extend(page.to_query());
        }

        let request = self.rest_request(Method::GET, table, credential).query(&query);
        send_json(request, &format!("GET {table}")).await
    }

    /// Insert one row and return what the provider stored.
    pub async fn insert<B, T>(
        &self,
        table: &str,
        body: &B,
        credential: Credential<'_>,
    ) -> Result<Vec<T>, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .rest_request(Method::POST, table, credential)
            .header("Prefer", "return=representation")
            .json(body);
        send_json(request, &format!("POST {table}")).await
    }

    /// Update the matching rows; returns the updated rows (empty when none matched).
    pub async fn update<B, T>(
        &self,
        table: &str,
        filter: &Filter,
        body: &B,
        credential: Credential<'_>,
    ) -> Result<Vec<T>, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if filter.is_empty() {
            return Err(ProviderError::UnfilteredMutation("update"));
        }

        let request = self
            .rest_request(Method::PATCH, table, credential)
            .header("Prefer", "return=representation")
            .query(&filter.to_query())
            .json(body);
        send_json(request, &format!("PATCH {table}")).await
    }

    /// Delete the matching rows; returns the deleted rows (empty when none matched).
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &Filter,
        credential: Credential<'_>,
    ) -> Result<Vec<T>, ProviderError> {
        if filter.is_empty() {
            return Err(ProviderError::UnfilteredMutation("delete"));
        }

        let request = self
            .rest_request(Method::DELETE, table, credential)
            .header("Prefer", "return=representation")
            .query(&filter.to_query());
        send_json(request, &format!("DELETE {table}")).await
    }

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------

    /// Upload an object to `bucket` at `path`.
    pub async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        credential: Credential<'_>,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}{STORAGE_PATH}/object/{bucket}/{}",
            self.base_url,
            path.trim_start_matches('/')
        );
        let request = self
            .authorize(self.http.post(url), credential)
            .header("Content-Type", content_type)
            .body(bytes);
        send_json(request, &format!("POST storage {bucket}")).await
    }

    /// Public URL of an object in a public bucket.
    pub fn public_file_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}{STORAGE_PATH}/object/public/{bucket}/{}",
            self.base_url,
            path.trim_start_matches('/')
        )
    }

    // -------------------------------------------------------------------------
    // Request plumbing
    // -------------------------------------------------------------------------

    fn auth_request(&self, method: Method, path: &str, credential: Credential<'_>) -> RequestBuilder {
        let url = format!("{}{AUTH_PATH}{path}", self.base_url);
        self.authorize(self.http.request(method, url), credential)
    }

    fn rest_request(&self, method: Method, table: &str, credential: Credential<'_>) -> RequestBuilder {
        let url = format!("{}{REST_PATH}/{table}", self.base_url);
        self.authorize(self.http.request(method, url), credential)
    }

    fn authorize(&self, request: RequestBuilder, credential: Credential<'_>) -> RequestBuilder {
        let (apikey, bearer) = match credential {
            Credential::Anon => (&self.anon_key, self.anon_key.as_str()),
            Credential::User(token) => (&self.anon_key, token),
            Credential::Elevated => (&self.service_key, self.service_key.as_str()),
        };
        request
            .header("apikey", apikey.as_str())
            .header("Authorization", format!("Bearer {bearer}"))
    }
}

async fn send_checked(request: RequestBuilder, label: &str) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(|e| {
        warn!(call = %label, error = %e, "Supabase request failed");
        ProviderError::Transport(format!("{label} failed: {e}"))
    })?;

    let status = response.status();
    if status.is_success() {
        debug!(call = %label, %status, "Supabase call succeeded");
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    if status.is_server_error() {
        warn!(call = %label, %status, %message, "Supabase call returned a server error");
    } else {
        debug!(call = %label, %status, %message, "Supabase call was rejected");
    }
    Err(ProviderError::Api { status, message })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder, label: &str) -> Result<T, ProviderError> {
    send_checked(request, label)
        .await?
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("{label} invalid JSON: {e}")))
}

async fn send_empty(request: RequestBuilder, label: &str) -> Result<(), ProviderError> {
    send_checked(request, label).await.map(|_| ())
}

/// Pull a human readable message out of a GoTrue / PostgREST error body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no error details".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::InvalidResponse(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::can_bind_localhost;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(server.uri(), "anon", "service", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn error_message_prefers_known_keys() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(r#"{"code":"23505","message":"duplicate key"}"#), "duplicate key");
        assert_eq!(error_message(r#"{"msg":"User already registered"}"#), "User already registered");
        assert_eq!(error_message("upstream down"), "upstream down");
        assert_eq!(error_message(""), "no error details");
    }

    #[test]
    fn public_file_url_is_built_from_base() {
        let client =
            SupabaseClient::new("https://p.supabase.co/", "a", "s", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.public_file_url("avatars", "/u1/me.png"),
            "https://p.supabase.co/storage/v1/object/public/avatars/u1/me.png"
        );
    }

    #[test]
    fn debug_output_hides_keys() {
        let client =
            SupabaseClient::new("https://p.supabase.co", "anon-secret", "service-secret", Duration::from_secs(1))
                .unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("anon-secret"));
        assert!(!rendered.contains("service-secret"));
    }

    #[tokio::test]
    async fn select_sends_filters_paging_and_anon_headers() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(query_param("select", "*"))
            .and(query_param("owner_id", "eq.u-1"))
            .and(query_param("offset", "5"))
            .and(query_param("limit", "2"))
            .and(header("apikey", "anon"))
            .and(header("Authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 6 }, { "id": 7 }])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client(&server)
            .select(
                "items",
                &Filter::eq("owner_id", "u-1"),
                Credential::User("user-token"),
                Some(Page::new(5, 2)),
            )
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "id": 6 }), json!({ "id": 7 })]);
    }

    #[tokio::test]
    async fn elevated_calls_use_the_service_key() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/users"))
            .and(query_param("id", "eq.u-9"))
            .and(header("apikey", "service"))
            .and(header("Authorization", "Bearer service"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client(&server)
            .delete("users", &Filter::eq("id", "u-9"), Credential::Elevated)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn unfiltered_mutations_never_reach_the_provider() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let result: Result<Vec<Value>, _> = client(&server)
            .delete("items", &Filter::new(), Credential::Elevated)
            .await;
        assert!(matches!(result, Err(ProviderError::UnfilteredMutation("delete"))));

        let result: Result<Vec<Value>, _> = client(&server)
            .update("items", &Filter::new(), &json!({ "title": "x" }), Credential::Elevated)
            .await;
        assert!(matches!(result, Err(ProviderError::UnfilteredMutation("update"))));
    }

    #[tokio::test]
    async fn sign_in_returns_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_json(json!({ "email": "a@b.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "token_type": "bearer",
                "expires_in": 3600,
                "user": { "id": "u-1", "email": "a@b.com" }
            })))
            .mount(&server)
            .await;

        let session = client(&server).sign_in_with_password("a@b.com", "pw").await.unwrap();
        assert_eq!(session.access_token, "at");
        assert_eq!(session.refresh_token, "rt");
        assert_eq!(session.user.unwrap().id, "u-1");
    }

    #[tokio::test]
    async fn rejected_sign_in_surfaces_provider_message() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = client(&server).sign_in_with_password("a@b.com", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.detail(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn sign_up_without_confirmation_returns_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_json(json!({
                "email": "new@b.com",
                "password": "pw",
                "data": { "full_name": "New" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "user": { "id": "u-2", "email": "new@b.com" }
            })))
            .mount(&server)
            .await;

        let response = client(&server)
            .sign_up("new@b.com", "pw", json!({ "full_name": "New" }))
            .await
            .unwrap();
        assert_eq!(response.user.unwrap().id, "u-2");
        assert_eq!(response.session.unwrap().access_token, "at");
    }

    #[tokio::test]
    async fn sign_up_with_confirmation_returns_bare_user() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-3",
                "email": "pending@b.com"
            })))
            .mount(&server)
            .await;

        let response = client(&server).sign_up("pending@b.com", "pw", json!({})).await.unwrap();
        assert_eq!(response.user.unwrap().id, "u-3");
        assert!(response.session.is_none());
    }

    #[tokio::test]
    async fn get_user_uses_caller_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("Authorization", "Bearer caller"))
            .and(header("apikey", "anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "user_metadata": { "is_superuser": true }
            })))
            .mount(&server)
            .await;

        let user = client(&server).get_user("caller").await.unwrap();
        assert!(user.is_superuser());
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let client =
            SupabaseClient::new("http://127.0.0.1:9", "a", "s", Duration::from_millis(500)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
