// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies used by the REST API, plus the shapes of the
//! records returned by Supabase. All types derive `Serialize`/`Deserialize`
//! and `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Identity**: [`User`], [`UserMetadata`], [`Session`] as issued by GoTrue
//! - **Auth requests**: sign-up, password login, refresh
//! - **Profiles**: rows of the `users` table
//! - **Items**: rows of the `items` table, owned by a user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Identity
// =============================================================================

/// User record as returned by the Supabase auth API.
///
/// The record is fetched fresh from the provider on every request; it is
/// never persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct User {
    /// Provider-assigned identifier (immutable).
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Provider role (`authenticated`, `anon`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Profile fields and the superuser flag.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub user_metadata: UserMetadata,
    /// Provider-managed metadata (sign-in providers etc.).
    #[serde(default)]
    #[schema(value_type = Object)]
    pub app_metadata: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_superuser(&self) -> bool {
        self.user_metadata.is_superuser
    }
}

/// Typed view of `user_metadata`.
///
/// `is_superuser` is decoded once here; every other key is kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserMetadata {
    #[serde(default, deserialize_with = "truthy")]
    pub is_superuser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accepts booleans, numbers and the strings `true`/`1`. Anything else is
/// treated as false.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        _ => false,
    })
}

/// Session issued by the provider on sign-in, sign-up or refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Expiry of the access token (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Result of a sign-up or sign-in.
///
/// Sign-up returns no session when the project requires email confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

// =============================================================================
// Auth Requests / Responses
// =============================================================================

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// OAuth2 password form (`application/x-www-form-urlencoded`).
///
/// `username` carries the account email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Request to exchange a refresh token for a new session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair handed back to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl TokenResponse {
    pub fn from_session(session: Session, user: Option<User>) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: bearer(),
            user,
        }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// Row of the `users` profile table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update of a profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none()
    }
}

// =============================================================================
// Items
// =============================================================================

/// Row of the `items` table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Item {
    pub id: i64,
    /// Owning user's id.
    pub owner_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request to create an item. The owner is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update of an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

// =============================================================================
// Pagination
// =============================================================================

pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// `skip`/`limit` query parameters.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Number of matching rows to skip.
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

/// Minimal structural email check: one `@`, non-empty local part, a dot in
/// the domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_decodes_provider_payload() {
        let user: User = serde_json::from_value(json!({
            "id": "8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e",
            "aud": "authenticated",
            "role": "authenticated",
            "email": "a@b.com",
            "app_metadata": { "provider": "email" },
            "user_metadata": { "full_name": "Ada", "is_superuser": true, "city": "Lyon" },
            "created_at": "2024-05-01T10:00:00.123456Z",
            "identities": []
        }))
        .unwrap();

        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert!(user.is_superuser());
        assert_eq!(user.user_metadata.full_name.as_deref(), Some("Ada"));
        assert_eq!(user.user_metadata.extra["city"], "Lyon");
        assert!(user.created_at.is_some());
    }

    #[test]
    fn superuser_flag_defaults_to_false() {
        let user: User = serde_json::from_value(json!({ "id": "u1" })).unwrap();
        assert!(!user.is_superuser());
    }

    #[test]
    fn superuser_flag_accepts_loose_encodings() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(1), true),
            (json!("TRUE"), true),
            (json!("1"), true),
            (json!(false), false),
            (json!(0), false),
            (json!("no"), false),
            (json!(null), false),
            (json!({}), false),
        ] {
            let meta: UserMetadata =
                serde_json::from_value(json!({ "is_superuser": raw })).unwrap();
            assert_eq!(meta.is_superuser, expected, "value {raw}");
        }
    }

    #[test]
    fn token_response_is_bearer() {
        let session = Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "something-else".into(),
            expires_in: Some(3600),
            expires_at: None,
            user: None,
        };
        let body = TokenResponse::from_session(session, None);
        assert_eq!(body.token_type, "bearer");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("user").is_none());
    }

    #[test]
    fn partial_updates_skip_absent_fields() {
        let update = ItemUpdate {
            title: Some("New".into()),
            description: None,
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "title": "New" }));
        assert!(ItemUpdate::default().is_empty());
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn list_params_defaults() {
        let params: ListParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn email_check() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("a.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b."));
    }
}
