// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated user representation.

use serde::Deserialize;

use super::access::AccessLevel;
use crate::models::User;

/// Claims carried by a Supabase access token.
///
/// See: https://supabase.com/docs/guides/auth/jwts
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SupabaseClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,

    /// Issuer (`{project}/auth/v1`)
    #[serde(default)]
    pub iss: Option<String>,

    /// Audience; present but never validated
    #[serde(default)]
    pub aud: Option<serde_json::Value>,

    #[serde(default)]
    pub email: Option<String>,

    /// Postgres role the token maps to
    #[serde(default)]
    pub role: Option<String>,

    /// Provider session ID
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Authenticated caller.
///
/// Built by the `Auth` extractor once the token has been verified and the
/// provider has confirmed the session. This is the primary type handlers use
/// to represent the user making a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user record fetched from the provider
    pub user: User,

    /// Raw bearer token, forwarded on the caller's behalf
    pub access_token: String,

    /// Session ID (if the token carries one)
    pub session_id: Option<String>,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn new(user: User, access_token: impl Into<String>, claims: &SupabaseClaims) -> Self {
        Self {
            user,
            access_token: access_token.into(),
            session_id: claims.session_id.clone(),
            expires_at: claims.exp,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn is_superuser(&self) -> bool {
        self.user.is_superuser()
    }

    /// Highest access level this user holds.
    pub fn access_level(&self) -> AccessLevel {
        if self.is_superuser() {
            AccessLevel::Superuser
        } else {
            AccessLevel::Active
        }
    }

    pub fn has_access(&self, required: AccessLevel) -> bool {
        self.access_level().has_privilege(required)
    }

    /// Whether the caller may act on a resource belonging to `user_id`.
    pub fn can_access_user(&self, user_id: &str) -> bool {
        self.user_id() == user_id || self.is_superuser()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserMetadata;
    use serde_json::json;

    fn sample_claims() -> SupabaseClaims {
        serde_json::from_value(json!({
            "sub": "user_123",
            "exp": 1700003600,
            "iat": 1700000000,
            "aud": "authenticated",
            "role": "authenticated",
            "session_id": "sess_abc"
        }))
        .unwrap()
    }

    fn sample_user(is_superuser: bool) -> User {
        User {
            id: "user_123".to_string(),
            email: Some("a@b.com".to_string()),
            phone: None,
            role: Some("authenticated".to_string()),
            aud: None,
            user_metadata: UserMetadata {
                is_superuser,
                ..Default::default()
            },
            app_metadata: serde_json::Value::Null,
            email_confirmed_at: None,
            last_sign_in_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn claims_tolerate_array_audience() {
        let claims: SupabaseClaims = serde_json::from_value(json!({
            "sub": "u", "exp": 1, "aud": ["a", "b"]
        }))
        .unwrap();
        assert!(claims.aud.unwrap().is_array());
    }

    #[test]
    fn new_copies_session_details() {
        let user = AuthenticatedUser::new(sample_user(false), "tok", &sample_claims());
        assert_eq!(user.user_id(), "user_123");
        assert_eq!(user.session_id.as_deref(), Some("sess_abc"));
        assert_eq!(user.expires_at, 1700003600);
        assert_eq!(user.access_token, "tok");
    }

    #[test]
    fn regular_user_is_active_only() {
        let user = AuthenticatedUser::new(sample_user(false), "tok", &sample_claims());
        assert_eq!(user.access_level(), AccessLevel::Active);
        assert!(user.has_access(AccessLevel::Authenticated));
        assert!(!user.has_access(AccessLevel::Superuser));
    }

    #[test]
    fn superuser_reaches_every_level() {
        let user = AuthenticatedUser::new(sample_user(true), "tok", &sample_claims());
        assert!(user.has_access(AccessLevel::Superuser));
    }

    #[test]
    fn user_access_is_self_or_superuser() {
        let regular = AuthenticatedUser::new(sample_user(false), "tok", &sample_claims());
        assert!(regular.can_access_user("user_123"));
        assert!(!regular.can_access_user("someone_else"));

        let admin = AuthenticatedUser::new(sample_user(true), "tok", &sample_claims());
        assert!(admin.can_access_user("someone_else"));
    }
}
