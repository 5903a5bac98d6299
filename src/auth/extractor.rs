// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors implementing the access guard.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The three guards are layered: `SuperuserOnly` runs `ActiveUser`, which
//! runs `Auth`. A missing or invalid token therefore fails before any user
//! metadata is looked at.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use super::{session, AccessLevel, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Validates the bearer token locally, then asks the provider for the
/// session's user. The result is cached in the request extensions so
/// stacked extractors resolve the session only once.
///
/// # Example
///
/// ```rust,ignore
/// async fn read_me(Auth(user): Auth) -> Json<User> {
///     Json(user.user)
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(parts)?;

        let claims = state.verifier.verify(token).map_err(|e| {
            debug!(error_code = e.error_code(), "Bearer token rejected");
            e
        })?;

        let user = session::resolve(&state.supabase, token, &claims).await?;
        let user = AuthenticatedUser::new(user, token, &claims);

        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = header
        .trim_start()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }
    Ok(token)
}

/// Extractor for active users.
///
/// Every authenticated user is active today; this is where an activation
/// flag would be enforced.
pub struct ActiveUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_access(AccessLevel::Active) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(ActiveUser(user))
    }
}

/// Extractor that requires `user_metadata.is_superuser`.
pub struct SuperuserOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for SuperuserOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ActiveUser(user) = ActiveUser::from_request_parts(parts, state).await?;

        if !user.has_access(AccessLevel::Superuser) {
            debug!(user_id = %user.user_id(), "Superuser access denied");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(SuperuserOnly(user))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid authentication is present, instead of rejecting.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuth(None));
        }
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
