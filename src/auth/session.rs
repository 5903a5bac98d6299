// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session resolution: maps a verified token to the provider's user record.
//!
//! A token with a valid signature is not enough on its own. The provider is
//! asked for the user behind the token on every request, so sessions revoked
//! upstream (sign-out, user deletion, ban) are rejected even while the token
//! has not expired.

use tracing::debug;

use super::{claims::SupabaseClaims, AuthError};
use crate::models::User;
use crate::providers::SupabaseClient;

/// Fetch the canonical user for `token`.
///
/// Any provider failure, and a user whose id differs from the token subject,
/// is reported as [`AuthError::SessionNotFound`].
pub async fn resolve(
    client: &SupabaseClient,
    token: &str,
    claims: &SupabaseClaims,
) -> Result<User, AuthError> {
    let user = client.get_user(token).await.map_err(|e| {
        debug!(sub = %claims.sub, error = %e, "Provider rejected session");
        AuthError::SessionNotFound
    })?;

    if user.id != claims.sub {
        debug!(sub = %claims.sub, user_id = %user.id, "Token subject does not match session user");
        return Err(AuthError::SessionNotFound);
    }

    Ok(user)
}
