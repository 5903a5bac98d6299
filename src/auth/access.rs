// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access levels used to gate routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ascending access levels.
///
/// ## Hierarchy
///
/// - `Authenticated` - valid token and a live provider session
/// - `Active` - authenticated and active (every authenticated user today)
/// - `Superuser` - active with `user_metadata.is_superuser` set
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Authenticated,
    Active,
    Superuser,
}

impl AccessLevel {
    /// Check if this level grants at least the `required` level.
    pub fn has_privilege(&self, required: AccessLevel) -> bool {
        *self >= required
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::Authenticated
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessLevel::Authenticated => write!(f, "authenticated"),
            AccessLevel::Active => write!(f, "active"),
            AccessLevel::Superuser => write!(f, "superuser"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superuser_has_all_privileges() {
        assert!(AccessLevel::Superuser.has_privilege(AccessLevel::Superuser));
        assert!(AccessLevel::Superuser.has_privilege(AccessLevel::Active));
        assert!(AccessLevel::Superuser.has_privilege(AccessLevel::Authenticated));
    }

    #[test]
    fn active_is_not_superuser() {
        assert!(AccessLevel::Active.has_privilege(AccessLevel::Authenticated));
        assert!(AccessLevel::Active.has_privilege(AccessLevel::Active));
        assert!(!AccessLevel::Active.has_privilege(AccessLevel::Superuser));
    }

    #[test]
    fn authenticated_is_the_floor() {
        assert_eq!(AccessLevel::default(), AccessLevel::Authenticated);
        assert!(!AccessLevel::Authenticated.has_privilege(AccessLevel::Active));
    }
}
