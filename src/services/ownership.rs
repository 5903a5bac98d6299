// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for owner-scoped resources.
//!
//! The owner of a resource may always touch it. Superusers may touch any
//! resource.

use crate::auth::AuthenticatedUser;
use crate::models::{Item, UserProfile};

use super::{ServiceError, ServiceResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Resource name used in error messages.
    const RESOURCE: &'static str;

    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;
}

impl OwnedResource for Item {
    const RESOURCE: &'static str = "item";

    fn owner_user_id(&self) -> &str {
        &self.owner_id
    }
}

impl OwnedResource for UserProfile {
    const RESOURCE: &'static str = "user";

    fn owner_user_id(&self) -> &str {
        &self.id
    }
}

/// Trait for enforcing ownership on a fetched resource.
pub trait OwnershipEnforcer {
    /// Verify that the user owns this resource or is a superuser.
    ///
    /// # Errors
    /// Returns `ServiceError::PermissionDenied` otherwise.
    fn verify_ownership(&self, user: &AuthenticatedUser) -> ServiceResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, user: &AuthenticatedUser) -> ServiceResult<()> {
        if self.owner_user_id() == user.user_id() || user.is_superuser() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied {
                user_id: user.user_id().to_string(),
                resource: T::RESOURCE,
            })
        }
    }
}

/// Turn a lookup result into an owned resource, or the matching error.
pub trait OwnershipCheck<T> {
    /// `id` is only used to describe a missing resource.
    fn verify_owner(self, user: &AuthenticatedUser, id: &str) -> ServiceResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, user: &AuthenticatedUser, id: &str) -> ServiceResult<T> {
        match self {
            Some(resource) => {
                resource.verify_ownership(user)?;
                Ok(resource)
            }
            None => Err(ServiceError::NotFound {
                resource: T::RESOURCE,
                id: id.to_string(),
            }),
        }
    }
}

impl<T: OwnedResource> OwnershipCheck<T> for ServiceResult<Option<T>> {
    fn verify_owner(self, user: &AuthenticatedUser, id: &str) -> ServiceResult<T> {
        self?.verify_owner(user, id)
    }
}
