// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resource services providing typed access to the provider's tables.
//!
//! Each service wraps a borrowed [`SupabaseClient`](crate::providers::SupabaseClient)
//! and offers the CRUD operations for one table. Services never cache; every
//! call is a provider round trip.

pub mod items;
pub mod ownership;
pub mod users;

use thiserror::Error;

use crate::providers::ProviderError;

pub use items::ItemService;
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use users::UserService;

/// Errors raised by the resource services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Permission denied: user {user_id} cannot access {resource}")]
    PermissionDenied {
        user_id: String,
        resource: &'static str,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
