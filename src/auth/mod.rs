// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication backed by Supabase Auth.
//!
//! ## Auth Flow
//!
//! 1. Client signs in through `/auth/login` and receives a Supabase session
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. Gateway:
//!    - Verifies the token signature and expiry with the project JWT secret
//!    - Asks Supabase for the user behind the token (revoked sessions fail here)
//!    - Derives the access level from `user_metadata.is_superuser`
//!
//! ## Security
//!
//! - Tokens that fail local verification never reach the provider
//! - The superuser flag is read from the provider's user record, not the token
//! - Every 401 carries `WWW-Authenticate: Bearer`

pub mod access;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod session;
pub mod verifier;

pub use access::AccessLevel;
pub use claims::{AuthenticatedUser, SupabaseClaims};
pub use error::AuthError;
pub use extractor::{ActiveUser, Auth, OptionalAuth, SuperuserOnly};
pub use verifier::TokenVerifier;
