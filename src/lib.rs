// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase Gateway - authentication and CRUD pass-through service
//!
//! This crate provides a thin HTTP backend in front of a hosted Supabase
//! project. Sign-up, sign-in and token refresh are forwarded to Supabase Auth;
//! profile and item operations are forwarded to its REST interface. The
//! gateway keeps no state of its own.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token verification, session resolution and access guards
//! - `providers` - Supabase HTTP client (auth, tables, storage)
//! - `services` - Typed user and item services on top of the provider
//! - `config` - Settings loaded from the environment

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod test_support;
