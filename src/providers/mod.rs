// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote provider integration (Supabase).

pub mod query;
pub mod supabase;

pub use query::{Credential, Filter, Page};
pub use supabase::{ProviderError, SupabaseClient};
