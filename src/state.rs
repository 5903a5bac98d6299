// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::Settings;
use crate::providers::{ProviderError, SupabaseClient};

/// Shared, immutable per-process context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub supabase: SupabaseClient,
    pub verifier: Arc<TokenVerifier>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, ProviderError> {
        let supabase = SupabaseClient::from_settings(&settings)?;
        Ok(Self::with_client(settings, supabase))
    }

    pub fn with_client(settings: Settings, supabase: SupabaseClient) -> Self {
        Self {
            supabase,
            verifier: Arc::new(TokenVerifier::from_settings(&settings)),
            settings: Arc::new(settings),
        }
    }
}
