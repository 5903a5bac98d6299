// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profile service backed by the `users` table.
//!
//! Profiles are managed on behalf of the application, so every call uses the
//! elevated credential and bypasses row-level security. Route handlers are
//! responsible for checking who may touch which profile.

use serde_json::json;
use tracing::info;

use super::ServiceResult;
use crate::models::{User, UserProfile, UserUpdate};
use crate::providers::{Credential, Filter, Page, SupabaseClient};

pub const USERS_TABLE: &str = "users";

/// Service for profile operations.
pub struct UserService<'a> {
    client: &'a SupabaseClient,
}

impl<'a> UserService<'a> {
    /// Create a new UserService.
    pub fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Get a profile by user id.
    pub async fn get_by_id(&self, user_id: &str) -> ServiceResult<Option<UserProfile>> {
        self.first(Filter::eq("id", user_id)).await
    }

    /// Get a profile by email address.
    pub async fn get_by_email(&self, email: &str) -> ServiceResult<Option<UserProfile>> {
        self.first(Filter::eq("email", email)).await
    }

    /// List profiles, skipping `skip` rows and returning at most `limit`.
    pub async fn list(&self, skip: usize, limit: usize) -> ServiceResult<Vec<UserProfile>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut rows: Vec<UserProfile> = self
            .client
            .select(
                USERS_TABLE,
                &Filter::new(),
                Credential::Elevated,
                Some(Page::new(skip, limit)),
            )
            .await?;
        rows.truncate(limit);
        Ok(rows)
    }

    /// Apply a partial update; `None` when no profile row exists.
    pub async fn update(&self, user_id: &str, update: &UserUpdate) -> ServiceResult<Option<UserProfile>> {
        if update.is_empty() {
            return self.get_by_id(user_id).await;
        }
        let rows: Vec<UserProfile> = self
            .client
            .update(USERS_TABLE, &Filter::eq("id", user_id), update, Credential::Elevated)
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Delete a profile. Returns `false` if nothing matched.
    pub async fn delete(&self, user_id: &str) -> ServiceResult<bool> {
        let rows: Vec<UserProfile> = self
            .client
            .delete(USERS_TABLE, &Filter::eq("id", user_id), Credential::Elevated)
            .await?;
        if !rows.is_empty() {
            info!(user_id = %user_id, "Deleted user profile");
        }
        Ok(!rows.is_empty())
    }

    /// Insert the profile row for a freshly signed-up user.
    pub async fn create_profile(&self, user: &User) -> ServiceResult<Option<UserProfile>> {
        let row = json!({
            "id": user.id,
            "email": user.email,
            "full_name": user.user_metadata.full_name,
        });
        let rows: Vec<UserProfile> = self
            .client
            .insert(USERS_TABLE, &row, Credential::Elevated)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn first(&self, filter: Filter) -> ServiceResult<Option<UserProfile>> {
        let rows: Vec<UserProfile> = self
            .client
            .select(USERS_TABLE, &filter, Credential::Elevated, Some(Page::new(0, 1)))
            .await?;
        Ok(rows.into_iter().next())
    }
}
