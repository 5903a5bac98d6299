// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use tracing::info;

use super::extract::{ValidJson, ValidPath, ValidQuery};
use crate::{
    auth::{ActiveUser, AuthError, SuperuserOnly},
    error::ApiError,
    models::{is_valid_email, ListParams, MessageResponse, User, UserProfile, UserUpdate},
    services::UserService,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn read_me(ActiveUser(user): ActiveUser) -> Json<User> {
    Json(user.user)
}

#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UserUpdate,
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = UserProfile),
        (status = 404, description = "No profile row for the caller"),
        (status = 422, description = "Invalid email address")
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    ValidJson(update): ValidJson<UserUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    if let Some(email) = &update.email {
        if !is_valid_email(email) {
            return Err(ApiError::unprocessable("Invalid email address"));
        }
    }

    UserService::new(&state.supabase)
        .update(user.user_id(), &update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = String, Path, description = "Identifier of the user")),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = UserProfile),
        (status = 403, description = "Not the caller and caller is not a superuser"),
        (status = 404, description = "User not found")
    )
)]
pub async fn read_user(
    ActiveUser(user): ActiveUser,
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<String>,
) -> Result<Json<UserProfile>, ApiError> {
    if !user.can_access_user(&user_id) {
        return Err(AuthError::InsufficientPermissions.into());
    }

    UserService::new(&state.supabase)
        .get_by_id(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[utoipa::path(
    get,
    path = "/users/",
    params(ListParams),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = [UserProfile]),
        (status = 403, description = "Superuser required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    SuperuserOnly(_admin): SuperuserOnly,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = UserService::new(&state.supabase)
        .list(params.skip, params.limit)
        .await?;
    Ok(Json(users))
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(("user_id" = String, Path, description = "Identifier of the user to delete")),
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Superuser required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    SuperuserOnly(admin): SuperuserOnly,
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !UserService::new(&state.supabase).delete(&user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id = %user_id, admin_id = %admin.user_id(), "User deleted by superuser");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
