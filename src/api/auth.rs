// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde_json::json;
use tracing::{info, warn};

use super::extract::{ValidForm, ValidJson};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        is_valid_email, AuthResponse, LoginForm, MessageResponse, RefreshRequest, SignupRequest,
        TokenResponse, User,
    },
    services::UserService,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 400, description = "Sign-up rejected by the provider"),
        (status = 422, description = "Invalid email or empty password")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if !is_valid_email(&request.email) {
        return Err(ApiError::unprocessable("Invalid email address"));
    }
    if request.password.is_empty() {
        return Err(ApiError::unprocessable("Password must not be empty"));
    }

    let response = state
        .supabase
        .sign_up(
            &request.email,
            &request.password,
            json!({ "full_name": request.full_name }),
        )
        .await
        .map_err(|e| {
            info!(error = %e, "Sign-up rejected");
            ApiError::bad_request(e.detail())
        })?;

    if let Some(user) = &response.user {
        info!(user_id = %user.id, "User signed up");
        // Account creation is not rolled back if the profile insert fails.
        if let Err(e) = UserService::new(&state.supabase).create_profile(user).await {
            warn!(user_id = %user.id, error = %e, "Failed to create user profile after sign-up");
        }
    }

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state
        .supabase
        .sign_in_with_password(&form.username, &form.password)
        .await
        .map_err(|e| {
            info!(error = %e, "Password sign-in failed");
            ApiError::unauthorized("Incorrect email or password")
        })?;

    let user = session.user.clone();
    if let Some(user) = &user {
        info!(user_id = %user.id, "User signed in");
    }
    Ok(Json(TokenResponse::from_session(session, user)))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state
        .supabase
        .refresh_session(&request.refresh_token)
        .await
        .map_err(|e| {
            info!(error = %e, "Token refresh failed");
            ApiError::unauthorized("Invalid refresh token")
        })?;

    Ok(Json(TokenResponse::from_session(session, None)))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<MessageResponse>, ApiError> {
    state.supabase.sign_out(&user.access_token).await?;
    info!(user_id = %user.user_id(), "User signed out");
    Ok(Json(MessageResponse::new("Successfully logged out")))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(Auth(user): Auth) -> Json<User> {
    Json(user.user)
}
