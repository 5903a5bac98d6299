// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::extract::{ValidJson, ValidPath, ValidQuery};
use crate::{
    auth::ActiveUser,
    error::ApiError,
    models::{Item, ItemCreate, ItemUpdate, ListParams, MessageResponse},
    services::{ItemService, OwnershipCheck},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/items/",
    params(ListParams),
    tag = "Items",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Own items, or every item for a superuser", body = [Item]))
)]
pub async fn list_items(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    ValidQuery(params): ValidQuery<ListParams>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let owner = (!user.is_superuser()).then(|| user.user_id());
    let items = ItemService::new(&state.supabase, &user.access_token)
        .list(owner, params.skip, params.limit)
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/items/",
    request_body = ItemCreate,
    tag = "Items",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Item),
        (status = 422, description = "Empty title")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    ValidJson(request): ValidJson<ItemCreate>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::unprocessable("Title must not be empty"));
    }
    let item = ItemService::new(&state.supabase, &user.access_token)
        .create(&request, user.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/items/{item_id}",
    params(("item_id" = i64, Path, description = "Identifier of the item")),
    tag = "Items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Item),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn read_item(
    ActiveUser(user): ActiveUser,
    State(state): State<AppState>,
    ValidPath(item_id): ValidPath<i64>,
) -> Result<Json<Item>, ApiError> {
    let item = ItemService::new(&state.supabase, &user.access_token)
        .get(item_id)
        .await
        .verify_owner(&user, &item_id.to_string())?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/items/{item_id}",
    params(("item_id" = i64, Path, description = "Identifier of the item")),
    request_body = ItemUpdate,
    tag = "Items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Item),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    ActiveUser(user): ActiveUser,
    State(state): State<AppState>,
    ValidPath(item_id): ValidPath<i64>,
    ValidJson(update): ValidJson<ItemUpdate>,
) -> Result<Json<Item>, ApiError> {
    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::unprocessable("Title must not be empty"));
    }

    let service = ItemService::new(&state.supabase, &user.access_token);
    service
        .get(item_id)
        .await
        .verify_owner(&user, &item_id.to_string())?;

    service
        .update(item_id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

#[utoipa::path(
    delete,
    path = "/items/{item_id}",
    params(("item_id" = i64, Path, description = "Identifier of the item")),
    tag = "Items",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    ActiveUser(user): ActiveUser,
    State(state): State<AppState>,
    ValidPath(item_id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = ItemService::new(&state.supabase, &user.access_token);
    service
        .get(item_id)
        .await
        .verify_owner(&user, &item_id.to_string())?;

    if !service.delete(item_id).await? {
        return Err(ApiError::not_found("Item not found"));
    }
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}
