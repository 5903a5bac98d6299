// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item service backed by the `items` table.
//!
//! Calls are made with the caller's own access token, so the project's
//! row-level security policies apply on top of the ownership checks done in
//! the route handlers.

use serde_json::json;

use super::ServiceResult;
use crate::models::{Item, ItemCreate, ItemUpdate};
use crate::providers::{Credential, Filter, Page, ProviderError, SupabaseClient};

pub const ITEMS_TABLE: &str = "items";

/// Service for item operations on behalf of one caller.
pub struct ItemService<'a> {
    client: &'a SupabaseClient,
    access_token: &'a str,
}

impl<'a> ItemService<'a> {
    pub fn new(client: &'a SupabaseClient, access_token: &'a str) -> Self {
        Self {
            client,
            access_token,
        }
    }

    fn credential(&self) -> Credential<'a> {
        Credential::User(self.access_token)
    }

    /// List items, optionally only those owned by `owner`.
    pub async fn list(&self, owner: Option<&str>, skip: usize, limit: usize) -> ServiceResult<Vec<Item>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let filter = match owner {
            Some(owner) => Filter::eq("owner_id", owner),
            None => Filter::new(),
        };
        let mut items: Vec<Item> = self
            .client
            .select(ITEMS_TABLE, &filter, self.credential(), Some(Page::new(skip, limit)))
            .await?;
        items.truncate(limit);
        Ok(items)
    }

    pub async fn get(&self, item_id: i64) -> ServiceResult<Option<Item>> {
        let items: Vec<Item> = self
            .client
            .select(
                ITEMS_TABLE,
                &Filter::eq("id", item_id),
                self.credential(),
                Some(Page::new(0, 1)),
            )
            .await?;
        Ok(items.into_iter().next())
    }

    /// Create an item owned by `owner_id`.
    pub async fn create(&self, item: &ItemCreate, owner_id: &str) -> ServiceResult<Item> {
        let row = json!({
            "title": item.title,
            "description": item.description,
            "owner_id": owner_id,
        });
        let items: Vec<Item> = self
            .client
            .insert(ITEMS_TABLE, &row, self.credential())
            .await?;
        items.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("insert into items returned no row".to_string()).into()
        })
    }

    /// Apply a partial update; `None` when no item matched.
    pub async fn update(&self, item_id: i64, update: &ItemUpdate) -> ServiceResult<Option<Item>> {
        if update.is_empty() {
            return self.get(item_id).await;
        }
        let items: Vec<Item> = self
            .client
            .update(ITEMS_TABLE, &Filter::eq("id", item_id), update, self.credential())
            .await?;
        Ok(items.into_iter().next())
    }

    /// Delete an item. Returns `false` if nothing matched.
    pub async fn delete(&self, item_id: i64) -> ServiceResult<bool> {
        let items: Vec<Item> = self
            .client
            .delete(ITEMS_TABLE, &Filter::eq("id", item_id), self.credential())
            .await?;
        Ok(!items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{can_bind_localhost, provider_client, ANON_KEY};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(id: i64, owner: &str) -> Value {
        json!({ "id": id, "owner_id": owner, "title": format!("Item {id}") })
    }

    #[tokio::test]
    async fn list_scopes_by_owner_with_caller_token() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(query_param("owner_id", "eq.u-1"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "10"))
            .and(header("apikey", ANON_KEY))
            .and(header("Authorization", "Bearer caller-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([item(1, "u-1"), item(2, "u-1")])),
            )
            .mount(&server)
            .await;

        let client = provider_client(&server);
        let items = ItemService::new(&client, "caller-token")
            .list(Some("u-1"), 0, 10)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.owner_id == "u-1"));
    }

    #[tokio::test]
    async fn list_never_exceeds_limit() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                item(1, "u-1"),
                item(2, "u-2"),
                item(3, "u-3")
            ])))
            .mount(&server)
            .await;

        let client = provider_client(&server);
        let items = ItemService::new(&client, "caller-token")
            .list(None, 0, 2)
            .await
            .unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_item() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", "eq.42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = provider_client(&server);
        assert!(ItemService::new(&client, "tok").get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_sets_owner() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/items"))
            .and(body_json(json!({
                "title": "Lamp",
                "description": null,
                "owner_id": "u-1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 5, "owner_id": "u-1", "title": "Lamp"
            }])))
            .mount(&server)
            .await;

        let client = provider_client(&server);
        let create = ItemCreate {
            title: "Lamp".to_string(),
            description: None,
        };
        let created = ItemService::new(&client, "tok").create(&create, "u-1").await.unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.owner_id, "u-1");
    }

    #[tokio::test]
    async fn update_returns_none_when_nothing_matched() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", "eq.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = provider_client(&server);
        let update = ItemUpdate {
            title: Some("New".to_string()),
            description: None,
        };
        assert!(ItemService::new(&client, "tok").update(9, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_missing_item_is_false() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/items"))
            .and(query_param("id", "eq.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = provider_client(&server);
        assert!(!ItemService::new(&client, "tok").delete(3).await.unwrap());
    }
}
