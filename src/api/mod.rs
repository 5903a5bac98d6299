// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug_span, warn, Span};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::CorsOrigins,
    models::{
        AuthResponse, Item, ItemCreate, ItemUpdate, LoginForm, MessageResponse, RefreshRequest,
        Session, SignupRequest, TokenResponse, User, UserProfile, UserUpdate,
    },
    state::AppState,
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod items;
pub mod users;


pub fn router(state: AppState) -> Router {
    let prefix = state.settings.api_prefix.clone();
    let doc = api_doc(&prefix, &state.settings.project_name);
    let cors = cors_layer(&state.settings.cors_origins);

    let api_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/users/me", get(users::read_me).put(users::update_me))
        .route("/users", get(users::list_users))
        .route("/users/", get(users::list_users))
        .route(
            "/users/{user_id}",
            get(users::read_user).delete(users::delete_user),
        )
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/", get(items::list_items).post(items::create_item))
        .route(
            "/items/{item_id}",
            get(items::read_item)
                .put(items::update_item)
                .delete(items::delete_item),
        );

    let root_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let routes = if prefix.is_empty() {
        root_routes.merge(api_routes)
    } else {
        root_routes.nest(&prefix, api_routes)
    };

    Router::new()
        .merge(routes.with_state(state))
        .merge(SwaggerUi::new("/docs").url(format!("{prefix}/openapi.json"), doc))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
}

/// OpenAPI document with the API routes mounted under `prefix`.
pub fn api_doc(prefix: &str, title: &str) -> utoipa::openapi::OpenApi {
    let mut doc = RootDoc::openapi();
    doc.info.title = title.to_string();
    if prefix.is_empty() {
        doc.merge(ApiDoc::openapi());
        doc
    } else {
        doc.nest(prefix, ApiDoc::openapi())
    }
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!(
        "http-request",
        method = %request.method(),
        path = request.uri().path(),
        request_id
    )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health::root, health::health, health::liveness, health::readiness),
    components(schemas(
        health::WelcomeResponse,
        health::HealthResponse,
        health::ReadyResponse,
        health::HealthChecks
    )),
    modifiers(&SecurityAddon),
    tags((name = "Health", description = "Liveness and readiness probes"))
)]
struct RootDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::me,
        users::read_me,
        users::update_me,
        users::read_user,
        users::list_users,
        users::delete_user,
        items::list_items,
        items::create_item,
        items::read_item,
        items::update_item,
        items::delete_item
    ),
    components(schemas(
        User,
        Session,
        AuthResponse,
        SignupRequest,
        LoginForm,
        RefreshRequest,
        TokenResponse,
        MessageResponse,
        UserProfile,
        UserUpdate,
        Item,
        ItemCreate,
        ItemUpdate
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-up, sign-in and session management"),
        (name = "Users", description = "User profiles"),
        (name = "Items", description = "Items owned by users")
    )
)]
struct ApiDoc;
