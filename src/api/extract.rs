// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Extractors that report rejections as [`ApiError`]s.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// `Json<T>` whose rejections use the API's error body.
///
/// Undecodable bodies are 422 (400 for broken JSON, 415 for a wrong content
/// type) and are logged at `warn`.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().path().to_string();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(path = %uri, status = %rejection.status(), error = %message, "Rejected request body");
                Err(ApiError::new(rejection.status(), message))
            }
        }
    }
}

/// `Form<T>` counterpart of [`ValidJson`].
pub struct ValidForm<T>(pub T);

impl<S, T> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().path().to_string();
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(ValidForm(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(path = %uri, status = %rejection.status(), error = %message, "Rejected form body");
                Err(ApiError::new(rejection.status(), message))
            }
        }
    }
}

/// `Query<T>` whose rejections use the API's error body.
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidQuery(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(path = %parts.uri.path(), status = %rejection.status(), error = %message, "Rejected query string");
                Err(ApiError::new(rejection.status(), message))
            }
        }
    }
}

/// `Path<T>` whose rejections use the API's error body.
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ValidPath(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(path = %parts.uri.path(), status = %rejection.status(), error = %message, "Rejected path parameter");
                Err(ApiError::new(rejection.status(), message))
            }
        }
    }
}
