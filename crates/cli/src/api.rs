// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the catalog API.
//!
//! Endpoints:
//! - `GET    /objects`      list all items
//! - `GET    /objects/:id`  one item (404 → [`ApiError::NotFound`])
//! - `POST   /objects`      create an item
//! - `DELETE /objects/:id`  delete an item (404 → [`ApiError::NotFound`])
//! - `POST   /objects/upload-url`  presigned image upload target
//!
//! Images are uploaded with a raw `PUT` to the presigned URL before the item
//! is created with the returned public URL.
//!
//! The [`CatalogApi`] trait lets the list store run against a fake in tests.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use ocat_core::{CatalogItem, ItemId, NewItem};

use crate::config::ApiBase;

/// Error type for API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server has no item with this id.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status.
    #[error("failed to {action}: server returned {status}")]
    Status { action: &'static str, status: u16 },

    /// Network failure before a response arrived.
    #[error("network error: {0}")]
    Transport(String),

    /// Response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`CatalogApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Body of an upload URL request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
}

/// Presigned upload target for one image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// Where to `PUT` the image bytes.
    pub upload_url: String,
    /// URL the image is served from once uploaded.
    pub public_url: String,
    /// Storage key of the object.
    pub key: String,
}

/// Catalog REST endpoints.
pub trait CatalogApi: Send + Sync {
    fn list(&self) -> ApiFuture<'_, Vec<CatalogItem>>;

    fn get(&self, id: ItemId) -> ApiFuture<'_, CatalogItem>;

    fn create(&self, item: NewItem) -> ApiFuture<'_, CatalogItem>;

    fn delete(&self, id: ItemId) -> ApiFuture<'_, ()>;

    /// Requests a presigned upload target for an image.
    fn upload_url(&self, request: UploadRequest) -> ApiFuture<'_, UploadTicket>;

    /// Uploads raw image bytes to a presigned URL. Anything but 200 fails.
    fn upload(
        &self,
        upload_url: String,
        content_type: String,
        body: Vec<u8>,
    ) -> ApiFuture<'_, ()>;
}

const OBJECTS: &str = "objects";
const UPLOAD_URL: &str = "upload-url";

/// [`CatalogApi`] over HTTP using reqwest.
pub struct HttpCatalogApi {
    client: reqwest::Client,
    base: ApiBase,
}

impl HttpCatalogApi {
    pub fn new(base: ApiBase) -> Self {
        HttpCatalogApi {
            client: reqwest::Client::new(),
            base,
        }
    }

    fn objects_url(&self) -> Url {
        self.base.endpoint(&[OBJECTS])
    }

    fn item_url(&self, id: &ItemId) -> Url {
        self.base.endpoint(&[OBJECTS, id.as_str()])
    }
}

impl CatalogApi for HttpCatalogApi {
    fn list(&self) -> ApiFuture<'_, Vec<CatalogItem>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.objects_url())
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, "list objects", None)?;
            response.json().await.map_err(decode_error)
        })
    }

    fn get(&self, id: ItemId) -> ApiFuture<'_, CatalogItem> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.item_url(&id))
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, "get object", Some(&id))?;
            response.json().await.map_err(decode_error)
        })
    }

    fn create(&self, item: NewItem) -> ApiFuture<'_, CatalogItem> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.objects_url())
                .json(&item)
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, "create object", None)?;
            response.json().await.map_err(decode_error)
        })
    }

    fn delete(&self, id: ItemId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let response = self
                .client
                .delete(self.item_url(&id))
                .send()
                .await
                .map_err(transport_error)?;
            check_status(response, "delete object", Some(&id))?;
            Ok(())
        })
    }

    fn upload_url(&self, request: UploadRequest) -> ApiFuture<'_, UploadTicket> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.base.endpoint(&[OBJECTS, UPLOAD_URL]))
                .json(&request)
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, "get upload url", None)?;
            response.json().await.map_err(decode_error)
        })
    }

    fn upload(
        &self,
        upload_url: String,
        content_type: String,
        body: Vec<u8>,
    ) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let size = body.len();
            let response = self
                .client
                .put(upload_url.as_str())
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await
                .map_err(transport_error)?;
            let status = response.status();
            if status != StatusCode::OK {
                return Err(ApiError::Status {
                    action: "upload image",
                    status: status.as_u16(),
                });
            }
            tracing::debug!(size, "image uploaded");
            Ok(())
        })
    }
}

/// Maps 404 on an item endpoint to `NotFound` and other failures to `Status`.
fn check_status(
    response: reqwest::Response,
    action: &'static str,
    id: Option<&ItemId>,
) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match id {
        Some(id) if status == StatusCode::NOT_FOUND => Err(ApiError::NotFound(id.to_string())),
        _ => Err(ApiError::Status {
            action,
            status: status.as_u16(),
        }),
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn decode_error(e: reqwest::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
