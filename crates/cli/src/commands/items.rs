// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot catalog commands: list, show, new, delete.

use std::path::{Path, PathBuf};

use ocat_core::{ItemId, NewItem};

use crate::api::{CatalogApi, UploadRequest};
use crate::config::Settings;
use crate::display::{format_item_details, format_view};
use crate::error::{Error, Result};
use crate::sync::ListStore;

use super::{open_api, Format};

pub async fn list(settings: &Settings, output: &str) -> Result<()> {
    println!("{}", list_impl(open_api(settings), output).await?);
    Ok(())
}

/// Internal implementation that accepts the API for testing.
pub(crate) async fn list_impl<A: CatalogApi>(api: A, output: &str) -> Result<String> {
    let format = Format::parse(output)?;
    let mut store = ListStore::new(api);
    store.load_all().await?;

    match format {
        Format::Text => Ok(format_view(store.view())),
        Format::Json => Ok(serde_json::to_string_pretty(store.view().items())?),
    }
}

pub async fn show(settings: &Settings, id: &str, output: &str) -> Result<()> {
    println!("{}", show_impl(&open_api(settings), id, output).await?);
    Ok(())
}

pub(crate) async fn show_impl<A: CatalogApi>(api: &A, id: &str, output: &str) -> Result<String> {
    let format = Format::parse(output)?;
    let item = api.get(ItemId::from(id)).await?;

    match format {
        Format::Text => Ok(format_item_details(&item)),
        Format::Json => Ok(serde_json::to_string_pretty(&item)?),
    }
}

/// Where the image of a new object comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An image that is already hosted.
    Url(String),
    /// A local file, uploaded through a presigned URL first.
    File(PathBuf),
}

/// A new object as given on the command line.
#[derive(Debug, Clone)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub image: ImageSource,
}

pub async fn new(settings: &Settings, draft: Draft, output: &str) -> Result<()> {
    println!("{}", new_impl(&open_api(settings), draft, output).await?);
    Ok(())
}

pub(crate) async fn new_impl<A: CatalogApi>(api: &A, draft: Draft, output: &str) -> Result<String> {
    let format = Format::parse(output)?;
    let mut item = NewItem {
        title: draft.title,
        description: draft.description,
        image_url: match &draft.image {
            ImageSource::Url(url) => url.clone(),
            ImageSource::File(path) => path.display().to_string(),
        },
    };
    item.validate()?;

    if let ImageSource::File(path) = &draft.image {
        item.image_url = upload_image(api, path).await?;
    }
    let created = api.create(item).await?;
    tracing::info!(id = %created.id, "created object");

    match format {
        Format::Text => Ok(format!("Created {}: {}", created.id, created.title)),
        Format::Json => Ok(serde_json::to_string_pretty(&created)?),
    }
}

/// Uploads a local image and returns the URL it is served from.
async fn upload_image<A: CatalogApi>(api: &A, path: &Path) -> Result<String> {
    let content_type = image_content_type(path).ok_or_else(|| Error::UnsupportedImage {
        path: path.display().to_string(),
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::UnsupportedImage {
            path: path.display().to_string(),
        })?;
    let body = tokio::fs::read(path).await?;

    let ticket = api
        .upload_url(UploadRequest {
            filename,
            content_type: content_type.to_string(),
        })
        .await?;
    tracing::debug!(key = %ticket.key, size = body.len(), "uploading image");
    api.upload(ticket.upload_url, content_type.to_string(), body)
        .await?;
    Ok(ticket.public_url)
}

/// Content type of an image file, from its extension.
pub(crate) fn image_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub async fn delete(settings: &Settings, id: &str) -> Result<()> {
    println!("{}", delete_impl(open_api(settings), id).await?);
    Ok(())
}

/// Deletes through the store so an already deleted object counts as success.
pub(crate) async fn delete_impl<A: CatalogApi>(api: A, id: &str) -> Result<String> {
    let id = ItemId::from(id);
    ListStore::new(api).delete_local(&id).await?;
    Ok(format!("Deleted {}", id))
}

#[cfg(test)]
#[path = "items_tests.rs"]
mod tests;
