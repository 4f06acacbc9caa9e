// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog item types.
//!
//! Items are created by the backend and never mutated client-side. The
//! wire shape follows the catalog API: `_id`, `title`, `description`,
//! `imageUrl`, `createdAt`.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque, stable identifier of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

/// A record in the objects catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Backend-assigned identity.
    #[serde(rename = "_id", alias = "id")]
    pub id: ItemId,
    /// Display title, never empty.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Reference to the externally stored image.
    #[serde(default)]
    pub image_url: String,
    /// Creation time assigned by the backend.
    pub created_at: DateTime<Utc>,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        CatalogItem {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            image_url: image_url.into(),
            created_at,
        }
    }

    /// Checks the fields the backend guarantees.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(Error::InvalidItem("id is empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::InvalidItem(format!("title is empty for {}", self.id)));
        }
        Ok(())
    }

    /// Display order: newest first, ties broken by id descending.
    pub fn newest_first(a: &CatalogItem, b: &CatalogItem) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Request body for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl NewItem {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidItem("title is empty".to_string()));
        }
        if self.image_url.trim().is_empty() {
            return Err(Error::InvalidItem("image url is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
