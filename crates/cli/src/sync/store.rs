// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! List reconciliation store.
//!
//! Holds the authoritative in-memory [`CollectionView`] for one list view
//! and applies the merge rules for bulk fetches, push events, and local
//! deletes:
//!
//! - **Bulk fetch**: replaces the view; duplicate ids keep the later copy.
//!   A failed fetch leaves the previous view and records the error.
//! - **Created**: upsert by id, then re-sort. A second create for an id
//!   overwrites the first in place.
//! - **Deleted**: remove if present, otherwise nothing happens.
//! - **Local delete**: the item is removed once the backend confirms or
//!   reports it already gone. Any other failure leaves the view untouched.

use tracing::{debug, warn};

use ocat_core::{CatalogItem, ChannelEvent, CollectionView, ItemId};

use crate::api::{ApiError, CatalogApi};

/// Failure recorded on the store for display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("could not load objects: {0}")]
    Load(ApiError),

    #[error("could not delete {id}: {source}")]
    Delete { id: ItemId, source: ApiError },
}

pub struct ListStore<A: CatalogApi> {
    api: A,
    view: CollectionView,
    loading: bool,
    error: Option<StoreError>,
}

impl<A: CatalogApi> ListStore<A> {
    pub fn new(api: A) -> Self {
        ListStore {
            api,
            view: CollectionView::new(),
            loading: false,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> &CollectionView {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last recorded failure, until cleared or replaced by a successful load.
    pub fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Fetches the full list and replaces the view.
    pub async fn load_all(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        let fetched = self.api.list().await;
        self.loading = false;

        match fetched {
            Ok(items) => {
                debug!(count = items.len(), "loaded objects");
                self.view.replace_all(items);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "bulk fetch failed, keeping previous list");
                let err = StoreError::Load(e);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Merges a pushed item. Returns true if the view changed.
    pub fn apply_created(&mut self, item: CatalogItem) -> bool {
        if self.view.get(&item.id) == Some(&item) {
            return false;
        }
        debug!(id = %item.id, "merge created");
        self.view.upsert(item);
        true
    }

    /// Removes a pushed deletion. Returns true if the item was present.
    pub fn apply_deleted(&mut self, id: &ItemId) -> bool {
        let removed = self.view.remove(id);
        debug!(%id, removed, "merge deleted");
        removed
    }

    /// Merges an item event; lifecycle signals leave the view alone.
    pub fn apply(&mut self, event: &ChannelEvent) -> bool {
        match event {
            ChannelEvent::ItemCreated(item) => self.apply_created(item.clone()),
            ChannelEvent::ItemDeleted(id) => self.apply_deleted(id),
            ChannelEvent::Established | ChannelEvent::Error(_) => false,
        }
    }

    /// Deletes through the backend, then removes the item locally.
    ///
    /// An item the backend no longer has is treated as deleted.
    pub async fn delete_local(&mut self, id: &ItemId) -> Result<(), StoreError> {
        match self.api.delete(id.clone()).await {
            Ok(()) => {}
            Err(ApiError::NotFound(_)) => {
                debug!(%id, "delete target already gone");
            }
            Err(e) => {
                warn!(%id, error = %e, "delete failed");
                let err = StoreError::Delete {
                    id: id.clone(),
                    source: e,
                };
                self.error = Some(err.clone());
                return Err(err);
            }
        }
        self.view.remove(id);
        Ok(())
    }
}
