// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered, duplicate-free view of the catalog.
//!
//! Merge rules:
//! - Bulk replace: the fetched list becomes the view (later duplicates win)
//! - Created: last write occupies the single slot for its id
//! - Deleted: removes the id if present, no-op otherwise
//!
//! After every mutation the view is sorted newest first and holds at most
//! one entry per id. Pushed events can arrive out of creation order, so the
//! order is re-established on each merge instead of assumed.

use std::collections::{HashMap, HashSet};

use crate::item::{CatalogItem, ItemId};

/// Items sorted by `created_at` descending with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionView {
    items: Vec<CatalogItem>,
}

impl CollectionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a view from an unordered list that may contain duplicates.
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        let mut view = CollectionView { items: dedup_last_wins(items) };
        view.sort();
        view
    }

    /// Replaces the whole view with a bulk fetch result.
    pub fn replace_all(&mut self, items: Vec<CatalogItem>) {
        *self = Self::from_items(items);
    }

    /// Inserts or overwrites the entry for `item.id`.
    ///
    /// Returns true if the id was new to the view.
    pub fn upsert(&mut self, item: CatalogItem) -> bool {
        let inserted = match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                *existing = item;
                false
            }
            None => {
                self.items.push(item);
                true
            }
        };
        self.sort();
        inserted
    }

    /// Removes the entry with `id`.
    ///
    /// Returns false when the id was not present.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when ids are unique and the order is strictly newest first.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.items.len());
        if !self.items.iter().all(|item| seen.insert(&item.id)) {
            return false;
        }
        self.items
            .windows(2)
            .all(|pair| CatalogItem::newest_first(&pair[0], &pair[1]).is_lt())
    }

    fn sort(&mut self) {
        self.items.sort_by(CatalogItem::newest_first);
        debug_assert!(self.is_consistent());
    }
}

impl IntoIterator for CollectionView {
    type Item = CatalogItem;
    type IntoIter = std::vec::IntoIter<CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Keeps one entry per id, the last one seen, in first-seen position.
fn dedup_last_wins(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut slots: HashMap<ItemId, usize> = HashMap::with_capacity(items.len());
    let mut out: Vec<CatalogItem> = Vec::with_capacity(items.len());
    for item in items {
        match slots.get(&item.id) {
            Some(&slot) => out[slot] = item,
            None => {
                slots.insert(item.id.clone(), out.len());
                out.push(item);
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
