// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime synchronization for the catalog list.
//!
//! Keeps a list view in step with the backend over a push channel, and
//! falls back to manual refresh when the channel cannot be established.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Connection  │────►│  Transport  │────►│   Catalog   │
//! │  Manager    │◄────│   (trait)   │◄────│   Backend   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ Registry (established / error / created / deleted)
//!        ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ ListSession │────►│  ListStore  │  (CollectionView + merge rules)
//! │ (one loop)  │     └─────────────┘
//! └─────────────┘
//!        │
//!        ▼
//!  FallbackDetector  (Connecting → Live | Manual)
//! ```
//!
//! # Features
//!
//! - One shared push connection per process, reused across views
//! - Fallback to manual mode after a connect error or a 2 s timeout
//! - Explicit retry from manual mode, never automatic reconnection
//! - Idempotent merges of pushed creates and deletes
//! - Injectable transport and API traits for testing

mod manager;
mod registry;
mod session;
mod store;
mod transport;

pub use manager::{ConnectionHandle, ConnectionManager, LinkStatus};
pub use registry::{Handler, Registry, SubscriptionId};
pub use session::{ListSession, Update};
pub use store::{ListStore, StoreError};
pub use transport::{
    Transport, TransportError, TransportFactory, TransportFuture, TransportResult,
    WebSocketFactory, WebSocketTransport,
};

#[cfg(test)]
pub(crate) mod test_helpers;
