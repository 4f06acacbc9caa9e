// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ocat-core: Shared library for the ocat catalog client
//!
//! This crate provides the data model, the reconciliation rules for the
//! catalog list, the fallback mode state machine, and the push channel
//! codec. It performs no I/O.

pub mod error;
pub mod item;
pub mod mode;
pub mod protocol;
pub mod view;

pub use error::{Error, Result};
pub use item::{CatalogItem, ItemId, NewItem};
pub use mode::{DetectorState, FallbackDetector, OperatingMode, Signal, Transition};
pub use protocol::{ChannelEvent, EventKind, Handshake, Packet, PushEvent};
pub use view::CollectionView;
