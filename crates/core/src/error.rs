// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ocat-core operations.

use thiserror::Error;

/// All possible errors that can occur in ocat-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    #[error("unknown packet type: '{0}'")]
    UnknownPacketType(char),

    #[error("unknown event: '{0}'\n  hint: expected objects.created or objects.deleted")]
    UnknownEvent(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for ocat-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
