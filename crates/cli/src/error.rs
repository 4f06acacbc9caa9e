// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::api::ApiError;
use crate::sync::StoreError;

/// All possible errors that can occur in the ocat library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid api base '{0}'\n  hint: use an http:// or https:// URL, e.g. http://localhost:3000")]
    InvalidApiBase(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown output format: '{format}'\n  hint: valid formats are: text, json")]
    UnknownFormat { format: String },

    #[error("unsupported image '{path}'\n  hint: use a .jpg, .jpeg, .png, .gif, .webp, .heic or .heif file")]
    UnsupportedImage { path: String },

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Core(#[from] ocat_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// A specialized Result type for ocat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
