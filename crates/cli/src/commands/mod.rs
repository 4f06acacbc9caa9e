// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod items;
pub mod watch;

use crate::api::HttpCatalogApi;
use crate::config::Settings;
use crate::error::{Error, Result};

/// Helper to build the HTTP API client from resolved settings.
pub fn open_api(settings: &Settings) -> HttpCatalogApi {
    HttpCatalogApi::new(settings.api_base.clone())
}

/// Output formats accepted by `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(Error::UnknownFormat {
                format: format.to_string(),
            }),
        }
    }
}
