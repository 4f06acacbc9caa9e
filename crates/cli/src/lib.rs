// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ocat - a realtime-synchronized objects catalog client.
//!
//! This crate provides the I/O side of the `ocat` CLI: configuration, the
//! HTTP catalog API, and the push channel that keeps a list view current.
//!
//! # Main Components
//!
//! - [`sync::ConnectionManager`] - the single shared push connection
//! - [`sync::ListSession`] - one list view: connection race, fallback, merging
//! - [`sync::ListStore`] - the reconciled list and its merge rules
//! - [`api::CatalogApi`] - the REST endpoints, [`api::HttpCatalogApi`] over HTTP
//! - [`Error`] - Error types for all operations
//!
//! # Watching the catalog
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ocat::config::load_settings;
//! use ocat::sync::{ConnectionManager, ListSession};
//!
//! let settings = load_settings(None)?;
//! let manager = Arc::new(ConnectionManager::new(settings.push.clone()));
//! let api = ocat::api::HttpCatalogApi::new(settings.api_base.clone());
//! let mut session = ListSession::new(manager, api, settings.fallback_timeout);
//! session.activate().await?;
//! while let Some(update) = session.next_event().await {
//!     println!("{:?}: {} objects", update, session.view().len());
//! }
//! ```

mod cli;
mod commands;
mod display;

pub mod api;
pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, ImageArgs};
pub use config::{load_settings, Config, Settings};
pub use error::{Error, Result};

use commands::items::{Draft, ImageSource};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    tracing::debug!(api_base = %settings.api_base.as_url(), push = %settings.push.url, "resolved settings");

    match cli.command {
        Command::List { output } => commands::items::list(&settings, &output).await,
        Command::Show { id, output } => commands::items::show(&settings, &id, &output).await,
        Command::New {
            title,
            description,
            image,
            output,
        } => {
            let image = match (image.image, image.image_url) {
                (Some(path), _) => ImageSource::File(path),
                (None, Some(url)) => ImageSource::Url(url),
                (None, None) => ImageSource::Url(String::new()),
            };
            let draft = Draft {
                title,
                description,
                image,
            };
            commands::items::new(&settings, draft, &output).await
        }
        Command::Delete { id } => commands::items::delete(&settings, &id).await,
        Command::Watch => commands::watch::run(&settings).await,
    }
}
