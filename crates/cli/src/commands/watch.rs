// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `ocat watch`: a live list view on the terminal.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::CatalogApi;
use crate::config::Settings;
use crate::display::{format_transition, format_view};
use crate::error::Result;
use crate::sync::{ConnectionManager, ListSession, TransportFactory, Update};

use super::open_api;

/// A line of keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Refresh,
    Retry,
    Dismiss,
    Quit,
}

impl Key {
    pub fn parse(line: &str) -> Option<Key> {
        match line.trim() {
            "r" => Some(Key::Refresh),
            "t" => Some(Key::Retry),
            "d" => Some(Key::Dismiss),
            "q" => Some(Key::Quit),
            _ => None,
        }
    }
}

enum Action {
    Update(Update),
    Input(Option<String>),
    Quit,
}

pub async fn run(settings: &Settings) -> Result<()> {
    let manager = Arc::new(ConnectionManager::new(settings.push.clone()));
    let session = ListSession::new(manager, open_api(settings), settings.fallback_timeout);
    let mut watcher = Watcher::new(session, std::io::stdout());
    watcher.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        let action = tokio::select! {
            update = watcher.session.next_event() => match update {
                Some(update) => Action::Update(update),
                None => Action::Quit,
            },
            line = lines.next_line(), if stdin_open => Action::Input(line.ok().flatten()),
            _ = tokio::signal::ctrl_c() => Action::Quit,
        };

        match action {
            Action::Update(update) => watcher.apply_update(&update)?,
            Action::Input(None) => stdin_open = false,
            Action::Input(Some(line)) => {
                let Some(key) = Key::parse(&line) else {
                    writeln!(watcher.out, "unknown key '{}' (r, t, d, q)", line.trim())?;
                    continue;
                };
                if !watcher.apply_key(key).await? {
                    break;
                }
            }
            Action::Quit => break,
        }
    }

    watcher.session.teardown();
    Ok(())
}

/// Drives a [`ListSession`] and renders its changes.
pub struct Watcher<A: CatalogApi, F: TransportFactory, W: Write> {
    pub(crate) session: ListSession<A, F>,
    out: W,
}

impl<A: CatalogApi, F: TransportFactory, W: Write> Watcher<A, F, W> {
    pub fn new(session: ListSession<A, F>, out: W) -> Self {
        Watcher { session, out }
    }

    /// Activates the session and prints the initial list.
    pub async fn start(&mut self) -> Result<()> {
        if let Err(e) = self.session.activate().await {
            writeln!(self.out, "warning: {}", e)?;
        }
        self.render()
    }

    fn render(&mut self) -> Result<()> {
        writeln!(self.out, "{}", format_view(self.session.view()))?;
        Ok(())
    }

    pub fn apply_update(&mut self, update: &Update) -> Result<()> {
        match update {
            Update::Mode(transition) => writeln!(self.out, "{}", format_transition(transition))?,
            Update::View => self.render()?,
            Update::Unchanged => {}
        }
        Ok(())
    }

    /// Handles one key. Returns false when the user asked to quit.
    pub async fn apply_key(&mut self, key: Key) -> Result<bool> {
        match key {
            Key::Refresh => {
                match self.session.refresh().await {
                    Ok(()) => self.render()?,
                    Err(e) => writeln!(self.out, "warning: {}", e)?,
                }
            }
            Key::Retry => match self.session.retry().await {
                Some(transition) => writeln!(self.out, "{}", format_transition(&transition))?,
                None => writeln!(self.out, "retry is only available in manual mode")?,
            },
            Key::Dismiss => {
                if self.session.notice_visible() {
                    self.session.dismiss_notice();
                    writeln!(self.out, "notice dismissed")?;
                }
            }
            Key::Quit => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
