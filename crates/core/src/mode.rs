// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operating mode state machine.
//!
//! Races a connect timer against the push connection's lifecycle signals
//! and derives whether the list runs live or needs manual refresh.
//!
//! ```text
//!              established
//!  Connecting ─────────────► Live
//!      │ ▲                    │
//!      │ │ retry              │ error
//!      │ │                    ▼
//!      └─┴──── error/timeout ► Manual
//! ```
//!
//! Manual is left only through an explicit retry. An `established` signal
//! that arrives after Manual was reached is ignored; the connection was
//! already deemed failed for this activation.

use std::fmt;

/// Binary mode exposed to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Push events keep the list current.
    Live,
    /// Only user-triggered refresh updates the list.
    Manual,
}

/// States of the fallback detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Connecting,
    Live,
    Manual,
}

impl DetectorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorState::Connecting => "connecting",
            DetectorState::Live => "live",
            DetectorState::Manual => "manual",
        }
    }
}

impl fmt::Display for DetectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signals that drive the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Established,
    Error,
    Timeout,
    Retry,
}

/// An accepted state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DetectorState,
    pub to: DetectorState,
}

/// Three-state fallback detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDetector {
    state: DetectorState,
    notice_visible: bool,
}

impl Default for FallbackDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackDetector {
    /// Starts in `Connecting`, as on view activation.
    pub fn new() -> Self {
        FallbackDetector {
            state: DetectorState::Connecting,
            notice_visible: false,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Connecting counts as live until the race is decided.
    pub fn mode(&self) -> OperatingMode {
        match self.state {
            DetectorState::Manual => OperatingMode::Manual,
            DetectorState::Connecting | DetectorState::Live => OperatingMode::Live,
        }
    }

    pub fn is_manual(&self) -> bool {
        self.state == DetectorState::Manual
    }

    /// Whether the manual-mode notice should be shown.
    pub fn notice_visible(&self) -> bool {
        self.notice_visible
    }

    /// Hides the notice without leaving Manual.
    pub fn dismiss_notice(&mut self) {
        self.notice_visible = false;
    }

    pub fn on_established(&mut self) -> Option<Transition> {
        self.handle(Signal::Established)
    }

    pub fn on_error(&mut self) -> Option<Transition> {
        self.handle(Signal::Error)
    }

    pub fn on_timeout(&mut self) -> Option<Transition> {
        self.handle(Signal::Timeout)
    }

    /// User-triggered retry; only valid from Manual.
    pub fn retry(&mut self) -> Option<Transition> {
        self.handle(Signal::Retry)
    }

    /// Applies a signal. Returns `None` when the state does not change.
    pub fn handle(&mut self, signal: Signal) -> Option<Transition> {
        use DetectorState::*;

        let next = match (self.state, signal) {
            (Connecting, Signal::Established) => Live,
            (Connecting, Signal::Error) | (Connecting, Signal::Timeout) => Manual,
            (Live, Signal::Error) => Manual,
            (Manual, Signal::Retry) => Connecting,
            _ => return None,
        };

        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.state = next;
        match next {
            Manual => self.notice_visible = true,
            Live | Connecting => self.notice_visible = false,
        }
        Some(transition)
    }
}

#[cfg(test)]
#[path = "mode_tests.rs"]
mod tests;
