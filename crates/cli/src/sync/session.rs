// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! List session: one active list view and its connection race.
//!
//! On activation the session takes the shared connection from the
//! [`ConnectionManager`], subscribes its handlers, starts the fallback
//! timer, and loads the list. Every signal (connection lifecycle, push
//! events, timer expiry) is funneled through one channel and applied in
//! order by [`ListSession::next_event`], so the store and the detector are
//! only ever mutated from the session's own loop.
//!
//! Lifecycle signals carry the attempt they belong to; after a retry,
//! anything left over from the previous attempt is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ocat_core::{
    ChannelEvent, CollectionView, DetectorState, EventKind, FallbackDetector, ItemId,
    OperatingMode, Transition,
};

use super::manager::{ConnectionHandle, ConnectionManager, LinkStatus};
use super::registry::SubscriptionId;
use super::store::{ListStore, StoreError};
use super::transport::{TransportFactory, WebSocketFactory};
use crate::api::CatalogApi;

/// Outcome of processing one signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// The detector changed state.
    Mode(Transition),
    /// The list changed.
    View,
    /// Nothing visible changed.
    Unchanged,
}

#[derive(Debug)]
enum Signal {
    Channel(ChannelEvent),
    Timeout,
}

#[derive(Debug)]
struct Queued {
    attempt: u64,
    signal: Signal,
}

struct Attachment {
    handle: ConnectionHandle,
    subscriptions: Vec<SubscriptionId>,
}

pub struct ListSession<A: CatalogApi, F: TransportFactory = WebSocketFactory> {
    manager: Arc<ConnectionManager<F>>,
    store: ListStore<A>,
    detector: FallbackDetector,
    fallback_timeout: Duration,
    attempt: u64,
    tx: mpsc::UnboundedSender<Queued>,
    rx: mpsc::UnboundedReceiver<Queued>,
    attached: Option<Attachment>,
    timer: Option<CancellationToken>,
}

impl<A: CatalogApi, F: TransportFactory> ListSession<A, F> {
    pub fn new(manager: Arc<ConnectionManager<F>>, api: A, fallback_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        ListSession {
            manager,
            store: ListStore::new(api),
            detector: FallbackDetector::new(),
            fallback_timeout,
            attempt: 0,
            tx,
            rx,
            attached: None,
            timer: None,
        }
    }

    /// Starts the connection race and loads the list.
    ///
    /// Push events that arrive while the fetch is in flight stay queued and
    /// are merged on top of the fetched list.
    pub async fn activate(&mut self) -> Result<(), StoreError> {
        self.connect().await;
        self.store.load_all().await
    }

    async fn connect(&mut self) {
        self.attempt += 1;
        let attempt = self.attempt;
        let handle = self.manager.activate().await;

        let subscriptions = EventKind::ALL
            .iter()
            .map(|kind| {
                let tx = self.tx.clone();
                handle.subscribe(
                    *kind,
                    Arc::new(move |event: &ChannelEvent| {
                        let _ = tx.send(Queued {
                            attempt,
                            signal: Signal::Channel(event.clone()),
                        });
                    }),
                )
            })
            .collect();

        // A reused handle may have settled before we subscribed
        let settled = match handle.status() {
            LinkStatus::Pending => None,
            LinkStatus::Established => Some(ChannelEvent::Established),
            LinkStatus::Failed | LinkStatus::Closed => {
                Some(ChannelEvent::Error("connection unavailable".to_string()))
            }
        };
        if let Some(event) = settled {
            let _ = self.tx.send(Queued {
                attempt,
                signal: Signal::Channel(event),
            });
        }

        debug!(attempt, generation = handle.generation(), "session attached");
        self.attached = Some(Attachment {
            handle,
            subscriptions,
        });
        self.start_timer();
    }

    fn start_timer(&mut self) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let attempt = self.attempt;
        let delay = self.fallback_timeout;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(Queued { attempt, signal: Signal::Timeout });
                }
            }
        });

        if let Some(previous) = self.timer.replace(token) {
            previous.cancel();
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn detach(&mut self) {
        self.cancel_timer();
        if let Some(attachment) = self.attached.take() {
            for id in attachment.subscriptions {
                attachment.handle.unsubscribe_id(id);
            }
        }
    }

    /// Waits for the next signal and applies it.
    pub async fn next_event(&mut self) -> Option<Update> {
        let queued = self.rx.recv().await?;
        Some(self.process(queued))
    }

    /// Applies every signal already queued, without waiting.
    pub fn run_until_idle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(queued) = self.rx.try_recv() {
            updates.push(self.process(queued));
        }
        updates
    }

    fn process(&mut self, queued: Queued) -> Update {
        let current = queued.attempt == self.attempt;
        let transition = match queued.signal {
            Signal::Channel(
                event @ (ChannelEvent::ItemCreated(_) | ChannelEvent::ItemDeleted(_)),
            ) => {
                return view_update(self.store.apply(&event));
            }
            _ if !current => {
                debug!(attempt = queued.attempt, "dropping stale signal");
                return Update::Unchanged;
            }
            Signal::Channel(ChannelEvent::Established) => {
                self.cancel_timer();
                self.detector.on_established()
            }
            Signal::Channel(ChannelEvent::Error(reason)) => {
                self.cancel_timer();
                debug!(%reason, "connection error");
                self.detector.on_error()
            }
            Signal::Timeout => {
                self.timer = None;
                self.detector.on_timeout()
            }
        };

        match transition {
            Some(t) => {
                info!(from = %t.from, to = %t.to, "mode changed");
                Update::Mode(t)
            }
            None => Update::Unchanged,
        }
    }

    /// Re-fetches the list on demand.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.store.load_all().await
    }

    /// Discards the current connection and starts a new race.
    ///
    /// Only valid in manual mode; returns `None` otherwise.
    pub async fn retry(&mut self) -> Option<Transition> {
        let transition = self.detector.retry()?;
        info!("retrying push connection");
        self.detach();
        self.manager.reset();
        self.connect().await;
        Some(transition)
    }

    pub async fn delete(&mut self, id: &ItemId) -> Result<(), StoreError> {
        self.store.delete_local(id).await
    }

    /// Removes this session's handlers and stops its timer.
    ///
    /// The connection itself stays with the manager for the next view.
    pub fn teardown(&mut self) {
        self.detach();
    }

    pub fn mode(&self) -> OperatingMode {
        self.detector.mode()
    }

    pub fn state(&self) -> DetectorState {
        self.detector.state()
    }

    pub fn notice_visible(&self) -> bool {
        self.detector.notice_visible()
    }

    pub fn dismiss_notice(&mut self) {
        self.detector.dismiss_notice();
    }

    pub fn view(&self) -> &CollectionView {
        self.store.view()
    }

    pub fn store(&self) -> &ListStore<A> {
        &self.store
    }

    pub fn error(&self) -> Option<&StoreError> {
        self.store.error()
    }

    pub fn handle(&self) -> Option<&ConnectionHandle> {
        self.attached.as_ref().map(|a| &a.handle)
    }
}

impl<A: CatalogApi, F: TransportFactory> Drop for ListSession<A, F> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn view_update(changed: bool) -> Update {
    if changed {
        Update::View
    } else {
        Update::Unchanged
    }
}
