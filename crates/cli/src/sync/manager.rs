// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide push connection management.
//!
//! The [`ConnectionManager`] owns at most one live push connection. Every
//! caller of [`ConnectionManager::activate`] gets a clone of the same
//! [`ConnectionHandle`] until [`ConnectionManager::reset`] discards it.
//! Creation is guarded by a per-generation `OnceCell`, so concurrent
//! activations while one is in flight all resolve to the same handle.
//!
//! Each handle is backed by a driver task that opens the socket, joins the
//! namespace, answers heartbeats, and dispatches decoded events to the
//! handle's [`Registry`]. The driver never reconnects: a failed or timed
//! out connect raises `Error` once, and so does a later loss of an
//! established connection. A reset closes the discarded connection and
//! raises `Error` to whoever is still subscribed to it, so no view stays
//! live on a dead socket.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ocat_core::{ChannelEvent, EventKind, Packet, PushEvent};

use super::registry::{Handler, Registry, SubscriptionId};
use super::transport::{
    Transport, TransportError, TransportFactory, TransportResult, WebSocketFactory,
};
use crate::config::PushTarget;

/// Link status values for the atomic status field.
const STATUS_PENDING: u8 = 0;
const STATUS_ESTABLISHED: u8 = 1;
const STATUS_FAILED: u8 = 2;
const STATUS_CLOSED: u8 = 3;

/// Reason delivered to subscribers of a connection discarded by a reset.
const CLOSED_BY_RESET: &str = "connection reset";

/// Observable state of one push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Connect or namespace join still in progress.
    Pending,
    /// Namespace joined; events are flowing.
    Established,
    /// Connect failed, timed out, or the connection was lost.
    Failed,
    /// Closed locally by a reset.
    Closed,
}

impl LinkStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            STATUS_ESTABLISHED => LinkStatus::Established,
            STATUS_FAILED => LinkStatus::Failed,
            STATUS_CLOSED => LinkStatus::Closed,
            _ => LinkStatus::Pending,
        }
    }
}

struct Link {
    generation: u64,
    status: AtomicU8,
    registry: Registry,
    cancel: CancellationToken,
}

impl Link {
    fn status(&self) -> LinkStatus {
        LinkStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    fn establish(&self) {
        if self
            .status
            .compare_exchange(
                STATUS_PENDING,
                STATUS_ESTABLISHED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            info!(generation = self.generation, "push connection established");
            self.registry.dispatch(&ChannelEvent::Established);
        }
    }

    /// Marks the link failed and raises `Error`, at most once per link.
    fn fail(&self, reason: String) {
        let live =
            |s: u8| matches!(s, STATUS_PENDING | STATUS_ESTABLISHED).then_some(STATUS_FAILED);
        if self
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, live)
            .is_err()
        {
            return;
        }
        warn!(generation = self.generation, %reason, "push connection failed");
        self.registry.dispatch(&ChannelEvent::Error(reason));
    }
}

/// Shared handle to the single live push connection.
///
/// Cloning is cheap; all clones observe the same status and registry.
#[derive(Clone)]
pub struct ConnectionHandle {
    link: Arc<Link>,
}

impl ConnectionHandle {
    /// Sequence number of the connection this handle refers to.
    pub fn generation(&self) -> u64 {
        self.link.generation
    }

    pub fn status(&self) -> LinkStatus {
        self.link.status()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == LinkStatus::Established
    }

    pub fn subscribe(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        self.link.registry.subscribe(kind, handler)
    }

    /// Removes every handler registered for `kind`.
    pub fn unsubscribe(&self, kind: EventKind) -> usize {
        self.link.registry.unsubscribe(kind)
    }

    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        self.link.registry.unsubscribe_id(id)
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.link.registry.handler_count(kind)
    }

    /// True if both handles refer to the same connection.
    pub fn ptr_eq(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.link, &other.link)
    }

    /// Stops the driver task.
    ///
    /// If the link was still pending or established, handles that remain
    /// subscribed receive one `Error`.
    pub(crate) fn close(&self) {
        let live =
            |s: u8| matches!(s, STATUS_PENDING | STATUS_ESTABLISHED).then_some(STATUS_CLOSED);
        let was_live = self
            .link
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, live)
            .is_ok();
        self.link.cancel.cancel();

        if was_live {
            let remaining = self.link.registry.handler_count(EventKind::Error);
            debug!(generation = self.link.generation, remaining, "push connection closed");
            if remaining > 0 {
                self.link
                    .registry
                    .dispatch(&ChannelEvent::Error(CLOSED_BY_RESET.to_string()));
            }
        }
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("generation", &self.link.generation)
            .field("status", &self.status())
            .field("registry", &self.link.registry)
            .finish()
    }
}

type Slot = Option<Arc<OnceCell<ConnectionHandle>>>;

/// Owns the process-wide push connection.
pub struct ConnectionManager<F: TransportFactory = WebSocketFactory> {
    target: PushTarget,
    factory: Arc<F>,
    slot: Mutex<Slot>,
    generation: AtomicU64,
}

impl ConnectionManager<WebSocketFactory> {
    /// Manager connecting over real WebSockets.
    pub fn new(target: PushTarget) -> Self {
        Self::with_factory(target, WebSocketFactory)
    }
}

impl<F: TransportFactory> ConnectionManager<F> {
    /// Manager using `factory` to build each connection's transport.
    pub fn with_factory(target: PushTarget, factory: F) -> Self {
        ConnectionManager {
            target,
            factory: Arc::new(factory),
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn target(&self) -> &PushTarget {
        &self.target
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the shared handle, opening a connection only if none exists.
    pub async fn activate(&self) -> ConnectionHandle {
        let cell = {
            let mut slot = self.lock_slot();
            Arc::clone(slot.get_or_insert_with(|| Arc::new(OnceCell::new())))
        };
        cell.get_or_init(|| async { self.open() }).await.clone()
    }

    /// The current handle, if one has been created.
    pub fn current(&self) -> Option<ConnectionHandle> {
        self.lock_slot()
            .as_ref()
            .and_then(|cell| cell.get().cloned())
    }

    /// Discards the current handle so the next `activate` opens a new one.
    ///
    /// Idempotent. The discarded connection is closed, and anyone still
    /// subscribed to it receives `Error`.
    pub fn reset(&self) {
        let previous = self.lock_slot().take();
        if let Some(handle) = previous.as_ref().and_then(|cell| cell.get()) {
            debug!(generation = handle.generation(), "resetting push connection");
            handle.close();
        }
    }

    fn open(&self) -> ConnectionHandle {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let link = Arc::new(Link {
            generation,
            status: AtomicU8::new(STATUS_PENDING),
            registry: Registry::new(),
            cancel: CancellationToken::new(),
        });

        info!(generation, url = %self.target.url, namespace = %self.target.namespace, "opening push connection");
        let transport = self.factory.create();
        tokio::spawn(drive(transport, self.target.clone(), Arc::clone(&link)));

        ConnectionHandle { link }
    }
}

impl<F: TransportFactory> Drop for ConnectionManager<F> {
    fn drop(&mut self) {
        self.reset();
    }
}

/// Driver task for one connection.
async fn drive<T: Transport>(mut transport: T, target: PushTarget, link: Arc<Link>) {
    let cancel = link.cancel.clone();

    let opened = tokio::select! {
        _ = cancel.cancelled() => None,
        res = tokio::time::timeout(target.connect_timeout, open_namespace(&mut transport, &target)) => Some(res),
    };

    match opened {
        None => {
            let _ = transport.close().await;
            return;
        }
        Some(Ok(Ok(()))) => link.establish(),
        Some(Ok(Err(e))) => {
            link.fail(e.to_string());
            let _ = transport.close().await;
            return;
        }
        Some(Err(_)) => {
            link.fail(format!(
                "connect timed out after {} ms",
                target.connect_timeout.as_millis()
            ));
            let _ = transport.close().await;
            return;
        }
    }

    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => break,
            res = transport.recv() => res,
        };

        let outcome = match received {
            Ok(Some(packet)) => handle_packet(&mut transport, &target.namespace, &link, packet).await,
            Ok(None) => Err(TransportError::ConnectionClosed),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            link.fail(e.to_string());
            break;
        }
    }

    let _ = transport.close().await;
    debug!(generation = link.generation, "push driver stopped");
}

/// Waits for the engine open, joins the namespace, and waits for the ack.
async fn open_namespace<T: Transport>(transport: &mut T, target: &PushTarget) -> TransportResult<()> {
    transport.connect(&target.url).await?;

    loop {
        match transport.recv().await? {
            Some(Packet::Open(handshake)) => {
                debug!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "engine open");
                break;
            }
            Some(Packet::Ping) => transport.send(Packet::Pong).await?,
            Some(Packet::Close) | None => return Err(TransportError::ConnectionClosed),
            Some(other) => debug!(?other, "ignoring packet before open"),
        }
    }

    transport.send(Packet::join(target.namespace.clone())).await?;

    loop {
        match transport.recv().await? {
            Some(Packet::Connect { namespace, sid }) if namespace == target.namespace => {
                debug!(%namespace, ?sid, "namespace joined");
                return Ok(());
            }
            Some(Packet::ConnectError { namespace, message }) if namespace == target.namespace => {
                return Err(TransportError::Rejected(message));
            }
            Some(Packet::Ping) => transport.send(Packet::Pong).await?,
            Some(Packet::Close) | None => return Err(TransportError::ConnectionClosed),
            Some(other) => debug!(?other, "ignoring packet before namespace ack"),
        }
    }
}

async fn handle_packet<T: Transport>(
    transport: &mut T,
    namespace: &str,
    link: &Link,
    packet: Packet,
) -> TransportResult<()> {
    match packet {
        Packet::Ping => transport.send(Packet::Pong).await,
        Packet::Event {
            namespace: ns,
            name,
            payload,
        } if ns == namespace => {
            match PushEvent::from_event(&name, payload) {
                Ok(event) => {
                    debug!(event = %name, "push event");
                    link.registry.dispatch(&ChannelEvent::from(event));
                }
                Err(e) => warn!(event = %name, error = %e, "skipping push event"),
            }
            Ok(())
        }
        Packet::Close => Err(TransportError::ConnectionClosed),
        Packet::Disconnect { namespace: ns } if ns == namespace => {
            Err(TransportError::ConnectionClosed)
        }
        Packet::ConnectError { namespace: ns, message } if ns == namespace => {
            Err(TransportError::Rejected(message))
        }
        other => {
            debug!(?other, "ignoring packet");
            Ok(())
        }
    }
}
