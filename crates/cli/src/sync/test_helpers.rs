// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tokio::sync::{mpsc, Notify};

use ocat_core::{CatalogItem, Handshake, ItemId, NewItem, Packet, PushEvent};

use super::transport::{Transport, TransportError, TransportFactory, TransportFuture};
use crate::api::{ApiError, ApiFuture, CatalogApi, UploadRequest, UploadTicket};

pub const NAMESPACE: &str = "/objects";

/// Item created `minute` minutes after a fixed epoch.
pub fn item(id: &str, minute: u32) -> CatalogItem {
    CatalogItem::new(
        id,
        format!("Item {id}"),
        "",
        format!("https://img.example/{id}.jpg"),
        Utc.with_ymd_and_hms(2026, 1, 1, 0, minute, 0).unwrap(),
    )
}

/// How a mock transport reacts to `connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerScript {
    /// Open the socket and accept the namespace join.
    Accept,
    /// Open the socket and refuse the namespace join.
    Reject(String),
    /// Fail the socket connect outright.
    Fail,
    /// Open the socket but never answer.
    Silent,
}

/// Server side of one mock connection.
#[derive(Clone)]
pub struct MockServer {
    to_client: Arc<Mutex<Option<mpsc::UnboundedSender<Packet>>>>,
    sent: Arc<Mutex<Vec<Packet>>>,
}

impl MockServer {
    pub fn push(&self, packet: Packet) {
        if let Some(tx) = self.to_client.lock().unwrap().as_ref() {
            let _ = tx.send(packet);
        }
    }

    pub fn emit(&self, event: PushEvent) {
        self.push(event.to_packet(NAMESPACE).unwrap());
    }

    /// Drops the server end; the client sees the stream close.
    pub fn close(&self) {
        self.to_client.lock().unwrap().take();
    }

    /// Packets the client has sent.
    pub fn sent(&self) -> Vec<Packet> {
        self.sent.lock().unwrap().clone()
    }
}

/// Transport backed by in-memory channels.
pub struct MockTransport {
    script: ServerScript,
    connected: bool,
    incoming: mpsc::UnboundedReceiver<Packet>,
    server: MockServer,
}

impl MockTransport {
    pub fn new(script: ServerScript) -> (Self, MockServer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let server = MockServer {
            to_client: Arc::new(Mutex::new(Some(tx))),
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        let transport = MockTransport {
            script,
            connected: false,
            incoming: rx,
            server: server.clone(),
        };
        (transport, server)
    }
}

/// Engine open packet a server sends right after the socket connects.
pub fn handshake() -> Packet {
    Packet::Open(Handshake {
        sid: "engine-sid".into(),
        upgrades: Vec::new(),
        ping_interval: 25000,
        ping_timeout: 20000,
        max_payload: None,
    })
}

impl Transport for MockTransport {
    fn connect(&mut self, _url: &str) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if self.script == ServerScript::Fail {
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            self.connected = true;
            if self.script != ServerScript::Silent {
                self.server.push(handshake());
            }
            Ok(())
        })
    }

    fn send(&mut self, packet: Packet) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            if let Packet::Connect { namespace, .. } = &packet {
                match &self.script {
                    ServerScript::Accept => self.server.push(Packet::Connect {
                        namespace: namespace.clone(),
                        sid: Some("ns-sid".into()),
                    }),
                    ServerScript::Reject(message) => self.server.push(Packet::ConnectError {
                        namespace: namespace.clone(),
                        message: message.clone(),
                    }),
                    ServerScript::Fail | ServerScript::Silent => {}
                }
            }
            self.server.sent.lock().unwrap().push(packet);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<Packet>> {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            let packet = self.incoming.recv().await;
            if packet.is_none() {
                self.connected = false;
            }
            Ok(packet)
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected = false;
            Ok(())
        })
    }
}

/// Factory handing out scripted mock transports and recording their servers.
#[derive(Clone)]
pub struct MockFactory {
    script: Arc<Mutex<ServerScript>>,
    created: Arc<AtomicUsize>,
    servers: Arc<Mutex<Vec<MockServer>>>,
}

impl MockFactory {
    pub fn new(script: ServerScript) -> Self {
        MockFactory {
            script: Arc::new(Mutex::new(script)),
            created: Arc::new(AtomicUsize::new(0)),
            servers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script used for transports created from now on.
    pub fn set_script(&self, script: ServerScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Server end of the `n`th transport created.
    pub fn server(&self, n: usize) -> MockServer {
        self.servers.lock().unwrap()[n].clone()
    }

    pub fn last_server(&self) -> MockServer {
        self.servers.lock().unwrap().last().cloned().unwrap()
    }
}

impl TransportFactory for MockFactory {
    type Transport = MockTransport;

    fn create(&self) -> MockTransport {
        self.created.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap().clone();
        let (transport, server) = MockTransport::new(script);
        self.servers.lock().unwrap().push(server);
        transport
    }
}

/// An image the mock storage received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub url: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// In-memory catalog backend.
#[derive(Clone, Default)]
pub struct MockApi {
    items: Arc<Mutex<Vec<CatalogItem>>>,
    fail_list: Arc<Mutex<Option<ApiError>>>,
    fail_delete: Arc<Mutex<Option<ApiError>>>,
    fail_upload: Arc<Mutex<Option<ApiError>>>,
    list_calls: Arc<AtomicUsize>,
    deleted: Arc<Mutex<HashSet<ItemId>>>,
    upload_requests: Arc<Mutex<Vec<UploadRequest>>>,
    uploads: Arc<Mutex<Vec<Upload>>>,
    list_gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl MockApi {
    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        let api = MockApi::default();
        *api.items.lock().unwrap() = items;
        api
    }

    pub fn set_items(&self, items: Vec<CatalogItem>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn fail_list(&self, error: Option<ApiError>) {
        *self.fail_list.lock().unwrap() = error;
    }

    pub fn fail_delete(&self, error: Option<ApiError>) {
        *self.fail_delete.lock().unwrap() = error;
    }

    pub fn fail_upload(&self, error: Option<ApiError>) {
        *self.fail_upload.lock().unwrap() = error;
    }

    /// Holds the next `list` responses until [`MockApi::release_list`].
    ///
    /// The response is the catalog as it was when the request arrived.
    pub fn hold_list(&self) {
        *self.list_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_list(&self) {
        if let Some(gate) = self.list_gate.lock().unwrap().take() {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    pub fn upload_requests(&self) -> Vec<UploadRequest> {
        self.upload_requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn was_deleted(&self, id: &str) -> bool {
        self.deleted.lock().unwrap().contains(&ItemId::from(id))
    }
}

impl CatalogApi for MockApi {
    fn list(&self) -> ApiFuture<'_, Vec<CatalogItem>> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let snapshot = self.items.lock().unwrap().clone();
            let gate = self.list_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if let Some(err) = self.fail_list.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(snapshot)
        })
    }

    fn get(&self, id: ItemId) -> ApiFuture<'_, CatalogItem> {
        Box::pin(async move {
            self.items
                .lock()
                .unwrap()
                .iter()
                .find(|item| item.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(id.to_string()))
        })
    }

    fn create(&self, new: NewItem) -> ApiFuture<'_, CatalogItem> {
        Box::pin(async move {
            let mut items = self.items.lock().unwrap();
            let created = CatalogItem::new(
                format!("new-{}", items.len()),
                new.title,
                new.description,
                new.image_url,
                Utc::now(),
            );
            items.push(created.clone());
            Ok(created)
        })
    }

    fn delete(&self, id: ItemId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            if let Some(err) = self.fail_delete.lock().unwrap().clone() {
                return Err(err);
            }
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|item| item.id != id);
            if items.len() == before {
                return Err(ApiError::NotFound(id.to_string()));
            }
            self.deleted.lock().unwrap().insert(id);
            Ok(())
        })
    }

    fn upload_url(&self, request: UploadRequest) -> ApiFuture<'_, UploadTicket> {
        Box::pin(async move {
            let key = format!("uploads/{}", request.filename);
            self.upload_requests.lock().unwrap().push(request);
            Ok(UploadTicket {
                upload_url: format!("https://storage.example/{key}?signature=mock"),
                public_url: format!("https://storage.example/{key}"),
                key,
            })
        })
    }

    fn upload(
        &self,
        upload_url: String,
        content_type: String,
        body: Vec<u8>,
    ) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            if let Some(err) = self.fail_upload.lock().unwrap().clone() {
                return Err(err);
            }
            self.uploads.lock().unwrap().push(Upload {
                url: upload_url,
                content_type,
                body,
            });
            Ok(())
        })
    }
}
