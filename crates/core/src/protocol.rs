// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel protocol.
//!
//! The catalog backend publishes changes on a namespaced event stream
//! carried over WebSocket text frames (Engine.IO v4 framing with
//! Socket.IO v5 packets inside):
//!
//! ```text
//! server  0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! client  40/objects,                                             join namespace
//! server  40/objects,{"sid":".."}                                 joined
//! server  44/objects,{"message":".."}                             rejected
//! server  2            client  3                                  heartbeat
//! server  42/objects,["objects.created",{..item..}]
//! server  42/objects,["objects.deleted",{"id":".."}]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::item::{CatalogItem, ItemId};

/// Namespace the catalog publishes on.
pub const DEFAULT_NAMESPACE: &str = "/objects";

/// Event name for item creation.
pub const EVENT_CREATED: &str = "objects.created";

/// Event name for item deletion.
pub const EVENT_DELETED: &str = "objects.deleted";

/// Session parameters sent by the server when the socket opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Server heartbeat interval (milliseconds).
    pub ping_interval: u64,
    /// Time the server waits for a pong (milliseconds).
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// One text frame on the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace join request (client) or acceptance (server, with sid).
    Connect {
        namespace: String,
        sid: Option<String>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        name: String,
        payload: Value,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

impl Packet {
    /// Creates the namespace join request a client sends after open.
    pub fn join(namespace: impl Into<String>) -> Self {
        Packet::Connect {
            namespace: namespace.into(),
            sid: None,
        }
    }

    /// Namespace the packet is addressed to, if it is a namespaced packet.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Packet::Connect { namespace, .. }
            | Packet::Disconnect { namespace }
            | Packet::Event { namespace, .. }
            | Packet::ConnectError { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    /// Encodes the packet as a text frame.
    pub fn encode(&self) -> Result<String> {
        let frame = match self {
            Packet::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            Packet::Close => "1".to_string(),
            Packet::Ping => "2".to_string(),
            Packet::Pong => "3".to_string(),
            Packet::Noop => "6".to_string(),
            Packet::Connect { namespace, sid } => {
                let body = match sid {
                    Some(sid) => serde_json::json!({ "sid": sid }).to_string(),
                    None => String::new(),
                };
                format!("40{}{}", namespace_prefix(namespace), body)
            }
            Packet::Disconnect { namespace } => format!("41{}", namespace_prefix(namespace)),
            Packet::Event {
                namespace,
                name,
                payload,
            } => {
                let body = serde_json::to_string(&Value::Array(vec![
                    Value::String(name.clone()),
                    payload.clone(),
                ]))?;
                format!("42{}{}", namespace_prefix(namespace), body)
            }
            Packet::ConnectError { namespace, message } => {
                let body = serde_json::json!({ "message": message }).to_string();
                format!("44{}{}", namespace_prefix(namespace), body)
            }
        };
        Ok(frame)
    }

    /// Decodes a text frame.
    pub fn decode(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| Error::MalformedPacket("empty frame".to_string()))?;
        let rest = chars.as_str();

        match kind {
            '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '6' => Ok(Packet::Noop),
            '4' => decode_message(rest),
            other => Err(Error::UnknownPacketType(other)),
        }
    }
}

/// `/ns,` for non-root namespaces; the root namespace is implicit.
fn namespace_prefix(namespace: &str) -> String {
    if namespace == "/" || namespace.is_empty() {
        String::new()
    } else {
        format!("{namespace},")
    }
}

/// Decodes the Socket.IO packet carried inside an Engine.IO message.
fn decode_message(body: &str) -> Result<Packet> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::MalformedPacket("empty message".to_string()))?;
    let rest = chars.as_str();

    let (namespace, rest) = match rest.strip_prefix('/') {
        Some(_) => match rest.find(',') {
            Some(comma) => (rest[..comma].to_string(), &rest[comma + 1..]),
            None => (rest.to_string(), ""),
        },
        None => ("/".to_string(), rest),
    };
    // Optional ack id before the payload
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());

    match kind {
        '0' => {
            let sid = if rest.is_empty() {
                None
            } else {
                let value: Value = serde_json::from_str(rest)?;
                value.get("sid").and_then(Value::as_str).map(str::to_string)
            };
            Ok(Packet::Connect { namespace, sid })
        }
        '1' => Ok(Packet::Disconnect { namespace }),
        '2' => {
            let value: Value = serde_json::from_str(rest)?;
            let mut args = match value {
                Value::Array(args) => args.into_iter(),
                _ => {
                    return Err(Error::MalformedPacket(
                        "event payload is not an array".to_string(),
                    ))
                }
            };
            let name = match args.next() {
                Some(Value::String(name)) => name,
                _ => {
                    return Err(Error::MalformedPacket(
                        "event name missing".to_string(),
                    ))
                }
            };
            let payload = args.next().unwrap_or(Value::Null);
            Ok(Packet::Event {
                namespace,
                name,
                payload,
            })
        }
        '4' => {
            let message = if rest.is_empty() {
                String::new()
            } else {
                match serde_json::from_str::<Value>(rest)? {
                    Value::String(message) => message,
                    value => value
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                }
            };
            Ok(Packet::ConnectError { namespace, message })
        }
        other => Err(Error::UnknownPacketType(other)),
    }
}

#[derive(Deserialize)]
struct DeletedPayload {
    id: ItemId,
}

/// A catalog change published on the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Created(CatalogItem),
    Deleted { id: ItemId },
}

impl PushEvent {
    /// Interprets a named event payload.
    pub fn from_event(name: &str, payload: Value) -> Result<Self> {
        match name {
            EVENT_CREATED => Ok(PushEvent::Created(serde_json::from_value(payload)?)),
            EVENT_DELETED => {
                let deleted: DeletedPayload = serde_json::from_value(payload)?;
                Ok(PushEvent::Deleted { id: deleted.id })
            }
            other => Err(Error::UnknownEvent(other.to_string())),
        }
    }

    /// Wraps the event in a packet for `namespace`.
    pub fn to_packet(&self, namespace: &str) -> Result<Packet> {
        let (name, payload) = match self {
            PushEvent::Created(item) => (EVENT_CREATED, serde_json::to_value(item)?),
            PushEvent::Deleted { id } => (EVENT_DELETED, serde_json::json!({ "id": id })),
        };
        Ok(Packet::Event {
            namespace: namespace.to_string(),
            name: name.to_string(),
            payload,
        })
    }
}

/// Kinds of signals a push connection delivers to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Established,
    Error,
    ItemCreated,
    ItemDeleted,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Established,
        EventKind::Error,
        EventKind::ItemCreated,
        EventKind::ItemDeleted,
    ];
}

/// A lifecycle signal or catalog change delivered by a push connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Established,
    Error(String),
    ItemCreated(CatalogItem),
    ItemDeleted(ItemId),
}

impl ChannelEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChannelEvent::Established => EventKind::Established,
            ChannelEvent::Error(_) => EventKind::Error,
            ChannelEvent::ItemCreated(_) => EventKind::ItemCreated,
            ChannelEvent::ItemDeleted(_) => EventKind::ItemDeleted,
        }
    }
}

impl From<PushEvent> for ChannelEvent {
    fn from(event: PushEvent) -> Self {
        match event {
            PushEvent::Created(item) => ChannelEvent::ItemCreated(item),
            PushEvent::Deleted { id } => ChannelEvent::ItemDeleted(id),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
