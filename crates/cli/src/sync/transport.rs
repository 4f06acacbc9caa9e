// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel transport.
//!
//! A [`Transport`] moves whole [`Packet`]s between the connection driver
//! and the catalog backend. The WebSocket implementation owns the text
//! framing: every text frame carries one packet, frames that fail to decode
//! are logged and skipped, and binary or WebSocket control frames are
//! ignored. A bad frame never ends the connection.
//!
//! The namespace handshake and event dispatch live in the connection
//! manager.

use std::future::Future;
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use ocat_core::Packet;

/// Longest frame excerpt written to the log.
const LOG_EXCERPT: usize = 120;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection closed")]
    ConnectionClosed,

    /// Namespace join refused by the server.
    #[error("connection rejected: {0}")]
    Rejected(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// An outgoing packet could not be encoded.
    #[error("could not encode packet: {0}")]
    Encode(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// One push connection, as seen by its driver task.
pub trait Transport: Send {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    fn send(&mut self, packet: Packet) -> TransportFuture<'_, ()>;

    /// Next packet from the server, or `None` once the server has closed.
    fn recv(&mut self) -> TransportFuture<'_, Option<Packet>>;

    /// Closes the connection. Closing twice is a no-op.
    fn close(&mut self) -> TransportFuture<'_, ()>;
}

/// Builds a fresh transport for each connection the manager opens.
pub trait TransportFactory: Send + Sync + 'static {
    type Transport: Transport + 'static;

    fn create(&self) -> Self::Transport;
}

/// What one WebSocket message means to the push channel.
#[derive(Debug, PartialEq)]
pub(crate) enum Frame {
    Packet(Packet),
    Closed,
    Skip,
}

/// Interprets one WebSocket message.
pub(crate) fn read_frame(message: Message) -> Frame {
    match message {
        Message::Text(text) => match Packet::decode(text.as_str()) {
            Ok(packet) => Frame::Packet(packet),
            Err(e) => {
                let excerpt: String = text.as_str().chars().take(LOG_EXCERPT).collect();
                warn!(frame = %excerpt, error = %e, "skipping undecodable frame");
                Frame::Skip
            }
        },
        Message::Close(frame) => {
            debug!(?frame, "server closed the socket");
            Frame::Closed
        }
        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Frame::Skip,
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`Transport`] over a tokio-tungstenite WebSocket.
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<Socket>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport { socket: None }
    }
}

/// Factory producing [`WebSocketTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketFactory;

impl TransportFactory for WebSocketFactory {
    type Transport = WebSocketTransport;

    fn create(&self) -> WebSocketTransport {
        WebSocketTransport::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let (socket, response) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            debug!(%url, status = %response.status(), "socket open");
            self.socket = Some(socket);
            Ok(())
        })
    }

    fn send(&mut self, packet: Packet) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let frame = packet
                .encode()
                .map_err(|e| TransportError::Encode(e.to_string()))?;
            let socket = self.socket.as_mut().ok_or(TransportError::ConnectionClosed)?;

            if let Err(e) = socket.send(Message::Text(frame.into())).await {
                self.socket = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<Packet>> {
        Box::pin(async move {
            loop {
                let socket = self.socket.as_mut().ok_or(TransportError::ConnectionClosed)?;
                let message = match socket.next().await {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        self.socket = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        self.socket = None;
                        return Ok(None);
                    }
                };

                match read_frame(message) {
                    Frame::Packet(packet) => return Ok(Some(packet)),
                    Frame::Closed => {
                        self.socket = None;
                        return Ok(None);
                    }
                    Frame::Skip => {}
                }
            }
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut socket) = self.socket.take() {
                let _ = socket.close(None).await;
            }
            Ok(())
        })
    }
}
