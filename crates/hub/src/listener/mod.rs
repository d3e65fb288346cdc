// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and handling
//! each one in its own task, so status queries never wait on each other or
//! on the workflow driving the checklist.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cu_wire::{self as wire, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::env::PROTOCOL_VERSION;
use crate::hub::Hub;

/// Shared hub context for all request handlers.
pub struct ListenCtx {
    pub hub: Arc<Hub>,
    pub start_time: Instant,
    /// Notified when a client requests shutdown
    pub shutdown: Arc<Notify>,
    /// Auth token for TCP connections (from `CU_AUTH_TOKEN`).
    /// When set, TCP clients must provide this token in the Hello handshake.
    pub auth_token: Option<String>,
}

impl ListenCtx {
    pub fn new(hub: Arc<Hub>, shutdown: Arc<Notify>) -> Self {
        let auth_token = hub.config().auth_token.clone();
        Self { hub, start_time: Instant::now(), shutdown, auth_token }
    }

    fn timeout(&self) -> Duration {
        self.hub.config().call_timeout
    }
}

/// Listener task for accepting socket connections.
pub struct Listener {
    unix: UnixListener,
    tcp: Option<TcpListener>,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Source of a connection (for auth decisions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionSource {
    /// Local Unix socket, trusted.
    Unix,
    /// Remote TCP, must open with a Hello handshake.
    Tcp,
}

impl Listener {
    /// Create a new listener with Unix socket only.
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp: None, ctx }
    }

    /// Create a new listener with both Unix socket and TCP.
    pub fn with_tcp(unix: UnixListener, tcp: TcpListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, tcp: Some(tcp), ctx }
    }

    /// Accept connections until `stop` is cancelled. In-flight connections
    /// keep running in their own tasks.
    pub async fn run(mut self, stop: CancellationToken) {
        match self.tcp.take() {
            Some(tcp) => self.run_dual(tcp, stop).await,
            None => self.run_unix_only(stop).await,
        }
        debug!("listener stopped");
    }

    async fn run_unix_only(self, stop: CancellationToken) {
        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let (reader, writer) = stream.into_split();
                        self.spawn_connection(reader, writer, ConnectionSource::Unix);
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
            }
        }
    }

    async fn run_dual(self, tcp: TcpListener, stop: CancellationToken) {
        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let (reader, writer) = stream.into_split();
                        self.spawn_connection(reader, writer, ConnectionSource::Unix);
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
                result = tcp.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!("TCP connection from {}", addr);
                        let (reader, writer) = stream.into_split();
                        self.spawn_connection(reader, writer, ConnectionSource::Tcp);
                    }
                    Err(e) => error!("TCP accept error: {}", e),
                },
            }
        }
    }

    fn spawn_connection<R, W>(&self, reader: R, writer: W, source: ConnectionSource)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(reader, writer, source, &ctx).await {
                log_connection_error(e);
            }
        });
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected")
        }
        ConnectionError::Protocol(ProtocolError::Timeout) => {
            warn!("Connection timeout")
        }
        _ => error!("Connection error: {}", e),
    }
}

/// Read one request, answering undecodable frames with an error response.
async fn read_request_or_reject<R, W>(
    reader: &mut R,
    writer: &mut W,
    timeout: Duration,
) -> Result<Option<Request>, ConnectionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match wire::read_request(reader, timeout).await {
        Ok(request) => Ok(Some(request)),
        Err(ProtocolError::Json(e)) => {
            let response = Response::Error { message: format!("invalid request: {e}") };
            wire::write_response(writer, &response, timeout).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Check a TCP client's opening request. Returns the rejection message on
/// failure.
fn authenticate(request: &Request, expected: Option<&str>) -> Result<(), String> {
    let Request::Hello { token, .. } = request else {
        return Err("TCP connections must start with Hello".to_string());
    };
    match expected {
        Some(expected) if token.as_deref() != Some(expected) => Err("unauthorized".to_string()),
        _ => Ok(()),
    }
}

/// Handle a single client connection.
///
/// Unix clients send one request. TCP clients first complete the Hello
/// handshake and then send one request on the same connection.
///
/// The handler is raced against client disconnect: if the client closes the
/// connection first, the handler is dropped mid-flight.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    source: ConnectionSource,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let timeout = ctx.timeout();
    let Some(mut request) = read_request_or_reject(&mut reader, &mut writer, timeout).await? else {
        return Ok(());
    };

    if source == ConnectionSource::Tcp {
        if let Err(message) = authenticate(&request, ctx.auth_token.as_deref()) {
            warn!(%message, "rejected TCP client");
            let _ = wire::write_response(&mut writer, &Response::Error { message }, timeout).await;
            return Ok(());
        }
        let hello = Response::Hello { version: PROTOCOL_VERSION.to_string() };
        wire::write_response(&mut writer, &hello, timeout).await?;

        request = match read_request_or_reject(&mut reader, &mut writer, timeout).await {
            Ok(Some(request)) => request,
            Ok(None) | Err(ConnectionError::Protocol(ProtocolError::ConnectionClosed)) => {
                return Ok(())
            }
            Err(e) => return Err(e),
        };
    }

    // Status queries are polled; keep them out of the info log
    if matches!(request, Request::StatusUpgrade { .. } | Request::StatusConversion) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = tokio::select! {
        response = handle_request(request, ctx) => response,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("Client disconnected, dropping handler");
            return Ok(());
        }
    };

    debug!("Sending response: {:?}", response);
    wire::write_response(&mut writer, &response, timeout).await?;
    Ok(())
}

/// Detect client disconnect by reading from the socket after the request.
///
/// The client sends one request then waits, so a read only completes on EOF.
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

/// Handle a single request and return a response.
async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        // Authenticated (TCP) or trusted (Unix) by the time it gets here.
        Request::Hello { .. } => Response::Hello { version: PROTOCOL_VERSION.to_string() },

        Request::StatusUpgrade { request } => {
            let reply = ctx.hub.status_upgrade(request.as_ref()).await;
            Response::StatusUpgrade { reply }
        }

        Request::StatusConversion => {
            Response::StatusConversion { hosts: ctx.hub.status_conversion().await }
        }

        Request::Shutdown => {
            info!(uptime_secs = ctx.start_time.elapsed().as_secs(), "shutdown requested");
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
