// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent client gateway.
//!
//! The hub reaches each segment host's agent over TCP at
//! `host:hub_to_agent_port`. Establishing the connection goes through an
//! injected [`Dialer`] and is always bounded by the configured dial timeout,
//! whatever the dialer itself does. Calls are single framed exchanges with no
//! retry; callers decide what an unreachable host means.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cu_core::Cluster;
use cu_wire::{AgentRequest, AgentResponse, CheckConversionStatusReply, ProtocolError, SegmentInfo};
use futures_util::future::join_all;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// Byte stream to one agent.
pub trait AgentStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> AgentStream for T {}

/// An established connection to one agent.
pub struct AgentConn {
    addr: String,
    stream: Box<dyn AgentStream>,
}

impl AgentConn {
    pub fn new(addr: impl Into<String>, stream: impl AgentStream + 'static) -> Self {
        Self { addr: addr.into(), stream: Box::new(stream) }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl std::fmt::Debug for AgentConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConn").field("addr", &self.addr).finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum DialError {
    #[error("dial {addr} timed out after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },

    #[error("dial {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Dial(#[from] DialError),

    #[error("agent {addr} returned error: {message}")]
    Remote { addr: String, message: String },

    #[error("agent {addr} protocol error: {source}")]
    Protocol {
        addr: String,
        #[source]
        source: ProtocolError,
    },
}

/// Connection factory for agent addresses.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, addr: &str) -> Result<AgentConn, DialError>;
}

/// Plain TCP dialer.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    timeout: Duration,
}

impl TcpDialer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, addr: &str) -> Result<AgentConn, DialError> {
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| DialError::Timeout { addr: addr.to_string(), timeout: self.timeout })?
            .map_err(|source| DialError::Connect { addr: addr.to_string(), source })?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(addr, error = %e, "failed to set TCP_NODELAY");
        }
        Ok(AgentConn::new(addr, stream))
    }
}

/// Gateway to every agent in a cluster.
#[derive(Clone)]
pub struct AgentGateway {
    dialer: Arc<dyn Dialer>,
    port: u16,
    dial_timeout: Duration,
    call_timeout: Duration,
}

impl AgentGateway {
    pub fn new(
        dialer: Arc<dyn Dialer>,
        port: u16,
        dial_timeout: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self { dialer, port, dial_timeout, call_timeout }
    }

    /// Gateway over [`TcpDialer`].
    pub fn tcp(port: u16, dial_timeout: Duration, call_timeout: Duration) -> Self {
        Self::new(Arc::new(TcpDialer::new(dial_timeout)), port, dial_timeout, call_timeout)
    }

    pub fn agent_addr(&self, host: &str) -> String {
        format!("{}:{}", host, self.port)
    }

    pub fn dial_timeout(&self) -> Duration {
        self.dial_timeout
    }

    /// Connect to the agent on `host`.
    ///
    /// Fails with [`DialError::Timeout`] once the dial timeout elapses; the
    /// pending dial is dropped.
    pub async fn connect(&self, host: &str) -> Result<AgentConn, DialError> {
        let addr = self.agent_addr(host);
        debug!(%addr, "dialing agent");
        match tokio::time::timeout(self.dial_timeout, self.dialer.dial(&addr)).await {
            Ok(result) => result,
            Err(_) => Err(DialError::Timeout { addr, timeout: self.dial_timeout }),
        }
    }

    /// One conversion-status exchange on an established connection.
    pub async fn check_conversion_status(
        &self,
        conn: &mut AgentConn,
        request: &AgentRequest,
    ) -> Result<CheckConversionStatusReply, GatewayError> {
        let exchange = cu_wire::call(&mut conn.stream, request, self.call_timeout);
        let response: AgentResponse = tokio::time::timeout(self.call_timeout, exchange)
            .await
            .unwrap_or(Err(ProtocolError::Timeout))
            .map_err(|source| GatewayError::Protocol { addr: conn.addr.clone(), source })?;

        match response {
            AgentResponse::ConversionStatus { reply } => Ok(reply),
            AgentResponse::Error { message } => {
                Err(GatewayError::Remote { addr: conn.addr.clone(), message })
            }
        }
    }

    /// Dial `host` and ask about the primaries `cluster` places there.
    pub async fn host_conversion_status(
        &self,
        cluster: &Cluster,
        host: &str,
    ) -> Result<CheckConversionStatusReply, GatewayError> {
        let request = AgentRequest::CheckConversionStatus {
            hostname: host.to_string(),
            segments: cluster.primaries_on(host).map(SegmentInfo::from).collect(),
        };
        let mut conn = self.connect(host).await?;
        self.check_conversion_status(&mut conn, &request).await
    }

    /// Ask every segment host concurrently. Results follow
    /// [`Cluster::segment_hosts`] order.
    pub async fn conversion_status_for_cluster(
        &self,
        cluster: &Cluster,
    ) -> Vec<(String, Result<CheckConversionStatusReply, GatewayError>)> {
        let hosts = cluster.segment_hosts();
        let results =
            join_all(hosts.iter().map(|host| self.host_conversion_status(cluster, host))).await;
        hosts.into_iter().zip(results).collect()
    }
}

impl std::fmt::Debug for AgentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGateway")
            .field("port", &self.port)
            .field("dial_timeout", &self.dial_timeout)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
