// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the hub crate: fault-injecting dialers, scripted
//! agents and a ready-made hub over a temp state directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cu_core::test_support::sample_cluster_pair;
use cu_core::{Checklist, StepStatus, StepStore};
use cu_wire::{
    read_frame, write_frame, AgentRequest, AgentResponse, CheckConversionStatusReply,
    SegmentConversionStatus,
};
use parking_lot::Mutex;

use crate::config::HubConfig;
use crate::gateway::{AgentConn, DialError, Dialer};
use crate::hub::Hub;
use crate::status::SideChannel;

/// Every dial is refused.
pub(crate) struct FailingDialer;

#[async_trait]
impl Dialer for FailingDialer {
    async fn dial(&self, addr: &str) -> Result<AgentConn, DialError> {
        Err(DialError::Connect {
            addr: addr.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        })
    }
}

/// Every dial hangs forever.
pub(crate) struct HangingDialer;

#[async_trait]
impl Dialer for HangingDialer {
    async fn dial(&self, _addr: &str) -> Result<AgentConn, DialError> {
        std::future::pending().await
    }
}

/// Answers each host with a canned response over an in-memory stream.
/// Hosts without a script refuse the dial.
#[derive(Default)]
pub(crate) struct ScriptedDialer {
    responses: HashMap<String, AgentResponse>,
    dialed: Mutex<Vec<String>>,
    requests: Arc<Mutex<Vec<AgentRequest>>>,
}

impl ScriptedDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, host: &str, response: AgentResponse) -> Self {
        self.responses.insert(host.to_string(), response);
        self
    }

    /// Addresses dialed so far, in order.
    pub fn dialed(&self) -> Vec<String> {
        self.dialed.lock().clone()
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Dialer for ScriptedDialer {
    async fn dial(&self, addr: &str) -> Result<AgentConn, DialError> {
        self.dialed.lock().push(addr.to_string());
        let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
        let Some(response) = self.responses.get(host).cloned() else {
            return FailingDialer.dial(addr).await;
        };

        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let requests = Arc::clone(&self.requests);
        tokio::spawn(async move {
            let timeout = Duration::from_secs(5);
            if let Ok(request) = read_frame::<AgentRequest, _>(&mut server, timeout).await {
                requests.lock().push(request);
                let _ = write_frame(&mut server, &response, timeout).await;
            }
        });
        Ok(AgentConn::new(addr, client))
    }
}

/// Side channel with a fixed set of matches.
pub(crate) struct StaticSideChannel(pub Vec<PathBuf>);

impl SideChannel for StaticSideChannel {
    fn glob(&self, _pattern: &str) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// Agent reply listing `(content_id, dbid, status)` triples.
pub(crate) fn conversion_reply(statuses: &[(i32, i32, StepStatus)]) -> AgentResponse {
    AgentResponse::ConversionStatus {
        reply: CheckConversionStatusReply {
            statuses: statuses
                .iter()
                .map(|&(content_id, dbid, status)| SegmentConversionStatus {
                    content_id,
                    dbid,
                    status,
                })
                .collect(),
        },
    }
}

/// Config with short timeouts rooted at `dir`.
pub(crate) fn test_config(dir: &Path) -> HubConfig {
    HubConfig {
        dial_timeout: Duration::from_millis(100),
        call_timeout: Duration::from_millis(500),
        ..HubConfig::new(6416, dir)
    }
}

/// Hub over the sample cluster pair with the full upgrade checklist.
pub(crate) fn test_hub(dir: &Path, dialer: Arc<dyn Dialer>) -> Hub {
    let (source, target) = sample_cluster_pair();
    let checklist = Checklist::upgrade(StepStore::new(dir)).unwrap();
    Hub::new(source, target, dialer, test_config(dir), Arc::new(checklist))
}
