// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hub: cluster topologies, the checklist and the status RPC handlers.

use std::sync::Arc;

use cu_core::{Checklist, Cluster};
use cu_wire::{HostConversionStatus, StatusUpgradeReply, StatusUpgradeRequest};
use tracing::{debug, warn};

use crate::config::HubConfig;
use crate::gateway::{AgentGateway, Dialer};
use crate::status::{GlobSideChannel, SideChannel, StatusAggregator};

pub struct Hub {
    source: Arc<Cluster>,
    target: Arc<Cluster>,
    checklist: Arc<Checklist>,
    gateway: AgentGateway,
    aggregator: StatusAggregator,
    config: HubConfig,
}

impl Hub {
    /// Assemble a hub. Agent connections go through `dialer`; the side
    /// channel probes the state directory.
    pub fn new(
        source: Cluster,
        target: Cluster,
        dialer: Arc<dyn Dialer>,
        config: HubConfig,
        checklist: Arc<Checklist>,
    ) -> Self {
        let source = Arc::new(source);
        let gateway = AgentGateway::new(
            dialer,
            config.hub_to_agent_port,
            config.dial_timeout,
            config.call_timeout,
        );
        let side_channel = Arc::new(GlobSideChannel::new(&config.state_dir));
        let aggregator = StatusAggregator::new(gateway.clone(), side_channel, Arc::clone(&source));
        Self { source, target: Arc::new(target), checklist, gateway, aggregator, config }
    }

    pub fn with_side_channel(self, side_channel: Arc<dyn SideChannel>) -> Self {
        Self { aggregator: self.aggregator.clone().with_side_channel(side_channel), ..self }
    }

    /// Status of every upgrade step.
    ///
    /// The request carries no fields; an absent request is treated the same
    /// as an empty one.
    pub async fn status_upgrade(&self, request: Option<&StatusUpgradeRequest>) -> StatusUpgradeReply {
        debug!(has_request = request.is_some(), "status upgrade query");
        StatusUpgradeReply {
            list_of_upgrade_step_statuses: self.aggregator.build_report(&self.checklist).await,
        }
    }

    /// Conversion status of every segment host, as reported by its agent.
    pub async fn status_conversion(&self) -> Vec<HostConversionStatus> {
        self.gateway
            .conversion_status_for_cluster(&self.source)
            .await
            .into_iter()
            .map(|(hostname, result)| match result {
                Ok(reply) => HostConversionStatus { hostname, segments: reply.statuses, error: None },
                Err(e) => {
                    warn!(host = %hostname, error = %e, "agent conversion status unavailable");
                    HostConversionStatus { hostname, segments: Vec::new(), error: Some(e.to_string()) }
                }
            })
            .collect()
    }

    pub fn source(&self) -> &Cluster {
        &self.source
    }

    pub fn target(&self) -> &Cluster {
        &self.target
    }

    pub fn checklist(&self) -> &Arc<Checklist> {
        &self.checklist
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
