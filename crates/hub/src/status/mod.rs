// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status report aggregation.
//!
//! A report carries one entry per registered step. The persisted marker is
//! the baseline for every entry; [`StatusPolicy`] decides whether a step also
//! consults the side channel or the segment agents.

mod policy;
mod side_channel;

pub use policy::{
    fold_host_statuses, resolve_side_channel, HostAnswer, StatusPolicy, AGENTS_STARTED_PATTERN,
};
pub use side_channel::{GlobSideChannel, SideChannel};

use std::sync::Arc;

use cu_core::{Checklist, Cluster, StepHandle, StepStatus};
use cu_wire::UpgradeStepStatus;
use tracing::warn;

use crate::gateway::AgentGateway;

/// Builds status reports from the checklist and live probes.
#[derive(Clone)]
pub struct StatusAggregator {
    gateway: AgentGateway,
    side_channel: Arc<dyn SideChannel>,
    source: Arc<Cluster>,
}

impl StatusAggregator {
    pub fn new(
        gateway: AgentGateway,
        side_channel: Arc<dyn SideChannel>,
        source: Arc<Cluster>,
    ) -> Self {
        Self { gateway, side_channel, source }
    }

    pub fn with_side_channel(self, side_channel: Arc<dyn SideChannel>) -> Self {
        Self { side_channel, ..self }
    }

    /// One entry per step in `checklist`. Never fails: unreadable markers
    /// report `Pending`, unreachable agents leave the persisted status.
    pub async fn build_report(&self, checklist: &Checklist) -> Vec<UpgradeStepStatus> {
        let mut report = Vec::with_capacity(checklist.len());
        for handle in checklist.all() {
            let status = self.step_status(&handle).await;
            report.push(UpgradeStepStatus { step: handle.code(), status });
        }
        report
    }

    async fn step_status(&self, handle: &Arc<StepHandle>) -> StepStatus {
        let persisted = read_persisted(handle).await;

        match StatusPolicy::for_step(handle.code()) {
            StatusPolicy::Registry => persisted,
            StatusPolicy::RegistryWithSideChannel { pattern } => {
                let matches = self.side_channel.glob(pattern);
                resolve_side_channel(handle.code(), persisted, &matches)
            }
            StatusPolicy::RegistryWithAgents => self.agent_status(persisted).await,
        }
    }

    async fn agent_status(&self, persisted: StepStatus) -> StepStatus {
        if persisted != StepStatus::Running {
            return persisted;
        }
        let hosts: Vec<_> = self
            .gateway
            .conversion_status_for_cluster(&self.source)
            .await
            .into_iter()
            .map(|(host, result)| {
                let expected =
                    self.source.primaries_on(&host).map(|seg| (seg.content_id, seg.dbid)).collect();
                let reply = match result {
                    Ok(reply) => Some(reply),
                    Err(e) => {
                        warn!(%host, error = %e, "agent conversion status unknown");
                        None
                    }
                };
                HostAnswer { expected, reply }
            })
            .collect();
        fold_host_statuses(persisted, &hosts)
    }
}

/// Read a step marker on the blocking pool; unreadable markers are `Pending`.
async fn read_persisted(handle: &Arc<StepHandle>) -> StepStatus {
    let reader = Arc::clone(handle);
    let result = match tokio::task::spawn_blocking(move || reader.status()).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    result.unwrap_or_else(|error| {
        warn!(step = handle.name(), %error, "unreadable step status, reporting pending");
        StepStatus::Pending
    })
}

impl std::fmt::Debug for StatusAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusAggregator").field("gateway", &self.gateway).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
