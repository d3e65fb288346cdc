// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step status inference policy.

use std::path::PathBuf;

use cu_core::{StepCode, StepStatus};
use cu_wire::CheckConversionStatusReply;
use tracing::debug;

/// Agent pid markers left under the state directory by agent startup.
pub const AGENTS_STARTED_PATTERN: &str = "agents/*.started";

/// How the reported status of a step is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Persisted status, verbatim.
    Registry,
    /// Persisted status; files matching `pattern` are probed for diagnostics only.
    RegistryWithSideChannel { pattern: &'static str },
    /// Persisted status, refined by asking segment agents while it is running.
    RegistryWithAgents,
}

impl StatusPolicy {
    pub fn for_step(code: StepCode) -> Self {
        match code {
            StepCode::StartAgents => {
                StatusPolicy::RegistryWithSideChannel { pattern: AGENTS_STARTED_PATTERN }
            }
            StepCode::ConvertPrimaries => StatusPolicy::RegistryWithAgents,
            _ => StatusPolicy::Registry,
        }
    }
}

/// One segment host's answer to a conversion-status query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAnswer {
    /// `(content_id, dbid)` of every primary the host was asked about.
    pub expected: Vec<(i32, i32)>,
    /// `None` when the host could not be asked.
    pub reply: Option<CheckConversionStatusReply>,
}

impl HostAnswer {
    /// Every expected primary is listed in the reply as complete.
    fn confirms_complete(&self) -> bool {
        let Some(reply) = &self.reply else {
            return false;
        };
        !self.expected.is_empty()
            && self.expected.iter().all(|&(content_id, dbid)| {
                reply.statuses.iter().any(|s| {
                    s.content_id == content_id && s.dbid == dbid && s.status == StepStatus::Complete
                })
            })
    }
}

/// Fold per-host agent answers into one step status.
///
/// Any failed segment fails the step. The step is complete only when every
/// host answered and listed each of its expected primaries as complete;
/// otherwise the persisted status stands.
pub fn fold_host_statuses(persisted: StepStatus, hosts: &[HostAnswer]) -> StepStatus {
    let failed = hosts
        .iter()
        .filter_map(|host| host.reply.as_ref())
        .flat_map(|reply| reply.statuses.iter())
        .any(|s| s.status == StepStatus::Failed);
    if failed {
        return StepStatus::Failed;
    }
    if !hosts.is_empty() && hosts.iter().all(HostAnswer::confirms_complete) {
        return StepStatus::Complete;
    }
    persisted
}

/// Compare side-channel evidence with the persisted status.
///
/// The persisted status is returned unchanged; disagreement is only logged.
pub fn resolve_side_channel(
    step: StepCode,
    persisted: StepStatus,
    matches: &[PathBuf],
) -> StepStatus {
    let disagrees = match persisted {
        StepStatus::Pending => !matches.is_empty(),
        StepStatus::Complete => matches.is_empty(),
        StepStatus::Running | StepStatus::Failed => false,
    };
    if disagrees {
        debug!(%step, %persisted, matches = matches.len(), "side channel disagrees with registry");
    }
    persisted
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
