// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step and conversion status types for the IPC protocol.

use cu_core::{StepCode, StepStatus};
use serde::{Deserialize, Serialize};

use super::SegmentConversionStatus;

/// Status query payload. Carries no fields today; kept as a type so clients
/// may send `{}` as well as nothing at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpgradeRequest {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UpgradeStepStatus {
    pub step: StepCode,
    pub status: StepStatus,
}

/// Status of every registered step. Entries are unique per step; their order
/// carries no meaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpgradeReply {
    pub list_of_upgrade_step_statuses: Vec<UpgradeStepStatus>,
}

impl StatusUpgradeReply {
    /// Status reported for `step`, if the step is in the reply.
    pub fn status_of(&self, step: StepCode) -> Option<StepStatus> {
        self.list_of_upgrade_step_statuses.iter().find(|s| s.step == step).map(|s| s.status)
    }
}

/// Conversion status reported by (or on behalf of) one segment host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConversionStatus {
    pub hostname: String,
    #[serde(default)]
    pub segments: Vec<SegmentConversionStatus>,
    /// Why the host could not be asked (dial failure, agent error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
