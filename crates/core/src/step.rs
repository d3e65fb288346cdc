// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upgrade step identifiers and the step status enum.
//!
//! Both enums travel on the wire as their stable numeric value, so the
//! discriminants below must never be renumbered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire code of an upgrade step, in checklist order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StepCode {
    Config = 0,
    InitCluster = 1,
    Seginstall = 2,
    ShutdownClusters = 3,
    ConvertMaster = 4,
    StartAgents = 5,
    ShareOids = 6,
    ValidateStartCluster = 7,
    ConvertPrimaries = 8,
    ReconfigurePorts = 9,
}

/// A numeric step code outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown step code: {0}")]
pub struct UnknownStepCode(pub u8);

impl StepCode {
    /// Every step of an upgrade, in the order the workflow executes them.
    pub const ALL: [StepCode; 10] = [
        StepCode::Config,
        StepCode::InitCluster,
        StepCode::Seginstall,
        StepCode::ShutdownClusters,
        StepCode::ConvertMaster,
        StepCode::StartAgents,
        StepCode::ShareOids,
        StepCode::ValidateStartCluster,
        StepCode::ConvertPrimaries,
        StepCode::ReconfigurePorts,
    ];

    /// Stable step name. Also the name of the step's state directory.
    pub fn name(self) -> &'static str {
        match self {
            StepCode::Config => "CONFIG",
            StepCode::InitCluster => "INIT_CLUSTER",
            StepCode::Seginstall => "SEGINSTALL",
            StepCode::ShutdownClusters => "SHUTDOWN_CLUSTERS",
            StepCode::ConvertMaster => "CONVERT_MASTER",
            StepCode::StartAgents => "START_AGENTS",
            StepCode::ShareOids => "SHARE_OIDS",
            StepCode::ValidateStartCluster => "VALIDATE_START_CLUSTER",
            StepCode::ConvertPrimaries => "CONVERT_PRIMARIES",
            StepCode::ReconfigurePorts => "RECONFIGURE_PORTS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.name() == name)
    }
}

crate::wire_enum!(StepCode, UnknownStepCode);

impl std::fmt::Display for StepCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Status of a single upgrade step.
///
/// `Pending` is both the initial state and the status of a step with no
/// persisted marker. `Complete` and `Failed` are terminal for an attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StepStatus {
    #[default]
    Pending = 0,
    Running = 1,
    Complete = 2,
    Failed = 3,
}

/// A numeric step status outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown step status: {0}")]
pub struct UnknownStepStatus(pub u8);

impl StepStatus {
    pub const ALL: [StepStatus; 4] =
        [StepStatus::Pending, StepStatus::Running, StepStatus::Complete, StepStatus::Failed];

    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Complete | StepStatus::Failed)
    }

    /// Parse the payload of an on-disk status marker.
    pub fn parse_marker(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.to_string() == s)
    }
}

crate::wire_enum!(StepStatus, UnknownStepStatus);

crate::simple_display! {
    StepStatus {
        Pending => "pending",
        Running => "running",
        Complete => "complete",
        Failed => "failed",
    }
}

/// One checklist entry: the step's directory name and its wire code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
    pub name: String,
    pub code: StepCode,
}

impl StepDef {
    pub fn new(name: impl Into<String>, code: StepCode) -> Self {
        Self { name: name.into(), code }
    }

    /// The fixed step sequence of a major-version upgrade.
    pub fn upgrade_sequence() -> Vec<StepDef> {
        StepCode::ALL.into_iter().map(StepDef::from).collect()
    }
}

impl From<StepCode> for StepDef {
    fn from(code: StepCode) -> Self {
        Self::new(code.name(), code)
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
