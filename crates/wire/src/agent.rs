// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub-to-agent protocol.

use std::path::PathBuf;

use cu_core::{Segment, StepStatus};
use serde::{Deserialize, Serialize};

/// A primary segment the agent should report on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentInfo {
    pub content_id: i32,
    pub dbid: i32,
    pub data_dir: PathBuf,
}

impl From<&Segment> for SegmentInfo {
    fn from(seg: &Segment) -> Self {
        Self { content_id: seg.content_id, dbid: seg.dbid, data_dir: seg.data_dir.clone() }
    }
}

/// Request from the hub to an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AgentRequest {
    /// Report conversion progress of the listed primaries
    CheckConversionStatus { hostname: String, segments: Vec<SegmentInfo> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentConversionStatus {
    pub content_id: i32,
    pub dbid: i32,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckConversionStatusReply {
    pub statuses: Vec<SegmentConversionStatus>,
}

/// Response from an agent to the hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AgentResponse {
    ConversionStatus { reply: CheckConversionStatusReply },

    /// The agent handled the request but hit an internal failure
    Error { message: String },
}
