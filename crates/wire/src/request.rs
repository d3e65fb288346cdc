// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::StatusUpgradeRequest;

/// Request from a status client to the hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello {
        version: String,
        /// Auth token for TCP connections (ignored for Unix socket)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },

    /// Status of every upgrade step. The payload carries no fields and may
    /// be omitted entirely.
    StatusUpgrade {
        #[serde(default)]
        request: Option<StatusUpgradeRequest>,
    },

    /// Per-host primary conversion status, gathered from the agents
    StatusConversion,

    /// Request hub shutdown
    Shutdown,
}
