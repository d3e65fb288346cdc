// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::{HostConversionStatus, StatusUpgradeReply};

/// Response from the hub to a status client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Hub is shutting down
    ShuttingDown,

    /// One entry per registered step
    StatusUpgrade { reply: StatusUpgradeReply },

    /// One entry per segment host
    StatusConversion { hosts: Vec<HostConversionStatus> },

    /// Error response
    Error { message: String },
}
