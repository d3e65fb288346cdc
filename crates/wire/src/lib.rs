// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for hub and agent communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod agent;
mod request;
mod response;
mod status;
mod wire;

pub use agent::{
    AgentRequest, AgentResponse, CheckConversionStatusReply, SegmentConversionStatus, SegmentInfo,
};
pub use request::Request;
pub use response::Response;
pub use status::{
    HostConversionStatus, StatusUpgradeReply, StatusUpgradeRequest, UpgradeStepStatus,
};
pub use wire::{call, decode, encode, read_frame, read_message, write_frame, write_message};
pub use wire::{read_request, write_response, ProtocolError, MAX_MESSAGE_SIZE};
