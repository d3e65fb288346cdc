// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster upgrade hub library.
//!
//! The hub owns the upgrade checklist, answers status queries over its
//! socket, and asks per-host agents about conversion progress.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod gateway;
pub mod hub;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod status;

#[cfg(test)]
mod test_helpers;

pub use config::{ConfigError, HubConfig};
pub use gateway::{AgentConn, AgentGateway, DialError, Dialer, GatewayError, TcpDialer};
pub use hub::Hub;
pub use lifecycle::{startup, HubState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
pub use status::{GlobSideChannel, SideChannel, StatusAggregator, StatusPolicy};
