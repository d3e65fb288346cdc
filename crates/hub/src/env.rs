// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the hub crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port agents listen on for hub connections.
pub const DEFAULT_HUB_TO_AGENT_PORT: u16 = 6416;

/// Resolve state directory: CU_STATE_DIR > XDG_STATE_HOME/cu-hub > ~/.local/state/cu-hub
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("CU_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("cu-hub"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/cu-hub"))
}

/// Port agents listen on (`CU_HUB_TO_AGENT_PORT`).
pub fn hub_to_agent_port() -> Result<u16, ConfigError> {
    Ok(port("CU_HUB_TO_AGENT_PORT")?.unwrap_or(DEFAULT_HUB_TO_AGENT_PORT))
}

/// Bound on establishing an agent connection (default 3s)
pub fn agent_dial_timeout() -> Duration {
    duration_ms("CU_AGENT_DIAL_TIMEOUT_MS").unwrap_or(Duration::from_secs(3))
}

/// Default IPC timeout, for both client connections and agent calls
pub fn ipc_timeout() -> Duration {
    duration_ms("CU_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// TCP port for remote status clients. When set, the hub listens on this
/// port in addition to the Unix socket.
pub fn tcp_port() -> Result<Option<u16>, ConfigError> {
    port("CU_TCP_PORT")
}

/// Auth token for TCP connections, validated in the Hello handshake.
pub fn auth_token() -> Option<String> {
    std::env::var("CU_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

fn port(var: &str) -> Result<Option<u16>, ConfigError> {
    match std::env::var(var) {
        Ok(s) => s.parse::<u16>().map(Some).map_err(|_| ConfigError::InvalidPort(s)),
        Err(_) => Ok(None),
    }
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
