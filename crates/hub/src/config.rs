// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub configuration and cluster topology loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cu_core::Cluster;
use thiserror::Error;

use crate::env;

const SOURCE_CLUSTER_FILE: &str = "source_cluster.json";
const TARGET_CLUSTER_FILE: &str = "target_cluster.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("invalid port: {0:?}")]
    InvalidPort(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cluster file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Hub configuration
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Port every agent listens on
    pub hub_to_agent_port: u16,
    /// Root state directory; step markers live directly beneath it
    pub state_dir: PathBuf,
    /// Bound on establishing an agent connection
    pub dial_timeout: Duration,
    /// Bound on each framed read/write, for clients and agents alike
    pub call_timeout: Duration,
    pub tcp_port: Option<u16>,
    pub auth_token: Option<String>,
}

impl HubConfig {
    /// Configuration with default timeouts and no TCP listener.
    pub fn new(hub_to_agent_port: u16, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            hub_to_agent_port,
            state_dir: state_dir.into(),
            dial_timeout: Duration::from_secs(3),
            call_timeout: Duration::from_secs(5),
            tcp_port: None,
            auth_token: None,
        }
    }

    /// Load configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            hub_to_agent_port: env::hub_to_agent_port()?,
            state_dir: env::state_dir()?,
            dial_timeout: env::agent_dial_timeout(),
            call_timeout: env::ipc_timeout(),
            tcp_port: env::tcp_port()?,
            auth_token: env::auth_token(),
        })
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_dir.join("hub.sock")
    }

    /// Lock/PID file
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("hub.pid")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("hub.log")
    }

    pub fn source_cluster_path(&self) -> PathBuf {
        self.state_dir.join(SOURCE_CLUSTER_FILE)
    }

    pub fn target_cluster_path(&self) -> PathBuf {
        self.state_dir.join(TARGET_CLUSTER_FILE)
    }
}

/// Read one cluster topology file.
pub fn load_cluster(path: &Path) -> Result<Cluster, ConfigError> {
    let bytes = std::fs::read(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes)
        .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
}

/// Read the source and target topologies saved in the state directory.
pub fn load_cluster_pair(config: &HubConfig) -> Result<(Cluster, Cluster), ConfigError> {
    let source = load_cluster(&config.source_cluster_path())?;
    let target = load_cluster(&config.target_cluster_path())?;
    Ok((source, target))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
