// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub lifecycle management: startup and shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use cu_core::ChecklistError;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};

use crate::config::{ConfigError, HubConfig};
use crate::hub::Hub;

/// Hub state during operation.
pub struct HubState {
    pub config: HubConfig,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub hub: Arc<Hub>,
    pub start_time: Instant,
}

/// Result of hub startup: the running state plus the listeners to serve.
pub struct StartupResult {
    pub hub: HubState,
    pub listener: UnixListener,
    /// Bound when `CU_TCP_PORT` is set
    pub tcp: Option<TcpListener>,
}

impl HubState {
    /// Remove the socket and PID files. The lock itself is released when
    /// the state is dropped.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!(uptime_secs = self.start_time.elapsed().as_secs(), "Shutting down hub...");

        for path in [self.config.socket_path(), self.config.lock_path()] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }

        info!("Hub shutdown complete");
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: hub already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Failed to bind TCP port {0}: {1}")]
    TcpBindFailed(u16, std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid checklist: {0}")]
    Checklist(#[from] ChecklistError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
