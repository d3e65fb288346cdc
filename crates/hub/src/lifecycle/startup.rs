// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use cu_core::{Checklist, StepStore};
use fs2::FileExt;
use tokio::net::{TcpListener, UnixListener};
use tracing::info;

use crate::config::{load_cluster_pair, HubConfig};
use crate::gateway::Dialer;
use crate::hub::Hub;

use super::{HubState, LifecycleError, StartupResult};

/// Start the hub
pub async fn startup(
    config: &HubConfig,
    dialer: Arc<dyn Dialer>,
) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config, dialer).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock;
            // those files belong to the already-running hub.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(
    config: &HubConfig,
    dialer: Arc<dyn Dialer>,
) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory (holds step markers, socket, lock)
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents two hubs driving one state dir.
    // Open without truncating so a running hub's PID survives.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(config.lock_path())?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Load topologies and build the checklist
    let (source, target) = load_cluster_pair(config)?;
    info!(
        source_hosts = source.segment_hosts().len(),
        target_hosts = target.segment_hosts().len(),
        "Loaded cluster topologies"
    );
    let checklist = Arc::new(Checklist::upgrade(StepStore::new(&config.state_dir))?);
    let hub = Arc::new(Hub::new(source, target, dialer, config.clone(), checklist));

    // 4. Remove stale socket and bind (LAST - only after all validation passes)
    let socket_path = config.socket_path();
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let listener = UnixListener::bind(&socket_path)
        .map_err(|e| LifecycleError::BindFailed(socket_path.clone(), e))?;

    let tcp = match config.tcp_port {
        Some(port) => Some(
            TcpListener::bind(("0.0.0.0", port))
                .await
                .map_err(|e| LifecycleError::TcpBindFailed(port, e))?,
        ),
        None => None,
    };

    info!(state_dir = %config.state_dir.display(), "Hub started");

    Ok(StartupResult {
        hub: HubState { config: config.clone(), lock_file, hub, start_time: Instant::now() },
        listener,
        tcp,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &HubConfig) {
    for path in [config.socket_path(), config.lock_path()] {
        if path.exists() {
            let _ = std::fs::remove_file(&path);
        }
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
