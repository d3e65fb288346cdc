// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cu-hub: upgrade hub process.
//!
//! Serves step status over `<state_dir>/hub.sock` until a client sends
//! `Shutdown` or the process receives Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use cu_hub::{logging, startup, HubConfig, ListenCtx, Listener, TcpDialer};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match HubConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cu-hub: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(&config.log_path()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("cu-hub: failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let dialer = Arc::new(TcpDialer::new(config.dial_timeout));
    let result = match startup(&config, dialer).await {
        Ok(result) => result,
        Err(e) => {
            error!("Failed to start hub: {}", e);
            eprintln!("cu-hub: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut state = result.hub;
    info!(
        agent_port = config.hub_to_agent_port,
        tcp_port = ?config.tcp_port,
        "Listening on {}",
        config.socket_path().display()
    );

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx::new(Arc::clone(&state.hub), Arc::clone(&shutdown)));
    let listener = match result.tcp {
        Some(tcp) => Listener::with_tcp(result.listener, tcp, ctx),
        None => Listener::new(result.listener, ctx),
    };
    let stop = CancellationToken::new();
    let listener_task = tokio::spawn(listener.run(stop.clone()));

    // Signal readiness to whatever launched us
    println!("READY");

    tokio::select! {
        _ = shutdown.notified() => info!("Shutdown requested by client"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Received Ctrl-C"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        },
    }

    stop.cancel();
    let _ = listener_task.await;

    match state.shutdown() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Shutdown failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
