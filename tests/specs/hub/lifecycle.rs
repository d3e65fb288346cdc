// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub lifecycle specs
//!
//! One hub per state directory, and a clean exit on request.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn hub_answers_ping_and_hello() {
    let hub = TestHub::start_default().await;

    assert_eq!(hub.request(&Request::Ping).await, Response::Pong);
    let response = hub.request(&Request::Hello { version: "0.0.0".into(), token: None }).await;
    assert!(matches!(response, Response::Hello { .. }), "{response:?}");
}

#[tokio::test]
async fn second_hub_on_same_state_dir_is_refused() {
    let hub = TestHub::start_default().await;

    let err = startup(hub.config(), Arc::new(TcpDialer::new(Duration::from_millis(100))))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, LifecycleError::LockFailed(_)), "{err}");
    assert_eq!(hub.request(&Request::Ping).await, Response::Pong);
}

#[tokio::test]
async fn shutdown_request_signals_and_cleans_up() {
    let mut hub = TestHub::start_default().await;
    let signal = hub.shutdown_signal();

    assert_eq!(hub.request(&Request::Shutdown).await, Response::ShuttingDown);
    tokio::time::timeout(TIMEOUT, signal.notified()).await.unwrap();

    hub.state().shutdown().unwrap();
    assert!(!hub.config().socket_path().exists());
    assert!(!hub.config().lock_path().exists());
}

#[tokio::test]
async fn progress_recorded_before_restart_is_kept_after_shutdown() {
    let hub = TestHub::start_default().await;
    hub.mark(StepCode::ConvertMaster, StepStatus::Complete);

    let hub = hub.restart().await;

    let handle = hub.checklist().step_writer("CONVERT_MASTER").unwrap();
    assert_eq!(handle.status().unwrap(), StepStatus::Complete);
}
