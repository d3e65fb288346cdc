// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-query specs
//!
//! The hub reports one entry per upgrade step, read from the persisted
//! markers, across queries and restarts.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn fresh_hub_reports_every_step_pending() {
    let hub = TestHub::start_default().await;

    let response = hub.request(&Request::StatusUpgrade { request: None }).await;

    let Response::StatusUpgrade { reply } = response else {
        panic!("unexpected response: {response:?}");
    };
    let expected: Vec<_> = StepCode::ALL.into_iter().map(|s| (s, StepStatus::Pending)).collect();
    assert_eq!(sorted(&reply), expected);
}

#[tokio::test]
async fn mixed_progress_is_reported_verbatim() {
    let hub = TestHub::start_default().await;
    hub.mark(StepCode::Config, StepStatus::Complete);
    hub.mark(StepCode::Seginstall, StepStatus::Complete);
    hub.mark(StepCode::StartAgents, StepStatus::Complete);
    hub.mark(StepCode::ShareOids, StepStatus::Failed);

    let reply = hub.status().await;

    let expected: Vec<_> = StepCode::ALL
        .into_iter()
        .map(|step| {
            let status = match step {
                StepCode::Config | StepCode::Seginstall | StepCode::StartAgents => {
                    StepStatus::Complete
                }
                StepCode::ShareOids => StepStatus::Failed,
                _ => StepStatus::Pending,
            };
            (step, status)
        })
        .collect();
    assert_eq!(sorted(&reply), expected);
}

#[tokio::test]
async fn start_agents_progress_is_visible_while_running() {
    let hub = TestHub::start_default().await;

    hub.mark(StepCode::StartAgents, StepStatus::Running);
    assert_eq!(hub.status().await.status_of(StepCode::StartAgents), Some(StepStatus::Running));

    hub.mark(StepCode::StartAgents, StepStatus::Complete);
    assert_eq!(hub.status().await.status_of(StepCode::StartAgents), Some(StepStatus::Complete));
}

#[tokio::test]
async fn agent_pid_files_do_not_promote_pending_start_agents() {
    let hub = TestHub::start_default().await;
    let agents = hub.state_dir().join("agents");
    std::fs::create_dir_all(&agents).unwrap();
    std::fs::write(agents.join("127.0.0.1.started"), "4242").unwrap();

    assert_eq!(hub.status().await.status_of(StepCode::StartAgents), Some(StepStatus::Pending));
}

#[tokio::test]
async fn repeated_queries_are_set_equal() {
    let hub = TestHub::start_default().await;
    hub.mark(StepCode::Config, StepStatus::Complete);
    hub.mark(StepCode::InitCluster, StepStatus::Running);

    let first = hub.status().await;
    let second = hub.status().await;
    assert_eq!(sorted(&first), sorted(&second));
}

#[tokio::test]
async fn progress_survives_restart() {
    let hub = TestHub::start_default().await;
    hub.mark(StepCode::Config, StepStatus::Complete);
    hub.mark(StepCode::InitCluster, StepStatus::Complete);
    hub.mark(StepCode::Seginstall, StepStatus::Running);
    hub.mark(StepCode::ShutdownClusters, StepStatus::Failed);
    let before = hub.status().await;

    let hub = hub.restart().await;

    assert_eq!(sorted(&hub.status().await), sorted(&before));
}

#[tokio::test]
async fn legacy_markers_are_honoured() {
    let hub = TestHub::start_default().await;
    let dir = hub.state_dir();
    std::fs::create_dir_all(dir.join("CONFIG")).unwrap();
    std::fs::write(dir.join("CONFIG/completed"), "").unwrap();
    std::fs::create_dir_all(dir.join("INIT_CLUSTER")).unwrap();
    std::fs::write(dir.join("INIT_CLUSTER/in.progress"), "").unwrap();
    std::fs::write(dir.join("INIT_CLUSTER/failed"), "").unwrap();

    let reply = hub.status().await;

    assert_eq!(reply.status_of(StepCode::Config), Some(StepStatus::Complete));
    // Two legacy markers: an interrupted transition, never terminal.
    assert_eq!(reply.status_of(StepCode::InitCluster), Some(StepStatus::Running));
}

#[tokio::test]
async fn corrupt_marker_reports_pending_without_failing_query() {
    let hub = TestHub::start_default().await;
    hub.mark(StepCode::Config, StepStatus::Complete);
    let dir = hub.state_dir().join("SEGINSTALL");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("status"), "half-written").unwrap();

    let reply = hub.status().await;

    assert_eq!(reply.list_of_upgrade_step_statuses.len(), StepCode::ALL.len());
    assert_eq!(reply.status_of(StepCode::Seginstall), Some(StepStatus::Pending));
    assert_eq!(reply.status_of(StepCode::Config), Some(StepStatus::Complete));
}

#[tokio::test]
async fn reply_uses_numeric_wire_values() {
    let hub = TestHub::start_default().await;
    hub.mark(StepCode::ShareOids, StepStatus::Failed);

    let reply = hub.status().await;
    let json = serde_json::to_value(&reply).unwrap();

    let entries = json["list_of_upgrade_step_statuses"].as_array().unwrap();
    assert!(entries.iter().any(|e| e == &serde_json::json!({"step": 6, "status": 3})));
}
