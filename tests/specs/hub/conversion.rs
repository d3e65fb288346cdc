// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primary conversion specs
//!
//! While CONVERT_PRIMARIES is running, its reported status is refined by
//! asking each segment host's agent. Unreachable agents degrade the report,
//! never fail it.

use crate::prelude::*;
use crate::prelude::assert_eq;

/// Source cluster with primaries on two loopback addresses.
fn two_host_clusters() -> (Cluster, Cluster) {
    (cluster(15432, &["127.0.0.1", "127.0.0.2"]), cluster(25432, &["127.0.0.1", "127.0.0.2"]))
}

#[tokio::test]
async fn every_agent_complete_reports_complete() {
    let agent = MockAgent::bind("0.0.0.0").await;
    agent.reply("127.0.0.1", &[(0, 2, StepStatus::Complete)]);
    agent.reply("127.0.0.2", &[(1, 3, StepStatus::Complete)]);
    let (source, target) = two_host_clusters();
    let hub = TestHub::start(&source, &target, agent.port()).await;
    hub.mark(StepCode::ConvertPrimaries, StepStatus::Running);

    let reply = hub.status().await;

    assert_eq!(reply.status_of(StepCode::ConvertPrimaries), Some(StepStatus::Complete));
    let mut hosts: Vec<String> = agent
        .requests()
        .into_iter()
        .map(|AgentRequest::CheckConversionStatus { hostname, .. }| hostname)
        .collect();
    hosts.sort();
    assert_eq!(hosts, vec!["127.0.0.1".to_string(), "127.0.0.2".to_string()]);
}

#[tokio::test]
async fn any_failed_segment_reports_failed() {
    let agent = MockAgent::bind("0.0.0.0").await;
    agent.reply("127.0.0.1", &[(0, 2, StepStatus::Complete)]);
    agent.reply("127.0.0.2", &[(1, 3, StepStatus::Failed)]);
    let (source, target) = two_host_clusters();
    let hub = TestHub::start(&source, &target, agent.port()).await;
    hub.mark(StepCode::ConvertPrimaries, StepStatus::Running);

    assert_eq!(hub.status().await.status_of(StepCode::ConvertPrimaries), Some(StepStatus::Failed));
}

#[tokio::test]
async fn unreachable_host_keeps_persisted_status() {
    // Bound to one loopback address only; 127.0.0.2 refuses.
    let agent = MockAgent::bind("127.0.0.1").await;
    agent.reply("127.0.0.1", &[(0, 2, StepStatus::Complete)]);
    let (source, target) = two_host_clusters();
    let hub = TestHub::start(&source, &target, agent.port()).await;
    hub.mark(StepCode::ConvertPrimaries, StepStatus::Running);
    hub.mark(StepCode::Config, StepStatus::Complete);

    let reply = hub.status().await;

    assert_eq!(reply.list_of_upgrade_step_statuses.len(), StepCode::ALL.len());
    assert_eq!(reply.status_of(StepCode::ConvertPrimaries), Some(StepStatus::Running));
    assert_eq!(reply.status_of(StepCode::Config), Some(StepStatus::Complete));
}

#[tokio::test]
async fn agents_are_not_asked_once_conversion_is_recorded() {
    let agent = MockAgent::bind("0.0.0.0").await;
    agent.reply("127.0.0.1", &[(0, 2, StepStatus::Failed)]);
    let source = cluster(15432, &["127.0.0.1"]);
    let target = cluster(25432, &["127.0.0.1"]);
    let hub = TestHub::start(&source, &target, agent.port()).await;
    hub.mark(StepCode::ConvertPrimaries, StepStatus::Complete);

    assert_eq!(
        hub.status().await.status_of(StepCode::ConvertPrimaries),
        Some(StepStatus::Complete)
    );
    assert!(agent.requests().is_empty());
}

#[tokio::test]
async fn conversion_query_reports_each_host() {
    let agent = MockAgent::bind("127.0.0.1").await;
    agent.reply("127.0.0.1", &[(0, 2, StepStatus::Running)]);
    let (source, target) = two_host_clusters();
    let hub = TestHub::start(&source, &target, agent.port()).await;

    let hosts = hub.conversion().await;

    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].hostname, "127.0.0.1");
    assert_eq!(
        hosts[0].segments,
        vec![SegmentConversionStatus { content_id: 0, dbid: 2, status: StepStatus::Running }]
    );
    assert_eq!(hosts[0].error, None);
    assert_eq!(hosts[1].hostname, "127.0.0.2");
    assert!(hosts[1].error.is_some());
}

#[tokio::test]
async fn agent_error_is_reported_per_host() {
    let agent = MockAgent::bind("127.0.0.1").await;
    agent.fail("127.0.0.1", "pg_upgrade not found");
    let source = cluster(15432, &["127.0.0.1"]);
    let target = cluster(25432, &["127.0.0.1"]);
    let hub = TestHub::start(&source, &target, agent.port()).await;

    let hosts = hub.conversion().await;

    assert_eq!(hosts.len(), 1);
    assert!(hosts[0].error.as_deref().unwrap().contains("pg_upgrade not found"));
}
