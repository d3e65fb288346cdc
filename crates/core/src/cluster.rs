// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster topology as consumed by the hub.
//!
//! Topology discovery happens elsewhere; the hub only needs the segment list
//! to know which hosts run agents and which primaries live on each host.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Content id of the master (coordinator) segment.
pub const MASTER_CONTENT_ID: i32 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRole {
    #[default]
    Primary,
    Mirror,
}

crate::simple_display! {
    SegmentRole {
        Primary => "primary",
        Mirror => "mirror",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub content_id: i32,
    pub dbid: i32,
    #[serde(default)]
    pub role: SegmentRole,
    pub hostname: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Segment {
    pub fn is_master(&self) -> bool {
        self.content_id == MASTER_CONTENT_ID
    }

    pub fn is_primary(&self) -> bool {
        self.role == SegmentRole::Primary
    }
}

/// One cluster (source or target) of the upgrade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Directory holding this cluster's server binaries
    #[serde(default)]
    pub bin_dir: PathBuf,
    pub segments: Vec<Segment>,
}

impl Cluster {
    pub fn master(&self) -> Option<&Segment> {
        self.segments.iter().find(|s| s.is_master() && s.is_primary())
    }

    /// Distinct hosts carrying non-master primaries, in first-seen order.
    ///
    /// These are the hosts running an agent.
    pub fn segment_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = Vec::new();
        for seg in self.segments.iter().filter(|s| !s.is_master() && s.is_primary()) {
            if !hosts.contains(&seg.hostname) {
                hosts.push(seg.hostname.clone());
            }
        }
        hosts
    }

    /// Non-master primaries on `host`.
    pub fn primaries_on<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments
            .iter()
            .filter(move |s| !s.is_master() && s.is_primary() && s.hostname == host)
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
