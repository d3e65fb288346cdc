// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers shared with other crates via the `test-support` feature.

use std::path::PathBuf;

use crate::cluster::{Cluster, Segment, SegmentRole};

/// Build a primary segment.
pub fn primary(content_id: i32, dbid: i32, hostname: &str, port: u16) -> Segment {
    Segment {
        content_id,
        dbid,
        role: SegmentRole::Primary,
        hostname: hostname.to_string(),
        port,
        data_dir: PathBuf::from(format!("/data/seg{content_id}")),
    }
}

/// A master on `localhost` plus two primaries spread over two hosts.
pub fn sample_cluster(base_port: u16) -> Cluster {
    Cluster {
        bin_dir: PathBuf::from("/usr/local/db/bin"),
        segments: vec![
            primary(-1, 1, "localhost", base_port),
            primary(0, 2, "host1", base_port + 1),
            primary(1, 3, "host2", base_port + 2),
        ],
    }
}

/// Source and target clusters of the same shape on different ports.
pub fn sample_cluster_pair() -> (Cluster, Cluster) {
    let source = sample_cluster(15432);
    let mut target = sample_cluster(25432);
    target.bin_dir = PathBuf::from("/usr/local/db-next/bin");
    (source, target)
}
