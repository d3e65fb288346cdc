// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use tracing::debug;

/// Read-only probe of files left by other processes.
pub trait SideChannel: Send + Sync {
    /// Paths matching `pattern`. Probe failures yield no matches.
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;
}

/// Filesystem glob rooted at a directory.
#[derive(Debug, Clone)]
pub struct GlobSideChannel {
    root: PathBuf,
}

impl GlobSideChannel {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SideChannel for GlobSideChannel {
    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let full_pattern = format!("{}/{}", root.trim_end_matches('/'), pattern);

        let paths = match glob::glob(&full_pattern) {
            Ok(paths) => paths,
            Err(e) => {
                debug!(pattern = %full_pattern, error = %e, "invalid side channel pattern");
                return Vec::new();
            }
        };
        paths
            .filter_map(|result| match result {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable side channel path");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "side_channel_tests.rs"]
mod tests;
