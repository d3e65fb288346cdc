// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted step store.
//!
//! Each step owns a directory `<root>/<STEP_NAME>/` holding a single `status`
//! marker whose payload is the status word. Writes go to `status.tmp`, are
//! fsynced, then renamed over the marker, so a reader sees either the previous
//! status or the new one and never a torn write.
//!
//! Older state directories encode status by the presence of `in.progress`,
//! `completed` or `failed`. Those are still read when no `status` marker
//! exists, and every write clears them.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::step::StepStatus;

const STATUS_MARKER: &str = "status";
const STATUS_TMP: &str = "status.tmp";

const LEGACY_MARKERS: [(&str, StepStatus); 3] = [
    ("in.progress", StepStatus::Running),
    ("completed", StepStatus::Complete),
    ("failed", StepStatus::Failed),
];

/// Errors from reading or writing step markers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error for step {step}: {source}")]
    Io {
        step: String,
        #[source]
        source: io::Error,
    },

    #[error("corrupt status marker for step {step}: {content:?}")]
    Corrupt { step: String, content: String },
}

/// Filesystem-backed mapping from step name to status.
#[derive(Debug, Clone)]
pub struct StepStore {
    root: PathBuf,
}

impl StepStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn step_dir(&self, step: &str) -> PathBuf {
        self.root.join(step)
    }

    /// Read the current status of `step`. A step with no marker is `Pending`.
    pub fn read(&self, step: &str) -> Result<StepStatus, StoreError> {
        let dir = self.step_dir(step);
        match fs::read_to_string(dir.join(STATUS_MARKER)) {
            Ok(content) => StepStatus::parse_marker(content.trim())
                .ok_or_else(|| StoreError::Corrupt { step: step.to_string(), content }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => read_legacy(step, &dir),
            Err(source) => Err(StoreError::Io { step: step.to_string(), source }),
        }
    }

    /// Durably record `status` for `step`.
    ///
    /// Returns only once the new marker has been renamed into place and the
    /// directory entry synced.
    pub fn write(&self, step: &str, status: StepStatus) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { step: step.to_string(), source };
        let dir = self.step_dir(step);
        fs::create_dir_all(&dir).map_err(io_err)?;

        let tmp = dir.join(STATUS_TMP);
        write_synced(&tmp, status.to_string().as_bytes()).map_err(io_err)?;
        fs::rename(&tmp, dir.join(STATUS_MARKER)).map_err(io_err)?;
        sync_dir(&dir).map_err(io_err)?;

        // The atomic marker now takes precedence; legacy markers are only cleanup.
        for (file, _) in LEGACY_MARKERS {
            remove_if_exists(&dir.join(file)).map_err(io_err)?;
        }
        Ok(())
    }

    /// Forget everything recorded for `step`, returning it to `Pending`.
    pub fn reset(&self, step: &str) -> Result<(), StoreError> {
        match fs::remove_dir_all(self.step_dir(step)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { step: step.to_string(), source }),
        }
    }
}

fn read_legacy(step: &str, dir: &Path) -> Result<StepStatus, StoreError> {
    let mut present = Vec::new();
    for (file, status) in LEGACY_MARKERS {
        match fs::symlink_metadata(dir.join(file)) {
            Ok(_) => present.push(status),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { step: step.to_string(), source }),
        }
    }

    Ok(match present.as_slice() {
        [] => StepStatus::Pending,
        [status] => *status,
        _ => {
            // Interrupted legacy transition; never report it as terminal.
            warn!(step, markers = ?present, "multiple legacy markers present, reading as running");
            StepStatus::Running
        }
    })
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
