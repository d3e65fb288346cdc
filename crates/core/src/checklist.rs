// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checklist registry and per-step handles.
//!
//! The persisted marker is the only source of truth: a [`StepHandle`] holds no
//! status in memory, so a hub restarted mid-upgrade picks up exactly where the
//! previous process left off, and transitions the current process never saw
//! (e.g. `Complete` without a prior `Running`) are accepted.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::info;

use crate::step::{StepCode, StepDef, StepStatus};
use crate::store::{StepStore, StoreError};

/// Errors from checklist lookups and registration.
#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("unknown step: {0}")]
    UnknownStep(String),

    #[error("step registered twice: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read/write capability for a single registered step.
#[derive(Debug)]
pub struct StepHandle {
    name: String,
    code: StepCode,
    store: StepStore,
    /// Serializes writers of this step.
    write_lock: Mutex<()>,
}

impl StepHandle {
    fn new(def: StepDef, store: StepStore) -> Self {
        Self { name: def.name, code: def.code, store, write_lock: Mutex::new(()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> StepCode {
        self.code
    }

    /// Current status, read through to the store.
    pub fn status(&self) -> Result<StepStatus, StoreError> {
        self.store.read(&self.name)
    }

    /// Mark the step running. Safe to repeat, and valid from terminal states
    /// when a step is re-run.
    pub fn mark_in_progress(&self) -> Result<(), StoreError> {
        self.transition(StepStatus::Running)
    }

    pub fn mark_complete(&self) -> Result<(), StoreError> {
        self.transition(StepStatus::Complete)
    }

    pub fn mark_failed(&self) -> Result<(), StoreError> {
        self.transition(StepStatus::Failed)
    }

    /// Return the step to `Pending` for a fresh attempt.
    pub fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.store.reset(&self.name)?;
        info!(step = %self.name, "step reset");
        Ok(())
    }

    fn transition(&self, status: StepStatus) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.store.write(&self.name, status)?;
        info!(step = %self.name, %status, "step transition");
        Ok(())
    }
}

/// Ordered registry of every step in one upgrade attempt.
///
/// Lookups may run concurrently with the workflow driving transitions; handles
/// are shared, so the index lock is never held across store I/O.
#[derive(Debug)]
pub struct Checklist {
    store: StepStore,
    steps: RwLock<IndexMap<String, Arc<StepHandle>>>,
}

impl Checklist {
    /// Create an empty checklist backed by `store`.
    pub fn new(store: StepStore) -> Self {
        Self { store, steps: RwLock::new(IndexMap::new()) }
    }

    /// Create a checklist and register `steps` in order.
    pub fn with_steps(
        store: StepStore,
        steps: impl IntoIterator<Item = StepDef>,
    ) -> Result<Self, ChecklistError> {
        let checklist = Self::new(store);
        checklist.register(steps)?;
        Ok(checklist)
    }

    /// The fixed step sequence of a major-version upgrade.
    pub fn upgrade(store: StepStore) -> Result<Self, ChecklistError> {
        Self::with_steps(store, StepDef::upgrade_sequence())
    }

    /// Append `steps` to the registry.
    ///
    /// All-or-nothing: a repeated name or code anywhere in the batch (or
    /// already registered) rejects the whole batch.
    pub fn register(&self, steps: impl IntoIterator<Item = StepDef>) -> Result<(), ChecklistError> {
        let mut index = self.steps.write();
        let mut staged: IndexMap<String, Arc<StepHandle>> = IndexMap::new();

        for def in steps {
            if index.contains_key(&def.name) || staged.contains_key(&def.name) {
                return Err(ChecklistError::Duplicate(def.name));
            }
            if index.values().chain(staged.values()).any(|h| h.code == def.code) {
                return Err(ChecklistError::Duplicate(def.code.to_string()));
            }
            let handle = Arc::new(StepHandle::new(def, self.store.clone()));
            staged.insert(handle.name.clone(), handle);
        }

        index.extend(staged);
        Ok(())
    }

    /// Handle for the step registered as `name`.
    pub fn step_writer(&self, name: &str) -> Result<Arc<StepHandle>, ChecklistError> {
        self.steps
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ChecklistError::UnknownStep(name.to_string()))
    }

    /// Handle for the step registered with wire code `code`.
    pub fn step_by_code(&self, code: StepCode) -> Result<Arc<StepHandle>, ChecklistError> {
        self.steps
            .read()
            .values()
            .find(|h| h.code == code)
            .cloned()
            .ok_or_else(|| ChecklistError::UnknownStep(code.to_string()))
    }

    /// Every registered step, in registration order.
    pub fn all(&self) -> Vec<Arc<StepHandle>> {
        self.steps.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.steps.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.read().is_empty()
    }

    /// Reset every registered step to `Pending`.
    pub fn reset_all(&self) -> Result<(), StoreError> {
        for handle in self.all() {
            handle.reset()?;
        }
        Ok(())
    }

    pub fn store(&self) -> &StepStore {
        &self.store
    }
}

#[cfg(test)]
#[path = "checklist_tests.rs"]
mod tests;
