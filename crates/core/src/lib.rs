// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cu-core: step checklist model and crash-safe step status persistence
//! for the cluster upgrade hub.

pub mod macros;

pub mod checklist;
pub mod cluster;
pub mod step;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use checklist::{Checklist, ChecklistError, StepHandle};
pub use cluster::{Cluster, Segment, SegmentRole, MASTER_CONTENT_ID};
pub use step::{StepCode, StepDef, StepStatus, UnknownStepCode, UnknownStepStatus};
pub use store::{StepStore, StoreError};
