// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-participant serialization.
//!
//! Messages from the same participant are processed one at a time so that
//! find-or-create of their conversation cannot race. Different participants
//! proceed concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Table of per-participant locks. Entries are removed once no task holds or
/// awaits them.
#[derive(Debug, Default)]
pub struct ParticipantLanes {
    lanes: DashMap<String, Arc<Mutex<()>>>,
}

impl ParticipantLanes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `participant_id`'s lane.
    pub async fn acquire(&self, participant_id: &str) -> LaneGuard<'_> {
        let lane = self
            .lanes
            .entry(participant_id.to_string())
            .or_default()
            .clone();
        LaneGuard {
            lanes: &self.lanes,
            key: participant_id.to_string(),
            _guard: lane.lock_owned().await,
        }
    }

    /// Number of lanes currently tracked.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Held for the duration of one message's processing.
pub struct LaneGuard<'a> {
    lanes: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        // Two references: the table's and the one inside our guard.
        self.lanes
            .remove_if(&self.key, |_, lane| Arc::strong_count(lane) == 2);
    }
}
