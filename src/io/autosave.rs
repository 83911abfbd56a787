// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Debounced autosave.
//!
//! Changes schedule a write after a quiet period; further changes before
//! the period elapses restart it, so a burst of edits produces one write
//! carrying the final state. Writes whose content matches the last written
//! record are skipped. Time is passed in explicitly so the owner decides
//! when to poll (the GUI polls once per frame).

use super::store::{KeyValueStore, ProjectRepository, StoreError};
use crate::models::project::{DesignState, ProjectData};
use std::time::{Duration, Instant};

/// Default quiet period before an autosave write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// A cancellable trailing-edge timer. At most one deadline is pending.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// (Re)start the timer from `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed. Returns whether it fired.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Result of a save attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    Unchanged,
}

/// Shown next to the project name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveStatus {
    Saved,
    Pending,
    Failed,
}

/// Autosave bookkeeping for one active event at a time.
#[derive(Debug)]
pub struct Autosave {
    debounce: Debouncer,
    /// Fingerprint of the last record written or loaded.
    last_written: Option<String>,
    failed: bool,
}

impl Autosave {
    pub fn new(window: Duration) -> Self {
        Self {
            debounce: Debouncer::new(window),
            last_written: None,
            failed: false,
        }
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debounce
    }

    pub fn status(&self) -> AutosaveStatus {
        if self.failed {
            AutosaveStatus::Failed
        } else if self.debounce.is_pending() {
            AutosaveStatus::Pending
        } else {
            AutosaveStatus::Saved
        }
    }

    /// Record that the design changed at `now`.
    pub fn note_change(&mut self, now: Instant) {
        self.debounce.schedule(now);
    }

    /// Reset for a freshly loaded (or freshly created) project.
    pub fn mark_loaded(&mut self, project: Option<&ProjectData>) {
        self.debounce.cancel();
        self.failed = false;
        self.last_written = project.and_then(|p| p.fingerprint().ok());
    }

    /// Write if the quiet period has elapsed. `None` when nothing was due.
    ///
    /// A failed write is rescheduled for another quiet period.
    pub fn poll(
        &mut self,
        now: Instant,
        store: &dyn KeyValueStore,
        event_id: &str,
        design: &DesignState,
    ) -> Option<Result<SaveOutcome, StoreError>> {
        if !self.debounce.fire(now) {
            return None;
        }
        let result = self.write_if_changed(store, event_id, design);
        if let Err(ref e) = result {
            log::warn!("Autosave for {} failed, retrying later: {}", event_id, e);
            self.debounce.schedule(now);
        }
        Some(result)
    }

    /// Write a pending change immediately, if there is one.
    pub fn flush(
        &mut self,
        store: &dyn KeyValueStore,
        event_id: &str,
        design: &DesignState,
    ) -> Result<SaveOutcome, StoreError> {
        if !self.debounce.is_pending() && !self.failed {
            return Ok(SaveOutcome::Unchanged);
        }
        self.debounce.cancel();
        self.write_if_changed(store, event_id, design)
    }

    /// Explicit save: always writes, bypassing the quiet period.
    pub fn save_now(
        &mut self,
        store: &dyn KeyValueStore,
        event_id: &str,
        design: &DesignState,
    ) -> Result<(), StoreError> {
        self.debounce.cancel();
        let project = design.snapshot();
        self.write(store, event_id, &project)
    }

    fn write_if_changed(
        &mut self,
        store: &dyn KeyValueStore,
        event_id: &str,
        design: &DesignState,
    ) -> Result<SaveOutcome, StoreError> {
        let project = design.snapshot();
        let fingerprint = fingerprint(event_id, &project)?;
        if self.last_written.as_deref() == Some(fingerprint.as_str()) {
            self.failed = false;
            log::debug!("Autosave for {} skipped, nothing changed", event_id);
            return Ok(SaveOutcome::Unchanged);
        }
        self.write(store, event_id, &project)?;
        Ok(SaveOutcome::Written)
    }

    fn write(
        &mut self,
        store: &dyn KeyValueStore,
        event_id: &str,
        project: &ProjectData,
    ) -> Result<(), StoreError> {
        let fingerprint = fingerprint(event_id, project)?;
        match ProjectRepository::new(store).put(event_id, project) {
            Ok(()) => {
                self.last_written = Some(fingerprint);
                self.failed = false;
                log::info!(
                    "Saved project {:?} for event {} ({} elements)",
                    project.project_name,
                    event_id,
                    project.elements.len()
                );
                Ok(())
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }
}

fn fingerprint(event_id: &str, project: &ProjectData) -> Result<String, StoreError> {
    project
        .fingerprint()
        .map_err(|source| StoreError::Serialize {
            key: ProjectRepository::key_for(event_id),
            source,
        })
}
