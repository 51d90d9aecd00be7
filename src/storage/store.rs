//! The entity store: one live snapshot behind a backend
//!
//! All changes go through [`Store::dispatch`]. A changed snapshot is saved
//! before it replaces the live one, so a failed save leaves the store
//! where it was.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{try_apply_at, Intent, Rejection, Snapshot};

use super::backend::SnapshotBackend;
use super::seed;

/// Result of dispatching one intent
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Ignored(Rejection),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Holds the current snapshot and persists every change
pub struct Store<B: SnapshotBackend> {
    backend: B,
    snapshot: Snapshot,
}

impl<B: SnapshotBackend> Store<B> {
    /// Loads the stored snapshot. When nothing is stored yet, starts from
    /// the default seed (or empty) and saves it right away.
    pub fn open(backend: B, seed_defaults: bool) -> Result<Self> {
        let snapshot = match backend.load().context("Failed to load snapshot")? {
            Some(snapshot) => snapshot,
            None => {
                let initial = if seed_defaults {
                    info!("no saved state found, starting from the default seed");
                    seed::default_snapshot(Utc::now())
                } else {
                    info!("no saved state found, starting empty");
                    Snapshot::new()
                };
                backend
                    .save(&initial)
                    .context("Failed to save initial snapshot")?;
                initial
            }
        };

        Ok(Self { backend, snapshot })
    }

    /// Wraps an already loaded snapshot without touching the backend
    pub fn with_snapshot(backend: B, snapshot: Snapshot) -> Self {
        Self { backend, snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Applies an intent using the current time
    pub fn dispatch(&mut self, intent: &Intent) -> Result<Outcome> {
        self.dispatch_at(intent, Utc::now())
    }

    /// Applies an intent with an explicit clock. Ignored intents leave the
    /// snapshot and the backend untouched.
    pub fn dispatch_at(&mut self, intent: &Intent, now: DateTime<Utc>) -> Result<Outcome> {
        let next = match try_apply_at(&self.snapshot, intent, now) {
            Ok(next) => next,
            Err(reason) => {
                debug!(intent = intent.name(), %reason, "intent ignored");
                return Ok(Outcome::Ignored(reason));
            }
        };

        if next != self.snapshot {
            self.backend
                .save(&next)
                .with_context(|| format!("Failed to save after {}", intent.name()))?;
            self.snapshot = next;
        }

        Ok(Outcome::Applied)
    }
}
