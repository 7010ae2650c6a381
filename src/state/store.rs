// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Atomic snapshot store.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;

use super::{PanelSnapshot, PanelUpdate};
use crate::error::EmptyDataKind;

/// Holds the last-known-good [`PanelSnapshot`].
///
/// Reads are lock-free: [`current`](Self::current) hands out the `Arc` that
/// is installed at that instant. Writes are serialized and swap the whole
/// snapshot in one step, so a reader holds either the old or the new
/// snapshot and never a mix.
#[derive(Debug)]
pub struct PanelStateStore {
    current: ArcSwap<PanelSnapshot>,
    // Serializes writers; holds the last issued generation.
    generation: Mutex<u64>,
    tx: watch::Sender<Arc<PanelSnapshot>>,
}

impl PanelStateStore {
    /// Creates a store holding the empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        let initial = Arc::new(PanelSnapshot::empty());
        let (tx, _) = watch::channel(Arc::clone(&initial));
        Self {
            current: ArcSwap::new(initial),
            generation: Mutex::new(0),
            tx,
        }
    }

    /// Returns the current snapshot.
    ///
    /// The returned `Arc` stays valid and unchanged for as long as the
    /// caller holds it, regardless of later refreshes.
    #[must_use]
    pub fn current(&self) -> Arc<PanelSnapshot> {
        self.current.load_full()
    }

    /// Installs `snapshot` as the current state and notifies subscribers.
    ///
    /// The snapshot's generation is overwritten with the next number.
    pub fn replace(&self, mut snapshot: PanelSnapshot) -> Arc<PanelSnapshot> {
        let mut generation = self.generation.lock();
        *generation += 1;
        snapshot.generation = *generation;

        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        self.tx.send_replace(Arc::clone(&snapshot));

        tracing::debug!(generation = snapshot.generation, "Published panel snapshot");
        snapshot
    }

    /// Publishes a refresh result unless it is empty data.
    ///
    /// # Errors
    ///
    /// Returns the [`EmptyDataKind`] that matched; the current snapshot is
    /// left untouched.
    pub fn apply(&self, update: PanelUpdate) -> Result<Arc<PanelSnapshot>, EmptyDataKind> {
        if let Some(kind) = update.empty_data() {
            tracing::warn!(kind = %kind, "Panel returned empty data, keeping previous snapshot");
            return Err(kind);
        }
        Ok(self.replace(update.into_snapshot(0, Utc::now())))
    }

    /// Subscribes to published snapshots.
    ///
    /// The receiver starts with the snapshot current at subscription time.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<PanelSnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for PanelStateStore {
    fn default() -> Self {
        Self::new()
    }
}
