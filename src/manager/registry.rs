// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory panel registry.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::PanelEntry;
use crate::error::PairingError;
use crate::event::EntryId;
use crate::options::PanelOptions;
use crate::protocol::normalize_host;

/// Paired panels keyed by entry id.
///
/// Lookups return clones so no lock is held by callers.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    entries: RwLock<HashMap<EntryId, PanelEntry>>,
}

impl PanelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a registry from persisted entries.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = PanelEntry>) -> Self {
        let entries = entries.into_iter().map(|e| (e.id, e)).collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Returns all entries ordered by serial number, for persistence.
    #[must_use]
    pub fn entries(&self) -> Vec<PanelEntry> {
        let mut entries: Vec<_> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
        entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is paired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns an entry by id.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<PanelEntry> {
        self.entries.read().get(&id).cloned()
    }

    /// Returns the entry for a serial number.
    #[must_use]
    pub fn find_by_serial(&self, serial_number: &str) -> Option<PanelEntry> {
        self.entries
            .read()
            .values()
            .find(|e| e.serial_number == serial_number)
            .cloned()
    }

    /// Returns the entry for a host.
    #[must_use]
    pub fn find_by_host(&self, host: &str) -> Option<PanelEntry> {
        let host = normalize_host(host);
        self.entries
            .read()
            .values()
            .find(|e| e.host == host)
            .cloned()
    }

    /// Rejects a serial number that is already paired.
    ///
    /// If the serial is paired under a different host, the existing entry
    /// is moved to `host` (the panel changed address).
    ///
    /// # Errors
    ///
    /// Returns `PairingError::AlreadyConfigured` if the serial is paired.
    pub fn claim_serial(&self, serial_number: &str, host: &str) -> Result<(), PairingError> {
        Self::claim_locked(&mut self.entries.write(), serial_number, &normalize_host(host))
    }

    /// Adds a new pairing unless the serial number is already paired.
    ///
    /// Applies the same host migration as [`claim_serial`](Self::claim_serial).
    ///
    /// # Errors
    ///
    /// Returns `PairingError::AlreadyConfigured` if the serial is paired.
    pub fn insert_unique(&self, entry: PanelEntry) -> Result<EntryId, PairingError> {
        let mut entries = self.entries.write();
        Self::claim_locked(&mut entries, &entry.serial_number, &entry.host)?;

        let id = entry.id;
        tracing::info!(serial = %entry.serial_number, host = %entry.host, "Panel paired");
        entries.insert(id, entry);
        Ok(id)
    }

    fn claim_locked(
        entries: &mut HashMap<EntryId, PanelEntry>,
        serial_number: &str,
        host: &str,
    ) -> Result<(), PairingError> {
        let Some(existing) = entries
            .values_mut()
            .find(|e| e.serial_number == serial_number)
        else {
            return Ok(());
        };

        let host_updated = existing.host != host;
        if host_updated {
            tracing::info!(
                serial = %existing.serial_number,
                from = %existing.host,
                to = %host,
                "Panel moved to a new address"
            );
            existing.host = host.to_string();
        }
        Err(PairingError::AlreadyConfigured {
            serial: serial_number.to_string(),
            host_updated,
        })
    }

    /// Merges a new host and token into an existing entry, keeping its
    /// title and options.
    ///
    /// # Errors
    ///
    /// Returns `PairingError::UnknownEntry` if no entry has this id.
    pub fn update_credentials(
        &self,
        id: EntryId,
        host: &str,
        access_token: impl Into<String>,
    ) -> Result<PanelEntry, PairingError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| PairingError::UnknownEntry(id.to_string()))?;

        entry.host = normalize_host(host);
        entry.access_token = access_token.into();
        tracing::info!(serial = %entry.serial_number, host = %entry.host, "Panel credentials updated");
        Ok(entry.clone())
    }

    /// Replaces an entry's options.
    ///
    /// # Errors
    ///
    /// Returns `PairingError::UnknownEntry` if no entry has this id.
    pub fn update_options(&self, id: EntryId, options: PanelOptions) -> Result<(), PairingError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| PairingError::UnknownEntry(id.to_string()))?;
        entry.options = options;
        Ok(())
    }

    /// Removes an entry.
    pub fn remove(&self, id: EntryId) -> Option<PanelEntry> {
        self.entries.write().remove(&id)
    }
}
