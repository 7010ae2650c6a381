// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot and update records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::EmptyDataKind;
use crate::response::{Circuit, Circuits, HardwareStatus, PanelTelemetry, StorageBattery};

/// One complete view of the panel at a point in time.
///
/// Snapshots are immutable once published. `generation` counts successful
/// refreshes; the initial empty snapshot is generation 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelSnapshot {
    /// Number of the refresh that produced this snapshot.
    pub generation: u64,
    /// When the snapshot was assembled.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Hardware status.
    pub status: Option<HardwareStatus>,
    /// Panel telemetry.
    pub panel: Option<PanelTelemetry>,
    /// Circuits keyed by id.
    pub circuits: Circuits,
    /// Storage battery, if battery reporting is enabled.
    pub battery: Option<StorageBattery>,
}

impl PanelSnapshot {
    /// Creates the initial empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if no refresh has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.panel.is_none() && self.circuits.is_empty()
    }

    /// Returns a circuit by id.
    #[must_use]
    pub fn circuit(&self, circuit_id: &str) -> Option<&Circuit> {
        self.circuits.get(circuit_id)
    }

    /// Returns the panel serial number, once known.
    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.serial_number.as_str())
    }
}

/// Storage battery outcome of one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryReading {
    /// Battery reporting is disabled; nothing was fetched.
    NotRequested,
    /// The panel returned an empty `soe` object.
    Empty,
    /// A decoded reading.
    Reported(StorageBattery),
}

impl BatteryReading {
    fn into_option(self) -> Option<StorageBattery> {
        match self {
            Self::Reported(battery) => Some(battery),
            Self::NotRequested | Self::Empty => None,
        }
    }
}

impl From<Option<StorageBattery>> for BatteryReading {
    fn from(decoded: Option<StorageBattery>) -> Self {
        decoded.map_or(Self::Empty, Self::Reported)
    }
}

/// Everything fetched in one refresh cycle, before it is published.
#[derive(Debug, Clone)]
pub struct PanelUpdate {
    /// Hardware status.
    pub status: HardwareStatus,
    /// Panel telemetry.
    pub panel: PanelTelemetry,
    /// Circuits keyed by id.
    pub circuits: Circuits,
    /// Storage battery outcome.
    pub battery: BatteryReading,
}

impl PanelUpdate {
    /// Applies the empty-data predicate of each payload, in fetch order.
    ///
    /// - telemetry: main relay reports `UNKNOWN`
    /// - circuits: the collection is empty
    /// - storage battery: requested but the `soe` object was missing or empty
    #[must_use]
    pub fn empty_data(&self) -> Option<EmptyDataKind> {
        if self.panel.is_empty_response() {
            Some(EmptyDataKind::Panel)
        } else if self.circuits.is_empty() {
            Some(EmptyDataKind::Circuits)
        } else if self.battery == BatteryReading::Empty {
            Some(EmptyDataKind::StorageBattery)
        } else {
            None
        }
    }

    pub(crate) fn into_snapshot(self, generation: u64, refreshed_at: DateTime<Utc>) -> PanelSnapshot {
        PanelSnapshot {
            generation,
            refreshed_at: Some(refreshed_at),
            status: Some(self.status),
            panel: Some(self.panel),
            circuits: self.circuits,
            battery: self.battery.into_option(),
        }
    }
}
