// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circuit decoding (`/api/v1/circuits`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::{CircuitPriority, CircuitRelayState};

/// Circuits keyed by their stable identifier.
pub type Circuits = HashMap<String, Circuit>;

/// One branch circuit of the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
// Each flag is an independent capability reported by the panel.
#[allow(clippy::struct_excessive_bools)]
pub struct Circuit {
    /// Stable identifier.
    #[serde(rename = "id")]
    pub circuit_id: String,
    /// Display name.
    pub name: String,
    /// Relay state.
    pub relay_state: CircuitRelayState,
    /// Instantaneous power, W. Sign follows the panel's convention.
    #[serde(rename = "instantPowerW")]
    pub instant_power_w: f64,
    /// When `instant_power_w` was sampled, epoch seconds.
    #[serde(rename = "instantPowerUpdateTimeS")]
    pub instant_power_update_time_s: i64,
    /// Energy produced, Wh.
    #[serde(rename = "producedEnergyWh")]
    pub produced_energy_wh: f64,
    /// Energy consumed, Wh.
    #[serde(rename = "consumedEnergyWh")]
    pub consumed_energy_wh: f64,
    /// When the energy counters were accumulated, epoch seconds.
    #[serde(rename = "energyAccumUpdateTimeS")]
    pub energy_accum_update_time_s: i64,
    /// Physical breaker positions.
    pub tabs: Vec<u32>,
    /// Load-shedding priority.
    pub priority: CircuitPriority,
    /// The relay may be switched by the user.
    pub is_user_controllable: bool,
    /// The panel may shed this circuit.
    pub is_sheddable: bool,
    /// Never powered from backup.
    pub is_never_backup: bool,
}

impl Circuit {
    /// Returns `true` if the relay is closed.
    #[must_use]
    pub fn is_relay_closed(&self) -> bool {
        self.relay_state == CircuitRelayState::Closed
    }

    /// Sample time of the instantaneous power reading.
    #[must_use]
    pub fn instant_power_updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.instant_power_update_time_s, 0)
    }

    /// Accumulation time of the energy counters.
    #[must_use]
    pub fn energy_updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.energy_accum_update_time_s, 0)
    }
}

#[derive(Deserialize)]
struct RawCircuits {
    circuits: HashMap<String, serde_json::Value>,
}

/// Decodes an `/api/v1/circuits` body.
///
/// Decoding is fail-fast: a single malformed circuit fails the whole
/// collection, and the error names the offending circuit. An empty
/// collection decodes successfully; whether that counts as empty data is
/// decided by the state store.
///
/// # Errors
///
/// Returns `ParseError::Json` if the body or the `circuits` object is
/// malformed, or `ParseError::InvalidValue` naming the circuit that failed.
pub fn decode_circuits(body: &str) -> Result<Circuits, ParseError> {
    let raw: RawCircuits = serde_json::from_str(body)?;

    let circuits = raw
        .circuits
        .into_iter()
        .map(|(key, value)| {
            serde_json::from_value::<Circuit>(value)
                .map(|circuit| (key.clone(), circuit))
                .map_err(|e| ParseError::InvalidValue {
                    field: format!("circuits.{key}"),
                    message: e.to_string(),
                })
        })
        .collect::<Result<Circuits, _>>()?;

    tracing::debug!(count = circuits.len(), "Decoded circuits");

    Ok(circuits)
}
