// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel telemetry decoding (`/api/v1/panel`).

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::options::SolarOptions;
use crate::types::MainRelayState;

/// Cumulative produced/consumed energy counters in watt-hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyCounters {
    /// Energy produced (exported), Wh.
    #[serde(rename = "producedEnergyWh")]
    pub produced_wh: f64,
    /// Energy consumed (imported), Wh.
    #[serde(rename = "consumedEnergyWh")]
    pub consumed_wh: f64,
}

/// Solar inverter figures summed over the configured branch legs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolarAggregate {
    /// Instantaneous power, W.
    pub instant_power_w: f64,
    /// Energy produced, Wh.
    pub energy_produced_wh: f64,
    /// Energy consumed, Wh.
    pub energy_consumed_wh: f64,
}

/// Whole-panel telemetry for one sample window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelTelemetry {
    /// Main relay state. [`MainRelayState::Unknown`] marks an empty response.
    pub main_relay_state: MainRelayState,
    /// Main meter counters.
    pub main_meter_energy: EnergyCounters,
    /// Instantaneous grid power, W.
    pub instant_grid_power_w: f64,
    /// Instantaneous feedthrough power, W.
    pub feedthrough_power_w: f64,
    /// Feedthrough counters.
    pub feedthrough_energy: EnergyCounters,
    /// Start of the sample window, epoch milliseconds.
    pub grid_sample_start_ms: i64,
    /// End of the sample window, epoch milliseconds.
    pub grid_sample_end_ms: i64,
    /// Demand-side-management grid state.
    pub dsm_grid_state: String,
    /// Demand-side-management system state.
    pub dsm_state: String,
    /// Current run configuration.
    pub current_run_config: String,
    /// Number of branches the panel reported.
    pub branch_count: usize,
    /// Solar inverter aggregate; all zeros when solar reporting is disabled.
    pub solar: SolarAggregate,
}

impl PanelTelemetry {
    /// Returns `true` if this document is the panel's empty-response sentinel.
    #[must_use]
    pub fn is_empty_response(&self) -> bool {
        self.main_relay_state.is_sentinel()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPanel {
    main_relay_state: MainRelayState,
    main_meter_energy: EnergyCounters,
    instant_grid_power_w: f64,
    feedthrough_power_w: f64,
    feedthrough_energy: EnergyCounters,
    grid_sample_start_ms: i64,
    grid_sample_end_ms: i64,
    dsm_grid_state: String,
    dsm_state: String,
    current_run_config: String,
    #[serde(default)]
    branches: Vec<RawBranch>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBranch {
    instant_power_w: f64,
    imported_active_energy_wh: f64,
    exported_active_energy_wh: f64,
}

/// Decodes an `/api/v1/panel` body.
///
/// When `solar.enabled`, the inverter aggregate sums the configured legs
/// against the branch array. A leg that is unset or beyond the number of
/// branches contributes zero instead of failing the decode.
///
/// # Errors
///
/// Returns `ParseError::Json` if the body is not JSON or any required
/// telemetry field is missing.
pub fn decode_panel(body: &str, solar: &SolarOptions) -> Result<PanelTelemetry, ParseError> {
    let raw: RawPanel = serde_json::from_str(body)?;

    let solar_aggregate = if solar.enabled {
        sum_legs(&raw.branches, solar)
    } else {
        SolarAggregate::default()
    };

    let telemetry = PanelTelemetry {
        main_relay_state: raw.main_relay_state,
        main_meter_energy: raw.main_meter_energy,
        instant_grid_power_w: raw.instant_grid_power_w,
        feedthrough_power_w: raw.feedthrough_power_w,
        feedthrough_energy: raw.feedthrough_energy,
        grid_sample_start_ms: raw.grid_sample_start_ms,
        grid_sample_end_ms: raw.grid_sample_end_ms,
        dsm_grid_state: raw.dsm_grid_state,
        dsm_state: raw.dsm_state,
        current_run_config: raw.current_run_config,
        branch_count: raw.branches.len(),
        solar: solar_aggregate,
    };

    tracing::debug!(
        relay = %telemetry.main_relay_state,
        grid_power_w = telemetry.instant_grid_power_w,
        branches = telemetry.branch_count,
        "Decoded panel telemetry"
    );

    Ok(telemetry)
}

fn sum_legs(branches: &[RawBranch], solar: &SolarOptions) -> SolarAggregate {
    let mut aggregate = SolarAggregate::default();
    for leg in solar.configured_legs() {
        let Some(branch) = leg.position(branches.len()).and_then(|i| branches.get(i)) else {
            tracing::debug!(leg = %leg, branches = branches.len(), "Solar leg out of range, ignoring");
            continue;
        };
        // The panel's import/export naming is from the branch's point of view.
        aggregate.instant_power_w += branch.instant_power_w;
        aggregate.energy_produced_wh += branch.imported_active_energy_wh;
        aggregate.energy_consumed_wh += branch.exported_active_energy_wh;
    }
    aggregate
}
