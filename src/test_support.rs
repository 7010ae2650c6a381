// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON fixtures shared by unit tests.

use serde_json::{Value, json};

use crate::options::SolarOptions;
use crate::response::{Circuits, HardwareStatus, PanelTelemetry, decode_circuits, decode_panel, decode_status};

pub(crate) fn status_json(serial: &str) -> Value {
    json!({
        "software": {"firmwareVersion": "spanos2/r202342/04", "updateStatus": "IDLE", "env": "prod"},
        "system": {
            "manufacturer": "Span",
            "serial": serial,
            "model": "00200",
            "doorState": "CLOSED",
            "uptime": 8927,
            "proximityProven": false
        },
        "network": {"eth0Link": true, "wlanLink": false, "wwanLink": false}
    })
}

pub(crate) fn panel_json(relay: &str, grid_power_w: f64) -> Value {
    json!({
        "mainRelayState": relay,
        "mainMeterEnergy": {"producedEnergyWh": 10.5, "consumedEnergyWh": 2000.25},
        "instantGridPowerW": grid_power_w,
        "feedthroughPowerW": 0.0,
        "feedthroughEnergy": {"producedEnergyWh": 0.0, "consumedEnergyWh": 0.0},
        "gridSampleStartMs": 1_700_000_000_000_i64,
        "gridSampleEndMs": 1_700_000_000_500_i64,
        "dsmGridState": "DSM_GRID_UP",
        "dsmState": "DSM_ON_GRID",
        "currentRunConfig": "PANEL_ON_GRID",
        "branches": []
    })
}

pub(crate) fn circuit_json(id: &str, controllable: bool) -> Value {
    json!({
        "id": id,
        "name": format!("Circuit {id}"),
        "relayState": "CLOSED",
        "instantPowerW": -150.5,
        "instantPowerUpdateTimeS": 1_700_000_000,
        "producedEnergyWh": 1.5,
        "consumedEnergyWh": 4200.75,
        "energyAccumUpdateTimeS": 1_700_000_000,
        "tabs": [1, 3],
        "priority": "MUST_HAVE",
        "isUserControllable": controllable,
        "isSheddable": true,
        "isNeverBackup": false
    })
}

pub(crate) fn circuits_json(circuits: &[Value]) -> Value {
    let map: serde_json::Map<String, Value> = circuits
        .iter()
        .map(|c| (c["id"].as_str().unwrap_or_default().to_string(), c.clone()))
        .collect();
    json!({ "circuits": map })
}

pub(crate) fn status(serial: &str) -> HardwareStatus {
    decode_status(&status_json(serial).to_string()).unwrap()
}

pub(crate) fn panel(relay: &str, grid_power_w: f64) -> PanelTelemetry {
    decode_panel(&panel_json(relay, grid_power_w).to_string(), &SolarOptions::default()).unwrap()
}

pub(crate) fn circuits(ids: &[&str]) -> Circuits {
    let entries: Vec<_> = ids.iter().map(|id| circuit_json(id, true)).collect();
    decode_circuits(&circuits_json(&entries).to_string()).unwrap()
}
