// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel payloads and mock helpers shared by the integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SERIAL: &str = "nj-2316-005k6";
pub const TOKEN: &str = "test-token";

/// Returns the mock server address the way a user would type it.
pub fn host(server: &MockServer) -> String {
    server.uri().replace("http://", "")
}

/// Status document for firmware that reports `proximityProven`.
pub fn status_json(serial: &str, proximity_proven: bool) -> Value {
    let mut status = legacy_status_json(serial, 0);
    let system = &mut status["system"];
    system["proximityProven"] = json!(proximity_proven);
    if let Some(system) = system.as_object_mut() {
        system.remove("remainingAuthUnlockButtonPresses");
    }
    status
}

/// Status document for firmware that counts door-button presses.
pub fn legacy_status_json(serial: &str, remaining_presses: u32) -> Value {
    json!({
        "software": {"firmwareVersion": "spanos2/r202216/01", "updateStatus": "IDLE", "env": "prod"},
        "system": {
            "manufacturer": "Span",
            "serial": serial,
            "model": "00200",
            "doorState": "CLOSED",
            "uptime": 8927,
            "remainingAuthUnlockButtonPresses": remaining_presses
        },
        "network": {"eth0Link": true, "wlanLink": true, "wwanLink": false}
    })
}

pub fn panel_json(relay: &str) -> Value {
    json!({
        "mainRelayState": relay,
        "mainMeterEnergy": {"producedEnergyWh": 120.5, "consumedEnergyWh": 98_000.25},
        "instantGridPowerW": 1842.5,
        "feedthroughPowerW": 0.0,
        "feedthroughEnergy": {"producedEnergyWh": 0.0, "consumedEnergyWh": 0.0},
        "gridSampleStartMs": 1_700_000_000_000_i64,
        "gridSampleEndMs": 1_700_000_000_500_i64,
        "dsmGridState": "DSM_GRID_UP",
        "dsmState": "DSM_ON_GRID",
        "currentRunConfig": "PANEL_ON_GRID",
        "branches": [
            {"instantPowerW": -400.0, "importedActiveEnergyWh": 10.0, "exportedActiveEnergyWh": 500.0},
            {"instantPowerW": -600.0, "importedActiveEnergyWh": 20.0, "exportedActiveEnergyWh": 700.0}
        ]
    })
}

pub fn circuit_json(id: &str, controllable: bool) -> Value {
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

pub fn circuits_json() -> Value {
    json!({
        "circuits": {
            "kitchen": circuit_json("kitchen", true),
            "mains-feed": circuit_json("mains-feed", false)
        }
    })
}

pub fn battery_json(percentage: u8) -> Value {
    json!({ "soe": { "percentage": percentage } })
}

/// Mounts `GET path` answering `body`.
pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts status, panel and circuits for a healthy panel.
pub async fn mount_healthy_panel(server: &MockServer) {
    mount_get(server, "/api/v1/status", status_json(SERIAL, false)).await;
    mount_get(server, "/api/v1/panel", panel_json("CLOSED")).await;
    mount_get(server, "/api/v1/circuits", circuits_json()).await;
}
