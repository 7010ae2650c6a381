// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware status decoding (`/api/v1/status`).

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::DoorState;

/// Proof-of-proximity signal, which depends on the firmware generation.
///
/// Firmware r202342 and newer report a `proximityProven` flag; older
/// firmware reports how many door-button presses remain before a token can
/// be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProximitySignal {
    /// New firmware: `true` once proximity has been proven.
    Proven(bool),
    /// Legacy firmware: remaining unlock button presses; zero means proven.
    UnlockButtonPresses(u32),
}

impl ProximitySignal {
    /// Returns `true` if the panel will issue a token now.
    #[must_use]
    pub const fn is_proven(&self) -> bool {
        match self {
            Self::Proven(proven) => *proven,
            Self::UnlockButtonPresses(remaining) => *remaining == 0,
        }
    }

    /// Returns `true` for firmware that reports `proximityProven`.
    #[must_use]
    pub const fn is_new_firmware(&self) -> bool {
        matches!(self, Self::Proven(_))
    }
}

/// Hardware, software and connectivity status of the panel.
///
/// # Examples
///
/// ```
/// use span_panel_lib::response::decode_status;
///
/// let body = r#"{
///     "software": {"firmwareVersion": "spanos2/r202342/04", "updateStatus": "IDLE", "env": "prod"},
///     "system": {"manufacturer": "Span", "serial": "nj-2316-005k6", "model": "00200",
///                "doorState": "CLOSED", "proximityProven": false, "uptime": 8927},
///     "network": {"eth0Link": true, "wlanLink": true, "wwanLink": false}
/// }"#;
/// let status = decode_status(body).unwrap();
/// assert_eq!(status.serial_number, "nj-2316-005k6");
/// assert_eq!(status.is_door_closed(), Some(true));
/// assert_eq!(status.proximity_proven(), Some(false));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareStatus {
    /// Firmware version string.
    pub firmware_version: String,
    /// Firmware update status.
    pub update_status: String,
    /// Software environment tag.
    pub env: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Serial number; the panel's stable identity.
    pub serial_number: String,
    /// Model identifier.
    pub model: String,
    /// Door tamper sensor.
    pub door_state: DoorState,
    /// Uptime in seconds.
    pub uptime: u64,
    /// Ethernet link up.
    pub is_ethernet_connected: bool,
    /// Wi-Fi link up.
    pub is_wifi_connected: bool,
    /// Cellular link up.
    pub is_cellular_connected: bool,
    /// Proof-of-proximity signal for the running firmware.
    pub proximity: ProximitySignal,
}

impl HardwareStatus {
    /// Returns `Some(true)` if the door is closed, `None` when unknown.
    #[must_use]
    pub fn is_door_closed(&self) -> Option<bool> {
        self.door_state.is_closed()
    }

    /// New-firmware proximity flag; `None` on legacy firmware.
    #[must_use]
    pub fn proximity_proven(&self) -> Option<bool> {
        match self.proximity {
            ProximitySignal::Proven(proven) => Some(proven),
            ProximitySignal::UnlockButtonPresses(_) => None,
        }
    }

    /// Legacy-firmware remaining button presses; zero on new firmware.
    #[must_use]
    pub fn remaining_unlock_button_presses(&self) -> u32 {
        match self.proximity {
            ProximitySignal::Proven(_) => 0,
            ProximitySignal::UnlockButtonPresses(remaining) => remaining,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    software: RawSoftware,
    system: RawSystem,
    network: RawNetwork,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSoftware {
    firmware_version: String,
    update_status: String,
    env: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSystem {
    manufacturer: String,
    serial: String,
    model: String,
    #[serde(default)]
    door_state: Option<DoorState>,
    uptime: u64,
    #[serde(default)]
    proximity_proven: Option<bool>,
    #[serde(default)]
    remaining_auth_unlock_button_presses: Option<u32>,
}

#[derive(Deserialize)]
struct RawNetwork {
    #[serde(rename = "eth0Link")]
    eth0_link: bool,
    #[serde(rename = "wlanLink")]
    wlan_link: bool,
    #[serde(rename = "wwanLink")]
    wwan_link: bool,
}

/// Decodes an `/api/v1/status` body.
///
/// The presence of `system.proximityProven` selects the new-firmware
/// proximity signal; otherwise the legacy button-press counter is used,
/// defaulting to zero when absent.
///
/// # Errors
///
/// Returns `ParseError::Json` if the body is not JSON or a required field is
/// missing.
pub fn decode_status(body: &str) -> Result<HardwareStatus, ParseError> {
    let raw: RawStatus = serde_json::from_str(body)?;

    let proximity = match raw.system.proximity_proven {
        Some(proven) => ProximitySignal::Proven(proven),
        None => ProximitySignal::UnlockButtonPresses(
            raw.system.remaining_auth_unlock_button_presses.unwrap_or(0),
        ),
    };

    let status = HardwareStatus {
        firmware_version: raw.software.firmware_version,
        update_status: raw.software.update_status,
        env: raw.software.env,
        manufacturer: raw.system.manufacturer,
        serial_number: raw.system.serial,
        model: raw.system.model,
        door_state: raw.system.door_state.unwrap_or_default(),
        uptime: raw.system.uptime,
        is_ethernet_connected: raw.network.eth0_link,
        is_wifi_connected: raw.network.wlan_link,
        is_cellular_connected: raw.network.wwan_link,
        proximity,
    };

    tracing::debug!(
        serial = %status.serial_number,
        firmware = %status.firmware_version,
        proximity = ?status.proximity,
        "Decoded panel status"
    );

    Ok(status)
}
