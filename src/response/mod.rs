// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed decoders for SPAN panel JSON payloads.
//!
//! Each endpoint has a pure decode function that turns a response body into
//! an owned record. Decoders never hold on to the input, so every record can
//! be stored in a snapshot for as long as needed.
//!
//! | Endpoint | Decoder | Record |
//! |---|---|---|
//! | `/api/v1/status` | [`decode_status`] | [`HardwareStatus`] |
//! | `/api/v1/panel` | [`decode_panel`] | [`PanelTelemetry`] |
//! | `/api/v1/circuits` | [`decode_circuits`] | [`Circuit`] map |
//! | `/api/v1/storage/soe` | [`decode_storage_battery`] | [`StorageBattery`] |
//! | `/api/v1/auth/register` | [`decode_access_token`] | token string |

mod battery;
mod circuit;
mod panel;
mod status;

pub use battery::{StorageBattery, decode_storage_battery};
pub use circuit::{Circuit, Circuits, decode_circuits};
pub use panel::{EnergyCounters, PanelTelemetry, SolarAggregate, decode_panel};
pub use status::{HardwareStatus, ProximitySignal, decode_status};

use serde::Deserialize;

use crate::error::ParseError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    access_token: String,
}

/// Extracts the access token from an `/api/v1/auth/register` answer.
///
/// # Errors
///
/// Returns `ParseError` if the body is not JSON, lacks `accessToken`, or the
/// token is blank.
pub fn decode_access_token(body: &str) -> Result<String, ParseError> {
    let response: RegisterResponse = serde_json::from_str(body)?;
    if response.access_token.trim().is_empty() {
        return Err(ParseError::InvalidValue {
            field: "accessToken".to_string(),
            message: "token is empty".to_string(),
        });
    }
    Ok(response.access_token)
}
