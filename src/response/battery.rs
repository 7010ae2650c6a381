// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage battery decoding (`/api/v1/storage/soe`).

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// State of energy of the attached storage battery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBattery {
    /// State of charge, 0-100 %.
    pub percentage: u8,
}

#[derive(Deserialize)]
struct RawSoe {
    #[serde(default)]
    soe: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Decodes an `/api/v1/storage/soe` body.
///
/// Returns `Ok(None)` when the `soe` object is missing or empty, which the
/// panel sends instead of an error when it has no battery data. A present
/// object without `percentage` decodes as 0 %. Values above 100 are clamped.
///
/// # Errors
///
/// Returns `ParseError` if the body is not JSON or `percentage` is not a
/// non-negative number.
pub fn decode_storage_battery(body: &str) -> Result<Option<StorageBattery>, ParseError> {
    let raw: RawSoe = serde_json::from_str(body)?;

    let Some(soe) = raw.soe.filter(|soe| !soe.is_empty()) else {
        return Ok(None);
    };

    let percentage = match soe.get("percentage") {
        None | Some(serde_json::Value::Null) => 0,
        Some(value) => value
            .as_f64()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .map(|p| {
                // Clamped to 0..=100 first, so the cast is lossless.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let pct = p.round().min(100.0) as u8;
                pct
            })
            .ok_or_else(|| ParseError::InvalidValue {
                field: "soe.percentage".to_string(),
                message: format!("expected a percentage, got {value}"),
            })?,
    };

    tracing::debug!(percentage, "Decoded storage battery");

    Ok(Some(StorageBattery { percentage }))
}
