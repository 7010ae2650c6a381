// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel door tamper sensor state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of the panel door.
///
/// The sensor is a tamper switch; panels report `UNKNOWN` when the door has
/// not been operated recently. Anything other than OPEN or CLOSED decodes to
/// [`DoorState::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorState {
    /// Door open.
    Open,
    /// Door closed.
    Closed,
    /// Unknown or unrecognised.
    #[default]
    #[serde(other)]
    Unknown,
}

impl DoorState {
    /// Returns `Some(true)` when closed, `Some(false)` when open, `None` otherwise.
    #[must_use]
    pub const fn is_closed(&self) -> Option<bool> {
        match self {
            Self::Open => Some(false),
            Self::Closed => Some(true),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_for_unrecognised_value() {
        let door: DoorState = serde_json::from_str(r#""AJAR""#).unwrap();
        assert_eq!(door, DoorState::Unknown);
        assert_eq!(door.is_closed(), None);
    }

    #[test]
    fn closed_and_open() {
        assert_eq!(DoorState::Closed.is_closed(), Some(true));
        assert_eq!(DoorState::Open.is_closed(), Some(false));
    }
}
