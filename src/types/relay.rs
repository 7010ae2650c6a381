// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relay states reported by the panel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// State of a single circuit's relay.
///
/// # Examples
///
/// ```
/// use span_panel_lib::types::CircuitRelayState;
///
/// assert_eq!(CircuitRelayState::Closed.as_str(), "CLOSED");
/// assert_eq!("open".parse::<CircuitRelayState>().unwrap(), CircuitRelayState::Open);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitRelayState {
    /// Relay open, circuit de-energised.
    Open,
    /// Relay closed, circuit energised.
    Closed,
    /// Any value the panel reports that is not OPEN or CLOSED.
    #[serde(other)]
    Unknown,
}

impl CircuitRelayState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns `true` if the state can be sent in a relay command.
    #[must_use]
    pub const fn is_commandable(&self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }
}

impl fmt::Display for CircuitRelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitRelayState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(ValueError::InvalidVariant {
                kind: "relay state",
                value: s.to_string(),
            }),
        }
    }
}

impl From<bool> for CircuitRelayState {
    /// `true` closes the relay (switch on).
    fn from(closed: bool) -> Self {
        if closed { Self::Closed } else { Self::Open }
    }
}

/// State of the panel's main relay.
///
/// `Unknown` is a sentinel: the panel reports it when it answers with an
/// empty telemetry document, so it never describes real state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MainRelayState {
    /// Main relay open.
    Open,
    /// Main relay closed.
    Closed,
    /// Reserved sentinel for an empty response.
    Unknown,
}

impl MainRelayState {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns `true` for the empty-response sentinel.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for MainRelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
