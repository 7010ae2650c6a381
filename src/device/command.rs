// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circuit commands.

use serde_json::{Value, json};

use crate::error::ValueError;
use crate::types::{CircuitPriority, CircuitRelayState};

/// A change requested on one circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitCommand {
    /// Open or close the circuit relay.
    Relay(CircuitRelayState),
    /// Change the load-shedding priority.
    Priority(CircuitPriority),
}

impl CircuitCommand {
    /// Checks that the panel accepts this value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` for the `UNKNOWN` relay state or priority.
    pub fn validate(&self) -> Result<(), ValueError> {
        match self {
            Self::Relay(state) if !state.is_commandable() => {
                Err(ValueError::RelayStateNotCommandable(state.to_string()))
            }
            Self::Priority(priority) if !priority.is_commandable() => {
                Err(ValueError::PriorityNotCommandable(priority.as_str().to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Returns the JSON body for `POST /api/v1/circuits/{id}`.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Relay(state) => json!({ "relayStateIn": { "relayState": state.as_str() } }),
            Self::Priority(priority) => json!({ "priorityIn": { "priority": priority.as_str() } }),
        }
    }
}

impl std::fmt::Display for CircuitCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relay(state) => write!(f, "relay {state}"),
            Self::Priority(priority) => write!(f, "priority {}", priority.as_str()),
        }
    }
}
