// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for SPAN panel state and commands.
//!
//! # Types
//!
//! - [`CircuitRelayState`] - OPEN/CLOSED state of a circuit breaker relay
//! - [`MainRelayState`] - State of the main relay, including the `UNKNOWN` sentinel
//! - [`CircuitPriority`] - Load-shedding priority of a circuit
//! - [`DoorState`] - Panel door tamper sensor
//! - [`BranchLeg`] - 1-based branch index used for solar aggregates

mod door;
mod leg;
mod priority;
mod relay;

pub use door::DoorState;
pub use leg::BranchLeg;
pub use priority::CircuitPriority;
pub use relay::{CircuitRelayState, MainRelayState};
