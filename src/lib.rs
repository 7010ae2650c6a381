// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `span_panel_lib` - A Rust library to poll and pair SPAN smart electrical
//! panels over their local REST API.
//!
//! # Features
//!
//! - **Polling**: periodic refresh of status, telemetry, circuits and storage
//!   battery with bounded retry and a per-cycle timeout
//! - **Snapshots**: lock-free reads of one consistent panel state
//! - **Control**: circuit relay and priority commands
//! - **Pairing**: proof-of-proximity handshake for both firmware generations,
//!   or an existing token
//!
//! # Quick Start
//!
//! ## Pairing
//!
//! ```no_run
//! use span_panel_lib::manager::PanelRegistry;
//! use span_panel_lib::pairing::{AuthMethod, PairingFlow};
//!
//! # async fn example() -> Result<(), span_panel_lib::error::PairingError> {
//! let registry = PanelRegistry::new();
//! let mut flow = PairingFlow::new(&registry);
//!
//! flow.begin_user("192.168.1.50").await?;
//! flow.choose_method(AuthMethod::Token)?;
//! flow.submit_token("token-from-the-span-app").await?;
//! let entry = flow.resolve()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Polling
//!
//! ```no_run
//! use std::sync::Arc;
//! use span_panel_lib::{PollingCoordinator, SpanPanel};
//! use span_panel_lib::types::CircuitRelayState;
//!
//! #[tokio::main]
//! async fn main() -> span_panel_lib::Result<()> {
//!     let panel = SpanPanel::http("192.168.1.50")
//!         .with_access_token("token")
//!         .build()
//!         .await?;
//!
//!     let coordinator = Arc::new(PollingCoordinator::new(panel));
//!     let snapshot = coordinator.first_refresh().await?;
//!     for circuit in snapshot.circuits.values() {
//!         println!("{}: {} W", circuit.name, circuit.instant_power_w);
//!     }
//!
//!     let polling = Arc::clone(&coordinator).spawn();
//!
//!     coordinator
//!         .panel()
//!         .set_relay("0dad2f16cd514812ae1807b0457d473e", CircuitRelayState::Open)
//!         .await?;
//!
//!     polling.await.ok();
//!     Ok(())
//! }
//! ```

pub mod coordinator;
mod device;
pub mod error;
pub mod event;
pub mod manager;
pub mod options;
pub mod pairing;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use coordinator::{CoordinatorStatus, CycleOutcome, CyclePhase, PollingCoordinator};
pub use device::{CircuitCommand, PanelBuilder, SpanPanel};
pub use error::{Error, ParseError, ProtocolError, Result, Severity, ValueError};
pub use options::{PanelOptions, SolarOptions};
pub use protocol::{HttpClient, PanelConfig};
pub use state::{PanelSnapshot, PanelStateStore};
