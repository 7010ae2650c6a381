// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairing handshake.
//!
//! A [`PairingFlow`] walks an operator from a host address to a persisted
//! [`PanelEntry`](crate::manager::PanelEntry):
//!
//! ```text
//! Start -> HostValidated -> (choose method) -> ProximityWait | TokenWait
//!       -> TokenValidated -> EntryResolved -> Terminal
//! ```
//!
//! Proof of proximity comes in two firmware generations. Newer panels
//! report `proximityProven`; older ones count down the remaining presses of
//! the door unlock button. Either way the operator re-invokes
//! [`PairingFlow::poll_proximity`] until the panel is satisfied, and the
//! flow then registers a client to obtain a token.
//!
//! Step errors leave the flow where it was so the operator can retry.
//! Errors for which [`PairingError::is_abort`](crate::error::PairingError::is_abort)
//! holds end the flow in [`PairingStep::Terminal`].
//!
//! # Examples
//!
//! ```no_run
//! use span_panel_lib::manager::PanelRegistry;
//! use span_panel_lib::pairing::{AuthMethod, PairingFlow, PairingStep};
//!
//! # async fn example() -> Result<(), span_panel_lib::error::PairingError> {
//! let registry = PanelRegistry::new();
//! let mut flow = PairingFlow::new(&registry);
//!
//! flow.begin_user("192.168.1.50").await?;
//! flow.choose_method(AuthMethod::Proximity)?;
//!
//! // Ask the operator to open and close the panel door, then:
//! while !matches!(flow.poll_proximity().await?, PairingStep::TokenValidated) {
//!     // prompt again
//! }
//!
//! let entry = flow.resolve()?;
//! println!("paired {}", entry.serial_number);
//! # Ok(())
//! # }
//! ```

mod context;
mod flow;

pub use context::{AuthMethod, FlowKind, PairingContext};
pub use flow::{PairingFlow, PairingOutcome, PairingStep};
