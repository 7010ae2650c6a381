// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel state snapshots.
//!
//! A [`PanelSnapshot`] is one complete, internally consistent view of the
//! panel. The [`PanelStateStore`] holds exactly one of them and swaps it
//! wholesale; readers capture an `Arc` once and never see a mix of two
//! refresh cycles.
//!
//! # Examples
//!
//! ```
//! use span_panel_lib::state::PanelStateStore;
//!
//! let store = PanelStateStore::new();
//! let snapshot = store.current();
//!
//! assert!(snapshot.is_empty());
//! assert_eq!(snapshot.generation, 0);
//! ```

mod snapshot;
mod store;

pub use snapshot::{BatteryReading, PanelSnapshot, PanelUpdate};
pub use store::PanelStateStore;
