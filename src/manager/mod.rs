// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of paired panels.
//!
//! The hosting process owns one [`PanelRegistry`] and passes it by
//! reference to the pairing flow and to whatever builds the coordinators.
//! Entries are serializable so the host can persist them however it likes.
//!
//! # Examples
//!
//! ```
//! use span_panel_lib::manager::{PanelEntry, PanelRegistry};
//!
//! let registry = PanelRegistry::new();
//! let id = registry
//!     .insert_unique(PanelEntry::new("nj-2316-005k6", "192.168.1.50", "token"))
//!     .unwrap();
//!
//! let entry = registry.get(id).unwrap();
//! assert_eq!(entry.title, "SPAN Panel nj-2316-005k6");
//!
//! let persisted = serde_json::to_string(&registry.entries()).unwrap();
//! let restored = PanelRegistry::from_entries(serde_json::from_str::<Vec<PanelEntry>>(&persisted).unwrap());
//! assert_eq!(restored.len(), 1);
//! ```

mod entry;
mod registry;

pub use entry::PanelEntry;
pub use registry::PanelRegistry;
