// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for panel polling and control.
//!
//! The [`EventBus`] uses tokio's broadcast channel so any number of
//! observers can follow refreshes, failures and commands. One bus may be
//! shared by the coordinators of several panels; every event names the
//! panel host.
//!
//! # Examples
//!
//! ```
//! use span_panel_lib::event::{EventBus, PanelEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(PanelEvent::updated("192.168.1.50", 1));
//! ```

mod entry_id;
mod event_bus;
mod panel_event;

pub use entry_id::EntryId;
pub use event_bus::EventBus;
pub use panel_event::PanelEvent;
