// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for [`PanelEvent`]s.

use tokio::sync::broadcast;

use super::PanelEvent;

/// Events buffered per subscriber before the oldest are dropped.
const EVENT_BACKLOG: usize = 256;

/// Fan-out of panel events to any number of subscribers.
///
/// Clones share one channel, so a bus handed to several panels merges
/// their events into a single stream; [`PanelEvent::host`] tells them
/// apart. A subscriber that falls more than the backlog behind receives
/// `RecvError::Lagged` and continues with the newest events.
///
/// # Examples
///
/// ```
/// use span_panel_lib::event::{EventBus, PanelEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PanelEvent::updated("192.168.1.50", 7));
/// assert_eq!(rx.try_recv().unwrap().host(), "192.168.1.50");
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PanelEvent>,
}

impl EventBus {
    /// Creates a bus with the default backlog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(EVENT_BACKLOG)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sender: broadcast::channel(capacity).0,
        }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Sends `event` to every current subscriber.
    ///
    /// Never blocks. With no subscribers the event is dropped.
    pub fn publish(&self, event: PanelEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(host = %event.host(), "No event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
