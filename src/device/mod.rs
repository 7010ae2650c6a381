// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level panel abstraction.
//!
//! A [`SpanPanel`] ties one transport to one [`PanelStateStore`]. It knows
//! how to fetch and decode a complete refresh, how to publish it, and how to
//! send circuit commands. Scheduling is left to the
//! [`PollingCoordinator`](crate::coordinator::PollingCoordinator).
//!
//! ```no_run
//! use span_panel_lib::SpanPanel;
//! use span_panel_lib::types::CircuitRelayState;
//!
//! # async fn example() -> span_panel_lib::Result<()> {
//! let panel = SpanPanel::http("192.168.1.50")
//!     .with_access_token("token-from-pairing")
//!     .build()
//!     .await?;
//!
//! let snapshot = panel.update().await?;
//! println!("{} circuits", snapshot.circuits.len());
//!
//! panel.set_relay("0dad2f16cd514812ae1807b0457d473e", CircuitRelayState::Open).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod command;

pub use builder::PanelBuilder;
pub use command::CircuitCommand;

use std::sync::Arc;

use tokio::sync::{Notify, watch};

use crate::error::Error;
use crate::event::{EventBus, PanelEvent};
use crate::options::PanelOptions;
use crate::protocol::{Auth, PanelConfig, PanelProtocol, endpoints};
use crate::response::{
    Circuits, HardwareStatus, PanelTelemetry, StorageBattery, decode_circuits, decode_panel,
    decode_status, decode_storage_battery,
};
use crate::state::{BatteryReading, PanelSnapshot, PanelStateStore, PanelUpdate};
use crate::types::{CircuitPriority, CircuitRelayState};

/// A SPAN panel reachable through protocol `P`.
///
/// Cloning is cheap; clones share the transport, the snapshot store, the
/// event bus and the refresh trigger.
#[derive(Debug)]
pub struct SpanPanel<P: PanelProtocol> {
    protocol: Arc<P>,
    store: Arc<PanelStateStore>,
    options: PanelOptions,
    events: EventBus,
    refresh: Arc<Notify>,
}

impl<P: PanelProtocol> Clone for SpanPanel<P> {
    fn clone(&self) -> Self {
        Self {
            protocol: Arc::clone(&self.protocol),
            store: Arc::clone(&self.store),
            options: self.options.clone(),
            events: self.events.clone(),
            refresh: Arc::clone(&self.refresh),
        }
    }
}

impl<P: PanelProtocol> SpanPanel<P> {
    /// Creates a panel over an existing transport.
    #[must_use]
    pub fn new(protocol: P, options: PanelOptions) -> Self {
        Self::with_event_bus(protocol, options, EventBus::new())
    }

    /// Creates a panel that publishes to an existing event bus.
    #[must_use]
    pub fn with_event_bus(protocol: P, options: PanelOptions, events: EventBus) -> Self {
        Self {
            protocol: Arc::new(protocol),
            store: Arc::new(PanelStateStore::new()),
            options,
            events,
            refresh: Arc::new(Notify::new()),
        }
    }

    /// Returns the transport.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Returns the panel host.
    #[must_use]
    pub fn host(&self) -> &str {
        self.protocol.host()
    }

    /// Returns the reporting options.
    #[must_use]
    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    /// Returns the snapshot store.
    #[must_use]
    pub fn store(&self) -> &Arc<PanelStateStore> {
        &self.store
    }

    /// Returns the event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<PanelSnapshot> {
        self.store.current()
    }

    /// Subscribes to published snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<PanelSnapshot>> {
        self.store.subscribe()
    }

    // ========== Fetching ==========

    /// Fetches the hardware status.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the decode fails.
    pub async fn fetch_status(&self) -> Result<HardwareStatus, Error> {
        let response = self.protocol.fetch(endpoints::STATUS, &[], Auth::None).await?;
        Ok(decode_status(response.body())?)
    }

    /// Fetches panel telemetry, computing solar aggregates per the options.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the decode fails.
    pub async fn fetch_panel(&self) -> Result<PanelTelemetry, Error> {
        let response = self.protocol.fetch(endpoints::PANEL, &[], Auth::Bearer).await?;
        Ok(decode_panel(response.body(), self.options.solar())?)
    }

    /// Fetches the circuit collection.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the decode fails.
    pub async fn fetch_circuits(&self) -> Result<Circuits, Error> {
        let response = self.protocol.fetch(endpoints::CIRCUITS, &[], Auth::Bearer).await?;
        Ok(decode_circuits(response.body())?)
    }

    /// Fetches the storage battery state of energy.
    ///
    /// Returns `None` if the panel reports an empty `soe` object.
    ///
    /// # Errors
    ///
    /// Returns error if the request or the decode fails.
    pub async fn fetch_storage_battery(&self) -> Result<Option<StorageBattery>, Error> {
        let response = self
            .protocol
            .fetch(endpoints::STORAGE_SOE, &[], Auth::Bearer)
            .await?;
        Ok(decode_storage_battery(response.body())?)
    }

    async fn fetch_battery_reading(&self) -> Result<BatteryReading, Error> {
        if !self.options.battery_enabled() {
            return Ok(BatteryReading::NotRequested);
        }
        self.fetch_storage_battery().await.map(BatteryReading::from)
    }

    /// Fetches every payload of one refresh concurrently.
    ///
    /// The storage battery is only requested when enabled in the options.
    /// The first failure cancels the remaining requests.
    ///
    /// # Errors
    ///
    /// Returns the first request or decode error.
    pub async fn fetch_update(&self) -> Result<PanelUpdate, Error> {
        let (status, panel, circuits, battery) = tokio::try_join!(
            self.fetch_status(),
            self.fetch_panel(),
            self.fetch_circuits(),
            self.fetch_battery_reading(),
        )?;

        Ok(PanelUpdate {
            status,
            panel,
            circuits,
            battery,
        })
    }

    /// Fetches a complete refresh and publishes it.
    ///
    /// # Errors
    ///
    /// Returns the first request or decode error, or `Error::EmptyData` if
    /// the panel answered with empty data; the previous snapshot is kept in
    /// both cases.
    pub async fn update(&self) -> Result<Arc<PanelSnapshot>, Error> {
        let update = self.fetch_update().await?;
        Ok(self.store.apply(update)?)
    }

    // ========== Circuit Control ==========

    /// Opens or closes a circuit relay, then requests a refresh.
    ///
    /// # Errors
    ///
    /// Returns error if the state is `UNKNOWN`, the circuit is unknown or
    /// not user controllable, or the request fails.
    pub async fn set_relay(&self, circuit_id: &str, state: CircuitRelayState) -> Result<(), Error> {
        self.send_circuit_command(circuit_id, CircuitCommand::Relay(state))
            .await
    }

    /// Changes a circuit's priority, then requests a refresh.
    ///
    /// # Errors
    ///
    /// Returns error if the priority is `UNKNOWN`, the circuit is unknown or
    /// not user controllable, or the request fails.
    pub async fn set_priority(
        &self,
        circuit_id: &str,
        priority: CircuitPriority,
    ) -> Result<(), Error> {
        self.send_circuit_command(circuit_id, CircuitCommand::Priority(priority))
            .await
    }

    /// Sends a circuit command, then requests a refresh.
    ///
    /// The circuit must be present in the current snapshot and be user
    /// controllable.
    ///
    /// # Errors
    ///
    /// Returns error if validation or the request fails.
    pub async fn send_circuit_command(
        &self,
        circuit_id: &str,
        command: CircuitCommand,
    ) -> Result<(), Error> {
        command.validate()?;

        let snapshot = self.store.current();
        let circuit = snapshot
            .circuit(circuit_id)
            .ok_or_else(|| Error::CircuitNotFound(circuit_id.to_string()))?;
        if !circuit.is_user_controllable {
            return Err(Error::CircuitNotControllable(circuit_id.to_string()));
        }

        tracing::debug!(host = %self.host(), circuit = %circuit_id, command = %command, "Sending circuit command");

        self.protocol
            .post(&endpoints::circuit(circuit_id), &command.body(), Auth::Bearer)
            .await?;

        self.events.publish(PanelEvent::CommandSent {
            host: self.host().to_string(),
            circuit_id: circuit_id.to_string(),
            command,
        });
        self.request_refresh();
        Ok(())
    }

    // ========== Refresh Trigger ==========

    /// Asks the coordinator to refresh ahead of its schedule.
    ///
    /// Requests made before the coordinator wakes are coalesced into one.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Waits for the next [`request_refresh`](Self::request_refresh).
    pub(crate) async fn refresh_requested(&self) {
        self.refresh.notified().await;
    }
}

impl SpanPanel<crate::protocol::HttpClient> {
    /// Creates a builder for an HTTP panel.
    ///
    /// # Examples
    ///
    /// ```
    /// use span_panel_lib::SpanPanel;
    ///
    /// let panel = SpanPanel::http("192.168.1.50")
    ///     .with_access_token("token")
    ///     .build_without_probe()
    ///     .unwrap();
    /// assert_eq!(panel.host(), "192.168.1.50");
    /// ```
    #[must_use]
    pub fn http(host: impl AsRef<str>) -> PanelBuilder {
        PanelBuilder::new(PanelConfig::new(host))
    }

    /// Creates a builder from a full connection configuration.
    #[must_use]
    pub fn http_config(config: PanelConfig) -> PanelBuilder {
        PanelBuilder::new(config)
    }

    /// Installs a new bearer token, e.g. after re-pairing.
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.protocol.set_access_token(Some(token.into()));
    }
}
