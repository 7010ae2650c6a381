// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP panel builder.

use std::time::Duration;

use crate::device::SpanPanel;
use crate::error::{Error, PairingError};
use crate::event::EventBus;
use crate::options::PanelOptions;
use crate::protocol::{HttpClient, PanelConfig, RetryPolicy};

/// Builder for HTTP-backed panels.
///
/// Created by [`SpanPanel::http`] or [`SpanPanel::http_config`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use span_panel_lib::SpanPanel;
/// use span_panel_lib::options::PanelOptions;
///
/// # async fn example() -> span_panel_lib::Result<()> {
/// // Probes the status endpoint before returning
/// let panel = SpanPanel::http("192.168.1.50")
///     .with_access_token("token")
///     .with_options(PanelOptions::default().with_battery(true))
///     .build()
///     .await?;
///
/// // No network access
/// let offline = SpanPanel::http("192.168.1.51")
///     .with_timeout(Duration::from_secs(10))
///     .build_without_probe()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PanelBuilder {
    config: PanelConfig,
    options: PanelOptions,
    events: Option<EventBus>,
}

impl PanelBuilder {
    pub(crate) fn new(config: PanelConfig) -> Self {
        Self {
            config,
            options: PanelOptions::default(),
            events: None,
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.with_access_token(token);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Sets the retry policy for `GET` requests.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.config = self.config.with_retry(retry);
        self
    }

    /// Sets the reporting options.
    #[must_use]
    pub fn with_options(mut self, options: PanelOptions) -> Self {
        self.options = options;
        self
    }

    /// Publishes events to an existing bus instead of a new one.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Returns the connection configuration.
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Builds the panel after checking that the host answers as a panel.
    ///
    /// # Errors
    ///
    /// Returns `PairingError::CannotConnect` if the status endpoint does not
    /// answer, or a decode error if it is not a panel status document.
    pub async fn build(self) -> Result<SpanPanel<HttpClient>, Error> {
        let panel = self.build_without_probe()?;
        if !panel.protocol().ping().await {
            return Err(PairingError::CannotConnect(panel.host().to_string()).into());
        }
        let status = panel.fetch_status().await?;
        tracing::debug!(host = %panel.host(), serial = %status.serial_number, "Panel reachable");
        Ok(panel)
    }

    /// Builds the panel without any network access.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn build_without_probe(self) -> Result<SpanPanel<HttpClient>, Error> {
        let client = self.config.into_client()?;
        let events = self.events.unwrap_or_default();
        Ok(SpanPanel::with_event_bus(client, self.options, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = SpanPanel::http("192.168.1.50");
        assert_eq!(builder.config().host(), "192.168.1.50");
        assert!(!builder.config().has_access_token());
        assert_eq!(builder.options, PanelOptions::default());
    }

    #[test]
    fn builder_chain() {
        let builder = SpanPanel::http("192.168.1.50")
            .with_access_token("abc")
            .with_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::none());
        assert!(builder.config().has_access_token());
        assert_eq!(builder.config().timeout(), Duration::from_secs(5));
        assert_eq!(builder.config().retry().max_attempts(), 1);
    }

    #[test]
    fn build_without_probe() {
        let panel = SpanPanel::http("192.168.1.50")
            .with_options(PanelOptions::default().with_battery(true))
            .build_without_probe()
            .unwrap();
        assert_eq!(panel.host(), "192.168.1.50");
        assert!(panel.options().battery_enabled());
        assert!(panel.current().is_empty());
    }

    #[test]
    fn shared_event_bus() {
        let bus = EventBus::new();
        let panel = SpanPanel::http("192.168.1.50")
            .with_event_bus(bus.clone())
            .build_without_probe()
            .unwrap();

        let _rx = panel.events().subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }
}
