// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairing state machine.

use std::net::Ipv4Addr;
use std::time::Duration;

use uuid::Uuid;

use super::{AuthMethod, FlowKind, PairingContext};
use crate::error::{Error, PairingError};
use crate::event::EntryId;
use crate::manager::{PanelEntry, PanelRegistry};
use crate::protocol::{HttpClient, PanelConfig, normalize_host};
use crate::response::{HardwareStatus, ProximitySignal};

const CLIENT_DESCRIPTION: &str = "span_panel_lib local client";

/// Where the handshake currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingStep {
    /// Nothing validated yet.
    Start,
    /// The host answered as a panel; waiting for the auth method.
    HostValidated,
    /// Waiting for the panel to report proof of proximity.
    ProximityWait {
        /// The last signal read, if the panel was polled.
        signal: Option<ProximitySignal>,
    },
    /// Waiting for an operator-supplied token.
    TokenWait,
    /// A token was accepted by the panel.
    TokenValidated,
    /// The registry is being updated.
    EntryResolved,
    /// The handshake is over.
    Terminal(PairingOutcome),
}

impl PairingStep {
    /// Returns the step name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::HostValidated => "host_validated",
            Self::ProximityWait { .. } => "proximity_wait",
            Self::TokenWait => "token_wait",
            Self::TokenValidated => "token_validated",
            Self::EntryResolved => "entry_resolved",
            Self::Terminal(_) => "terminal",
        }
    }
}

/// How a handshake ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingOutcome {
    /// A new entry was added to the registry.
    Created(PanelEntry),
    /// An existing entry received a new host and token.
    Reauthenticated(PanelEntry),
    /// The handshake was aborted.
    Aborted(PairingError),
}

/// One pairing handshake against a [`PanelRegistry`].
///
/// Each operation checks that it is allowed in the current step and
/// returns `PairingError::InvalidStep` otherwise.
#[derive(Debug)]
pub struct PairingFlow<'r> {
    registry: &'r PanelRegistry,
    port: u16,
    timeout: Duration,
    context: PairingContext,
    step: PairingStep,
    client: Option<HttpClient>,
}

impl<'r> PairingFlow<'r> {
    /// Creates a flow that will record its result in `registry`.
    #[must_use]
    pub fn new(registry: &'r PanelRegistry) -> Self {
        Self {
            registry,
            port: PanelConfig::DEFAULT_PORT,
            timeout: PanelConfig::DEFAULT_TIMEOUT,
            context: PairingContext::new(FlowKind::NewEntry),
            step: PairingStep::Start,
            client: None,
        }
    }

    /// Sets the port used to reach the panel.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the current step.
    #[must_use]
    pub fn step(&self) -> &PairingStep {
        &self.step
    }

    /// Returns the gathered context.
    #[must_use]
    pub fn context(&self) -> &PairingContext {
        &self.context
    }

    /// Returns the outcome once the flow is terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<&PairingOutcome> {
        match &self.step {
            PairingStep::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    // ========== Entry Points ==========

    /// Starts a flow for a host typed in by the operator.
    ///
    /// # Errors
    ///
    /// - `CannotConnect` if the host does not answer; the flow stays in
    ///   `Start` and may be retried with another host
    /// - `NotAPanel` if the host answers with something other than a panel
    ///   status (aborts)
    /// - `AlreadyConfigured` if the panel is already paired (aborts)
    pub async fn begin_user(&mut self, host: &str) -> Result<&PairingStep, PairingError> {
        self.require_step(matches!(self.step, PairingStep::Start), "begin")?;

        let host = normalize_host(host);
        let client = self.connect(&host)?;
        if !client.ping().await {
            return Err(PairingError::CannotConnect(host));
        }
        let status = self.read_status(&client, &host).await?;

        self.host_validated(FlowKind::NewEntry, host, status, client)
    }

    /// Starts a flow for a host announced by network discovery.
    ///
    /// The host is rejected before any request if it is already paired or
    /// is not a routable IPv4 address.
    ///
    /// # Errors
    ///
    /// Every failure aborts: `AlreadyConfigured`, `NotIpv4Address` or
    /// `NotAPanel`.
    pub async fn begin_discovery(&mut self, host: &str) -> Result<&PairingStep, PairingError> {
        self.require_step(matches!(self.step, PairingStep::Start), "begin")?;

        let host = normalize_host(host);
        if let Some(existing) = self.registry.find_by_host(&host) {
            return Err(self.abort(PairingError::AlreadyConfigured {
                serial: existing.serial_number,
                host_updated: false,
            }));
        }
        if !is_routable_ipv4(&host) {
            return Err(self.abort(PairingError::NotIpv4Address(host)));
        }

        let client = self.connect(&host)?;
        if !client.ping().await {
            return Err(self.abort(PairingError::NotAPanel(host)));
        }
        let status = match client.status().await {
            Ok(status) => status,
            Err(err) => {
                tracing::debug!(host = %host, error = %err, "Discovered host is not a panel");
                return Err(self.abort(PairingError::NotAPanel(host)));
            }
        };

        self.host_validated(FlowKind::NewEntry, host, status, client)
    }

    /// Starts a flow that renews the credentials of an existing entry.
    ///
    /// # Errors
    ///
    /// - `UnknownEntry` if the registry has no such entry (aborts)
    /// - `NotAPanel` if the host no longer answers as a panel (aborts)
    /// - `CannotConnect` if the panel does not answer; the flow stays in
    ///   `Start`
    pub async fn begin_reauth(&mut self, entry_id: EntryId) -> Result<&PairingStep, PairingError> {
        self.require_step(matches!(self.step, PairingStep::Start), "begin")?;

        let Some(entry) = self.registry.get(entry_id) else {
            return Err(self.abort(PairingError::UnknownEntry(entry_id.to_string())));
        };

        let client = self.connect(&entry.host)?;
        let status = self.read_status(&client, &entry.host).await?;

        self.host_validated(FlowKind::Reauth { entry_id }, entry.host, status, client)
    }

    fn host_validated(
        &mut self,
        kind: FlowKind,
        host: String,
        status: HardwareStatus,
        client: HttpClient,
    ) -> Result<&PairingStep, PairingError> {
        if kind == FlowKind::NewEntry
            && let Err(err) = self.registry.claim_serial(&status.serial_number, &host)
        {
            return Err(self.abort(err));
        }

        tracing::info!(host = %host, serial = %status.serial_number, "Panel host validated");

        self.context = PairingContext::new(kind);
        self.context.host = Some(host);
        self.context.serial_number = Some(status.serial_number);
        self.client = Some(client);
        self.step = PairingStep::HostValidated;
        Ok(&self.step)
    }

    // ========== Authentication ==========

    /// Records the operator's choice of authentication method.
    ///
    /// No request is made.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStep` outside `HostValidated`.
    pub fn choose_method(&mut self, method: AuthMethod) -> Result<&PairingStep, PairingError> {
        self.require_step(matches!(self.step, PairingStep::HostValidated), "choose a method")?;

        self.context.method = Some(method);
        self.step = match method {
            AuthMethod::Proximity => PairingStep::ProximityWait { signal: None },
            AuthMethod::Token => PairingStep::TokenWait,
        };
        Ok(&self.step)
    }

    /// Reads the proximity signal once.
    ///
    /// While the panel is not satisfied the flow stays in `ProximityWait`
    /// with the latest signal. Once it is, a client is registered and its
    /// token validated, moving to `TokenValidated`.
    ///
    /// # Errors
    ///
    /// - `CannotConnect` if the panel does not answer or refuses to register
    /// - `InvalidToken` if the issued token is rejected
    /// - `NotAPanel` if the status document can no longer be decoded (aborts)
    ///
    /// The flow stays in `ProximityWait` on every non-aborting error.
    pub async fn poll_proximity(&mut self) -> Result<&PairingStep, PairingError> {
        self.require_step(
            matches!(self.step, PairingStep::ProximityWait { .. }),
            "poll proximity",
        )?;
        let (client, host) = self.session()?;

        let status = self.read_status(&client, &host).await?;
        let signal = status.proximity;
        tracing::debug!(host = %host, signal = ?signal, "Read proximity signal");

        if !signal.is_proven() {
            self.step = PairingStep::ProximityWait {
                signal: Some(signal),
            };
            return Ok(&self.step);
        }

        let name = format!("span-panel-{}", Uuid::new_v4());
        let token = client
            .register(&name, CLIENT_DESCRIPTION)
            .await
            .map_err(|err| {
                tracing::warn!(host = %host, error = %err, "Token registration failed");
                PairingError::CannotConnect(host.clone())
            })?;

        self.step = PairingStep::ProximityWait {
            signal: Some(signal),
        };
        self.accept_token(&client, token).await
    }

    /// Validates an operator-supplied token.
    ///
    /// # Errors
    ///
    /// - `MissingToken` for a blank token
    /// - `InvalidToken` if the panel rejects it
    ///
    /// The flow stays in `TokenWait` in both cases.
    pub async fn submit_token(&mut self, token: &str) -> Result<&PairingStep, PairingError> {
        self.require_step(matches!(self.step, PairingStep::TokenWait), "submit a token")?;

        let token = token.trim();
        if token.is_empty() {
            return Err(PairingError::MissingToken);
        }
        let (client, _) = self.session()?;
        self.accept_token(&client, token.to_string()).await
    }

    async fn accept_token(
        &mut self,
        client: &HttpClient,
        token: String,
    ) -> Result<&PairingStep, PairingError> {
        client.set_access_token(Some(token.clone()));
        let valid = client.ping_with_auth().await;
        client.set_access_token(None);

        if !valid {
            tracing::warn!(host = %client.base_url(), "Panel rejected the access token");
            return Err(PairingError::InvalidToken);
        }

        self.context.access_token = Some(token);
        self.step = PairingStep::TokenValidated;
        Ok(&self.step)
    }

    // ========== Resolution ==========

    /// Writes the result to the registry and ends the flow.
    ///
    /// A new entry is rejected if its serial number is already paired; the
    /// existing entry is moved to the new host instead. A re-authentication
    /// merges the host and token into the existing entry and keeps its other
    /// fields.
    ///
    /// # Errors
    ///
    /// - `Contract` if a field required for the entry was never gathered
    /// - `AlreadyConfigured` or `UnknownEntry` from the registry
    ///
    /// All of these abort.
    pub fn resolve(&mut self) -> Result<PanelEntry, PairingError> {
        self.require_step(matches!(self.step, PairingStep::TokenValidated), "resolve")?;
        self.step = PairingStep::EntryResolved;

        let context = self.context.clone();
        let Some(host) = context.host else {
            return Err(self.abort(PairingError::Contract("host must be set to resolve an entry")));
        };
        let Some(token) = context.access_token else {
            return Err(self.abort(PairingError::Contract("token must be set to resolve an entry")));
        };

        let result = match context.kind {
            FlowKind::NewEntry => {
                let Some(serial) = context.serial_number else {
                    return Err(self.abort(PairingError::Contract(
                        "serial number must be set to create an entry",
                    )));
                };
                let entry = PanelEntry::new(serial, &host, token);
                self.registry
                    .insert_unique(entry.clone())
                    .map(|_| (entry.clone(), PairingOutcome::Created(entry)))
            }
            FlowKind::Reauth { entry_id } => self
                .registry
                .update_credentials(entry_id, &host, token)
                .map(|entry| (entry.clone(), PairingOutcome::Reauthenticated(entry))),
        };

        match result {
            Ok((entry, outcome)) => {
                self.step = PairingStep::Terminal(outcome);
                Ok(entry)
            }
            Err(err) => Err(self.abort(err)),
        }
    }

    // ========== Helpers ==========

    fn require_step(&self, allowed: bool, action: &'static str) -> Result<(), PairingError> {
        if allowed {
            Ok(())
        } else {
            Err(PairingError::InvalidStep {
                step: self.step.name(),
                action,
            })
        }
    }

    fn abort(&mut self, err: PairingError) -> PairingError {
        tracing::info!(step = self.step.name(), error = %err, "Pairing aborted");
        self.step = PairingStep::Terminal(PairingOutcome::Aborted(err.clone()));
        err
    }

    /// Reads the status document. A host that answers with something other
    /// than a panel status aborts the flow; an unreachable one does not.
    async fn read_status(
        &mut self,
        client: &HttpClient,
        host: &str,
    ) -> Result<HardwareStatus, PairingError> {
        match client.status().await {
            Ok(status) => Ok(status),
            Err(Error::Parse(err)) => {
                tracing::debug!(host = %host, error = %err, "Host is not a panel");
                Err(self.abort(PairingError::NotAPanel(host.to_string())))
            }
            Err(_) => Err(PairingError::CannotConnect(host.to_string())),
        }
    }

    fn connect(&self, host: &str) -> Result<HttpClient, PairingError> {
        PanelConfig::new(host)
            .with_port(self.port)
            .with_timeout(self.timeout)
            .into_client()
            .map_err(|_| PairingError::CannotConnect(host.to_string()))
    }

    fn session(&self) -> Result<(HttpClient, String), PairingError> {
        match (&self.client, &self.context.host) {
            (Some(client), Some(host)) => Ok((client.clone(), host.clone())),
            _ => Err(PairingError::Contract("no validated host")),
        }
    }
}

fn is_routable_ipv4(host: &str) -> bool {
    host.parse::<Ipv4Addr>()
        .is_ok_and(|ip| !(ip.is_unspecified() || ip.is_broadcast() || ip.is_multicast()))
}
