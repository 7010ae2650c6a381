// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the SPAN panel library.
//!
//! This module provides the error hierarchy for every layer of the library:
//! value validation, HTTP communication, payload decoding, empty-data
//! detection, polling and pairing.

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during HTTP communication with the panel.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding a panel payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The panel answered with a structurally valid but empty payload.
    #[error("panel returned empty data: {0}")]
    EmptyData(#[from] EmptyDataKind),

    /// Error occurred during the pairing handshake.
    #[error("pairing error: {0}")]
    Pairing(#[from] PairingError),

    /// A refresh cycle exceeded its time budget.
    #[error("refresh cycle timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The panel rejected the access token; the pairing handshake must be re-run.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The circuit is not present in the current snapshot.
    #[error("circuit not found: {0}")]
    CircuitNotFound(String),

    /// The circuit cannot be controlled by the user.
    #[error("circuit is not user controllable: {0}")]
    CircuitNotControllable(String),
}

/// How a failure affects the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Transient; the previous snapshot stays published and polling continues.
    Soft,
    /// The device sent something undecodable; reported as a cycle failure,
    /// polling continues.
    Hard,
    /// The token was rejected; polling stops until the panel is paired again.
    AuthenticationRequired,
}

impl Error {
    /// Classifies this error for the polling loop.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::AuthenticationRequired => Severity::AuthenticationRequired,
            Self::Protocol(err) if err.is_unauthorized() => Severity::AuthenticationRequired,
            Self::Protocol(_) | Self::EmptyData(_) | Self::Timeout(_) => Severity::Soft,
            _ => Severity::Hard,
        }
    }

    /// Returns `true` if the panel rejected the credential.
    #[must_use]
    pub fn is_authentication_required(&self) -> bool {
        self.severity() == Severity::AuthenticationRequired
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The refresh interval is shorter than the allowed minimum.
    #[error("refresh interval of {actual} s is below the minimum of {min} s")]
    RefreshIntervalTooShort {
        /// Minimum allowed interval in seconds.
        min: u64,
        /// The interval that was provided.
        actual: u64,
    },

    /// The refresh interval has a sub-second part; intervals are persisted
    /// in whole seconds.
    #[error("refresh interval of {millis} ms is not a whole number of seconds")]
    RefreshIntervalNotWholeSeconds {
        /// The interval that was provided, in milliseconds.
        millis: u128,
    },

    /// A relay state that cannot be sent to the panel.
    #[error("relay state cannot be commanded: {0}")]
    RelayStateNotCommandable(String),

    /// A circuit priority that cannot be sent to the panel.
    #[error("circuit priority cannot be commanded: {0}")]
    PriorityNotCommandable(String),

    /// An unrecognised enum string.
    #[error("invalid {kind}: {value}")]
    InvalidVariant {
        /// Which enum was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Errors related to HTTP communication with the panel.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request never produced an HTTP response (connection refused or
    /// reset, transport timeout, truncated body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The panel answered with a non-2xx status.
    #[error("HTTP {code} - {reason}")]
    Status {
        /// Numeric HTTP status.
        code: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ProtocolError {
    /// Returns `true` for failures that never reached an HTTP status.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` for HTTP 401 answers.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Returns the HTTP status code, if the panel answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors related to decoding panel payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed, including missing required fields.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// Failed to decode a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to decode.
        field: String,
        /// Description of the failure.
        message: String,
    },
}

/// Which payload came back empty.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmptyDataKind {
    /// Panel telemetry reported the `UNKNOWN` main relay sentinel.
    #[error("panel telemetry reported an unknown main relay state")]
    Panel,

    /// The circuit collection was empty.
    #[error("circuit collection was empty")]
    Circuits,

    /// The storage battery object was missing or empty.
    #[error("storage battery state was empty")]
    StorageBattery,
}

/// Step-scoped errors surfaced by the pairing handshake.
///
/// Unless noted otherwise the in-progress context is preserved, so the
/// operator can retry the same step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingError {
    /// The host did not answer the unauthenticated status request.
    #[error("cannot connect to {0}")]
    CannotConnect(String),

    /// A discovered host is not a routable IPv4 address. Aborts the flow.
    #[error("{0} is not a routable IPv4 address")]
    NotIpv4Address(String),

    /// The host answered but is not a SPAN panel. Aborts the flow.
    #[error("{0} is not a SPAN panel")]
    NotAPanel(String),

    /// The panel is already paired. Aborts the flow.
    #[error("panel {serial} is already configured")]
    AlreadyConfigured {
        /// Serial number of the existing pairing.
        serial: String,
        /// `true` if the existing entry's host was migrated to the new address.
        host_updated: bool,
    },

    /// The registry has no entry with the requested id.
    #[error("no panel entry with id {0}")]
    UnknownEntry(String),

    /// No token was supplied.
    #[error("an access token is required")]
    MissingToken,

    /// The panel rejected the candidate token.
    #[error("the access token was rejected by the panel")]
    InvalidToken,

    /// The action is not allowed in the current step.
    #[error("cannot {action} while in step {step}")]
    InvalidStep {
        /// The current step.
        step: &'static str,
        /// The attempted action.
        action: &'static str,
    },

    /// A programming-contract violation: a field required to finalize the
    /// entry was never populated.
    #[error("pairing contract violated: {0}")]
    Contract(&'static str),
}

impl PairingError {
    /// Returns `true` if the error ends the handshake.
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            Self::NotIpv4Address(_)
                | Self::NotAPanel(_)
                | Self::AlreadyConfigured { .. }
                | Self::UnknownEntry(_)
                | Self::Contract(_)
        )
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
