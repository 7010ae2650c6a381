// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP protocol for communicating with SPAN panels.
//!
//! The panel exposes a small JSON/REST surface under `/api/v1`. The
//! [`PanelProtocol`] trait is the seam between the panel logic and the
//! transport; [`HttpClient`] is the production implementation.
//!
//! # Retry Semantics
//!
//! `GET` requests are retried on transport failures (connection errors,
//! timeouts) up to [`RetryPolicy::max_attempts`] times. HTTP status errors
//! are never retried, and `POST` requests are never retried because they
//! change panel state.

mod http;
mod retry;

pub use http::{HttpClient, PanelConfig};
pub(crate) use http::normalize_host;
pub use retry::{RetryPolicy, Retryable, retry_transport};

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::{ParseError, ProtocolError};

/// Paths of the panel REST API.
pub mod endpoints {
    /// Hardware status and proximity; no authentication.
    pub const STATUS: &str = "/api/v1/status";
    /// Panel telemetry.
    pub const PANEL: &str = "/api/v1/panel";
    /// Circuit collection.
    pub const CIRCUITS: &str = "/api/v1/circuits";
    /// Storage battery state of energy.
    pub const STORAGE_SOE: &str = "/api/v1/storage/soe";
    /// Token registration; no authentication.
    pub const REGISTER: &str = "/api/v1/auth/register";

    /// Path of a single circuit, with the id percent-encoded.
    #[must_use]
    pub fn circuit(circuit_id: &str) -> String {
        format!("{CIRCUITS}/{}", urlencoding::encode(circuit_id))
    }
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach `Authorization: Bearer <token>` if a token is configured.
    Bearer,
    /// Never attach a token.
    None,
}

/// A successful (2xx) answer from the panel.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the raw JSON body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body as a specific type.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON cannot be parsed into the target type.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}

/// Transport used to talk to one panel.
///
/// Implementations must apply the retry semantics described in the
/// [module documentation](self).
pub trait PanelProtocol: Send + Sync {
    /// Returns the host this transport targets.
    fn host(&self) -> &str;

    /// Sends a `GET` request, retrying on transport failure.
    ///
    /// # Errors
    ///
    /// Returns the last transport error once attempts are exhausted, or the
    /// first HTTP status error.
    fn fetch(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth: Auth,
    ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;

    /// Sends a `POST` request with a JSON body, exactly once.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on transport or HTTP status failure.
    fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        auth: Auth,
    ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send;
}
