// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the SPAN panel REST API.

use std::net::Ipv6Addr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Client, Method, header};

use crate::error::{Error, ProtocolError};
use crate::protocol::{ApiResponse, Auth, PanelProtocol, RetryPolicy, endpoints, retry_transport};
use crate::response::{HardwareStatus, decode_access_token, decode_status};

// ============================================================================
// PanelConfig - Connection parameters for one panel
// ============================================================================

/// Configuration for an HTTP connection to a SPAN panel.
///
/// The host is trimmed and lowercased so the same panel always maps to the
/// same string, which the pairing registry relies on for de-duplication.
///
/// # Examples
///
/// ```
/// use span_panel_lib::protocol::PanelConfig;
/// use std::time::Duration;
///
/// let config = PanelConfig::new(" 192.168.1.50 ")
///     .with_access_token("token")
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.host(), "192.168.1.50");
/// assert_eq!(config.base_url(), "http://192.168.1.50");
/// ```
#[derive(Clone)]
pub struct PanelConfig {
    host: String,
    port: u16,
    access_token: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl PanelConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a configuration for the specified host.
    #[must_use]
    pub fn new(host: impl AsRef<str>) -> Self {
        Self {
            host: normalize_host(host.as_ref()),
            port: Self::DEFAULT_PORT,
            access_token: None,
            timeout: Self::DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy for `GET` requests.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the normalized host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns `true` if a bearer token is configured.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Builds the base URL from this configuration.
    ///
    /// A host that already carries a scheme or port is used as is. A bare
    /// IPv6 literal is bracketed.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.clone();
        }
        if self.host.parse::<Ipv6Addr>().is_ok() {
            return if self.port == Self::DEFAULT_PORT {
                format!("http://[{}]", self.host)
            } else {
                format!("http://[{}]:{}", self.host, self.port)
            };
        }
        if self.port == Self::DEFAULT_PORT || self.host.contains(':') {
            format!("http://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::ClientBuild` if the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProtocolError::ClientBuild(e.to_string()))?;

        Ok(HttpClient {
            base_url,
            host: self.host,
            client,
            access_token: Arc::new(RwLock::new(self.access_token)),
            retry: self.retry,
        })
    }
}

impl std::fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Trims and lowercases a host so one panel always maps to one string.
pub(crate) fn normalize_host(host: &str) -> String {
    host.trim().to_lowercase()
}

// ============================================================================
// HttpClient - reqwest-backed PanelProtocol
// ============================================================================

/// HTTP client for communicating with a SPAN panel.
///
/// Clones share the same connection pool and bearer token, so a token
/// installed with [`set_access_token`](Self::set_access_token) is seen by
/// every clone.
///
/// # Examples
///
/// ```no_run
/// use span_panel_lib::protocol::PanelConfig;
///
/// # async fn example() -> span_panel_lib::Result<()> {
/// let client = PanelConfig::new("192.168.1.50").into_client()?;
/// if client.ping().await {
///     let status = client.status().await?;
///     println!("serial: {}", status.serial_number);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    host: String,
    client: Client,
    access_token: Arc<RwLock<Option<String>>>,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Returns the base URL of the panel.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Installs or clears the bearer token.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    /// Returns `true` if a bearer token is installed.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token.read().is_some()
    }

    /// Returns `true` if the unauthenticated status endpoint answers.
    pub async fn ping(&self) -> bool {
        match self.fetch(endpoints::STATUS, &[], Auth::None).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(host = %self.host, error = %err, "Ping failed");
                false
            }
        }
    }

    /// Returns `true` if the installed token is accepted by an
    /// authenticated endpoint.
    pub async fn ping_with_auth(&self) -> bool {
        match self.fetch(endpoints::PANEL, &[], Auth::Bearer).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(host = %self.host, error = %err, "Authenticated ping failed");
                false
            }
        }
    }

    /// Fetches and decodes the hardware status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the payload cannot be decoded.
    pub async fn status(&self) -> Result<HardwareStatus, Error> {
        let response = self.fetch(endpoints::STATUS, &[], Auth::None).await?;
        Ok(decode_status(response.body())?)
    }

    /// Registers a new client with the panel and returns the issued token.
    ///
    /// The panel only accepts this while its proximity proof is satisfied.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no token is returned.
    pub async fn register(&self, name: &str, description: &str) -> Result<String, Error> {
        let body = serde_json::json!({ "name": name, "description": description });
        let response = self.post(endpoints::REGISTER, &body, Auth::None).await?;
        Ok(decode_access_token(response.body())?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        auth: Auth,
    ) -> Result<ApiResponse, ProtocolError> {
        let url = self.url(path);

        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        let token = match auth {
            Auth::Bearer => self.access_token.read().clone(),
            Auth::None => None,
        };
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();

        if !status.is_success() {
            return Err(ProtocolError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(ProtocolError::Transport)?;

        tracing::debug!(status = status.as_u16(), len = body.len(), "Received HTTP response");

        Ok(ApiResponse::new(status.as_u16(), body))
    }
}

/// URL and request-building problems are not worth retrying.
fn classify_send_error(err: reqwest::Error) -> ProtocolError {
    if err.is_builder() {
        ProtocolError::InvalidAddress(err.to_string())
    } else {
        ProtocolError::Transport(err)
    }
}

impl PanelProtocol for HttpClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn fetch(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth: Auth,
    ) -> Result<ApiResponse, ProtocolError> {
        retry_transport(self.retry, |_| {
            self.send_once(Method::GET, path, query, None, auth)
        })
        .await
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        auth: Auth,
    ) -> Result<ApiResponse, ProtocolError> {
        self.send_once(Method::POST, path, &[], Some(body), auth).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("has_access_token", &self.has_access_token())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
