// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded retry for idempotent requests.

use std::future::Future;

use crate::error::ProtocolError;

/// Errors that can tell whether repeating the request may succeed.
pub trait Retryable {
    /// Returns `true` if the failure happened below HTTP.
    fn is_retryable(&self) -> bool;
}

impl Retryable for ProtocolError {
    fn is_retryable(&self) -> bool {
        self.is_transport()
    }
}

/// How many times a `GET` is attempted.
///
/// # Examples
///
/// ```
/// use span_panel_lib::protocol::RetryPolicy;
///
/// assert_eq!(RetryPolicy::default().max_attempts(), 3);
/// assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Default number of attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Creates a policy with the given total attempts (at least one).
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(1)
    }

    /// Returns the total number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted; the last error is returned.
///
/// `op` receives the 1-based attempt number. Attempts run back to back and
/// share no state.
///
/// # Errors
///
/// Returns the first non-retryable error, or the final retryable one.
pub async fn retry_transport<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts() => {
                tracing::debug!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    error = %err,
                    "Transport failure, retrying"
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
