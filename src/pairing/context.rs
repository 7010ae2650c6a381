// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-handshake context.

use std::fmt;

use crate::event::EntryId;

/// What the handshake will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// A new pairing.
    NewEntry,
    /// New credentials for an existing pairing.
    Reauth {
        /// The entry being re-authenticated.
        entry_id: EntryId,
    },
}

/// How the operator proves access to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Physical proximity, then token registration.
    Proximity,
    /// A token obtained elsewhere.
    Token,
}

/// State gathered during one handshake.
///
/// Owned by a single [`PairingFlow`](super::PairingFlow) and dropped with it.
#[derive(Clone, PartialEq, Eq)]
pub struct PairingContext {
    /// What the handshake will produce.
    pub kind: FlowKind,
    /// Validated host.
    pub host: Option<String>,
    /// Serial number reported by the panel.
    pub serial_number: Option<String>,
    /// Chosen authentication method.
    pub method: Option<AuthMethod>,
    /// Validated token.
    pub access_token: Option<String>,
}

impl PairingContext {
    pub(crate) fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            host: None,
            serial_number: None,
            method: None,
            access_token: None,
        }
    }
}

impl fmt::Debug for PairingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingContext")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("serial_number", &self.serial_number)
            .field("method", &self.method)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_empty() {
        let context = PairingContext::new(FlowKind::NewEntry);
        assert!(context.host.is_none());
        assert!(context.serial_number.is_none());
        assert!(context.access_token.is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let mut context = PairingContext::new(FlowKind::NewEntry);
        context.access_token = Some("secret".to_string());
        let debug = format!("{context:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
