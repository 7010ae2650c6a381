// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel event types.

use crate::device::CircuitCommand;
use crate::error::Severity;

/// Events emitted while polling and controlling a panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// A new snapshot was published.
    Updated {
        /// Host of the panel.
        host: String,
        /// Generation of the published snapshot.
        generation: u64,
    },

    /// A refresh cycle failed; the previous snapshot stays current.
    RefreshFailed {
        /// Host of the panel.
        host: String,
        /// How the failure was classified.
        severity: Severity,
        /// Rendered error.
        error: String,
    },

    /// The panel rejected the token; polling has stopped.
    AuthenticationRequired {
        /// Host of the panel.
        host: String,
    },

    /// A circuit command was accepted by the panel.
    CommandSent {
        /// Host of the panel.
        host: String,
        /// Target circuit.
        circuit_id: String,
        /// The command that was sent.
        command: CircuitCommand,
    },
}

impl PanelEvent {
    /// Creates an updated event.
    #[must_use]
    pub fn updated(host: impl Into<String>, generation: u64) -> Self {
        Self::Updated {
            host: host.into(),
            generation,
        }
    }

    /// Returns the host of the panel this event is about.
    #[must_use]
    pub fn host(&self) -> &str {
        match self {
            Self::Updated { host, .. }
            | Self::RefreshFailed { host, .. }
            | Self::AuthenticationRequired { host }
            | Self::CommandSent { host, .. } => host,
        }
    }

    /// Returns `true` for failure and authentication events.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailed { .. } | Self::AuthenticationRequired { .. }
        )
    }
}
