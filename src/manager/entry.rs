// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted pairing entry.

use serde::{Deserialize, Serialize};

use crate::device::{PanelBuilder, SpanPanel};
use crate::event::EntryId;
use crate::options::PanelOptions;
use crate::protocol::normalize_host;

/// One paired panel.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    /// Pairing identifier.
    pub id: EntryId,
    /// Display title.
    pub title: String,
    /// Panel serial number; unique within a registry.
    pub serial_number: String,
    /// Last known host, lowercased.
    pub host: String,
    /// Bearer token issued by the panel.
    pub access_token: String,
    /// Reporting options.
    #[serde(default)]
    pub options: PanelOptions,
}

impl PanelEntry {
    /// Creates an entry with a fresh id and default options.
    #[must_use]
    pub fn new(
        serial_number: impl Into<String>,
        host: impl AsRef<str>,
        access_token: impl Into<String>,
    ) -> Self {
        let serial_number = serial_number.into();
        Self {
            id: EntryId::new(),
            title: format!("SPAN Panel {serial_number}"),
            serial_number,
            host: normalize_host(host.as_ref()),
            access_token: access_token.into(),
            options: PanelOptions::default(),
        }
    }

    /// Sets the reporting options.
    #[must_use]
    pub fn with_options(mut self, options: PanelOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns a panel builder carrying this entry's host, token and options.
    #[must_use]
    pub fn panel_builder(&self) -> PanelBuilder {
        SpanPanel::http(&self.host)
            .with_access_token(self.access_token.clone())
            .with_options(self.options.clone())
    }
}

impl std::fmt::Debug for PanelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("serial_number", &self.serial_number)
            .field("host", &self.host)
            .field("access_token", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}
