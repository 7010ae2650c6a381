// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-panel reporting options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::BranchLeg;

/// Options controlling what is polled and how often.
///
/// Serializable so the hosting process can persist it alongside the
/// pairing entry.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use span_panel_lib::options::{PanelOptions, SolarOptions};
///
/// let options = PanelOptions::default()
///     .with_refresh_interval(Duration::from_secs(10))?
///     .with_solar(SolarOptions::legs(30, 32))
///     .with_battery(true);
///
/// assert!(options.solar().enabled);
/// assert!(options.battery_enabled());
/// # Ok::<(), span_panel_lib::ValueError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelOptions {
    #[serde(rename = "scan_interval")]
    refresh_interval_secs: u64,
    #[serde(default)]
    solar: SolarOptions,
    #[serde(default, rename = "enable_battery_percentage")]
    battery_enabled: bool,
}

impl PanelOptions {
    /// Default refresh interval.
    pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);
    /// Shortest refresh interval the panel tolerates.
    pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

    /// Sets the refresh interval.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::RefreshIntervalTooShort` below 5 seconds, or
    /// `ValueError::RefreshIntervalNotWholeSeconds` if `interval` has a
    /// sub-second part.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Result<Self, ValueError> {
        if interval.subsec_nanos() != 0 {
            return Err(ValueError::RefreshIntervalNotWholeSeconds {
                millis: interval.as_millis(),
            });
        }
        if interval < Self::MIN_REFRESH_INTERVAL {
            return Err(ValueError::RefreshIntervalTooShort {
                min: Self::MIN_REFRESH_INTERVAL.as_secs(),
                actual: interval.as_secs(),
            });
        }
        self.refresh_interval_secs = interval.as_secs();
        Ok(self)
    }

    /// Sets the solar inverter options.
    #[must_use]
    pub fn with_solar(mut self, solar: SolarOptions) -> Self {
        self.solar = solar;
        self
    }

    /// Enables or disables storage battery polling.
    #[must_use]
    pub fn with_battery(mut self, enabled: bool) -> Self {
        self.battery_enabled = enabled;
        self
    }

    /// Returns the refresh interval.
    ///
    /// Values persisted below the minimum are raised to it.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs).max(Self::MIN_REFRESH_INTERVAL)
    }

    /// Returns the solar inverter options.
    #[must_use]
    pub fn solar(&self) -> &SolarOptions {
        &self.solar
    }

    /// Returns `true` if the storage battery is polled each cycle.
    #[must_use]
    pub fn battery_enabled(&self) -> bool {
        self.battery_enabled
    }
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            refresh_interval_secs: Self::DEFAULT_REFRESH_INTERVAL.as_secs(),
            solar: SolarOptions::default(),
            battery_enabled: false,
        }
    }
}

/// Solar inverter aggregate settings.
///
/// When enabled, the inverter's power and energy are computed by summing two
/// branch legs. A leg that is `None`, or that does not exist on the panel,
/// contributes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarOptions {
    /// Whether solar aggregates are computed.
    #[serde(default, rename = "enable_solar_circuit")]
    pub enabled: bool,
    /// First inverter leg.
    #[serde(default, with = "leg_or_zero")]
    pub leg1: Option<BranchLeg>,
    /// Second inverter leg.
    #[serde(default, with = "leg_or_zero")]
    pub leg2: Option<BranchLeg>,
}

impl SolarOptions {
    /// Enables solar aggregates on the given 1-based legs (0 disables a leg).
    #[must_use]
    pub fn legs(leg1: u8, leg2: u8) -> Self {
        Self {
            enabled: true,
            leg1: BranchLeg::new(leg1),
            leg2: BranchLeg::new(leg2),
        }
    }

    /// Returns the configured legs that are set.
    pub fn configured_legs(&self) -> impl Iterator<Item = BranchLeg> {
        [self.leg1, self.leg2].into_iter().flatten()
    }
}

/// Persists a disabled leg as `0`, the way panel configuration forms do.
mod leg_or_zero {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::BranchLeg;

    pub fn serialize<S: Serializer>(leg: &Option<BranchLeg>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(leg.map_or(0, |l| l.get()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BranchLeg>, D::Error> {
        Ok(BranchLeg::new(u8::deserialize(d)?))
    }
}
