// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circuit load-shedding priority.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Priority of a circuit when the panel sheds load.
///
/// # Examples
///
/// ```
/// use span_panel_lib::types::CircuitPriority;
///
/// let p: CircuitPriority = "Nice to Have".parse().unwrap();
/// assert_eq!(p, CircuitPriority::NiceToHave);
/// assert_eq!(p.as_str(), "NICE_TO_HAVE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitPriority {
    /// Always kept powered.
    MustHave,
    /// Shed after non-essential loads.
    NiceToHave,
    /// Shed first.
    NonEssential,
    /// Not reported or unrecognised.
    #[serde(other)]
    Unknown,
}

impl CircuitPriority {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MustHave => "MUST_HAVE",
            Self::NiceToHave => "NICE_TO_HAVE",
            Self::NonEssential => "NON_ESSENTIAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MustHave => "Must Have",
            Self::NiceToHave => "Nice to Have",
            Self::NonEssential => "Non-Essential",
            Self::Unknown => "Unknown",
        }
    }

    /// Priorities an operator may choose from.
    #[must_use]
    pub const fn selectable() -> [Self; 3] {
        [Self::MustHave, Self::NiceToHave, Self::NonEssential]
    }

    /// Returns `true` if the priority can be sent in a command.
    #[must_use]
    pub const fn is_commandable(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for CircuitPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CircuitPriority {
    type Err = ValueError;

    /// Accepts either the wire name or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "MUST_HAVE" => Ok(Self::MustHave),
            "NICE_TO_HAVE" => Ok(Self::NiceToHave),
            "NON_ESSENTIAL" => Ok(Self::NonEssential),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(ValueError::InvalidVariant {
                kind: "circuit priority",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_and_label() {
        assert_eq!(
            "MUST_HAVE".parse::<CircuitPriority>().unwrap(),
            CircuitPriority::MustHave
        );
        assert_eq!(
            "Non-Essential".parse::<CircuitPriority>().unwrap(),
            CircuitPriority::NonEssential
        );
        assert!("SOMETIMES".parse::<CircuitPriority>().is_err());
    }

    #[test]
    fn selectable_excludes_unknown() {
        assert!(!CircuitPriority::selectable().contains(&CircuitPriority::Unknown));
        assert!(!CircuitPriority::Unknown.is_commandable());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(CircuitPriority::NiceToHave.to_string(), "Nice to Have");
    }

    #[test]
    fn unrecognised_wire_value_is_unknown() {
        let p: CircuitPriority = serde_json::from_str(r#""OPTIONAL""#).unwrap();
        assert_eq!(p, CircuitPriority::Unknown);
    }
}
