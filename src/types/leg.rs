// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Branch leg index used for solar inverter aggregates.

use std::fmt;
use std::num::NonZeroU8;

use serde::{Deserialize, Serialize};

/// A 1-based index into the panel's branch array.
///
/// Zero is not representable: configuration uses `Option<BranchLeg>` and
/// treats 0 as "leg disabled". Whether an index actually exists on a given
/// panel is only known once telemetry arrives, so range checking against the
/// branch count happens at decode time (see [`BranchLeg::position`]).
///
/// # Examples
///
/// ```
/// use span_panel_lib::types::BranchLeg;
///
/// assert!(BranchLeg::new(0).is_none());
/// let leg = BranchLeg::new(3).unwrap();
/// assert_eq!(leg.position(32), Some(2));
/// assert_eq!(BranchLeg::new(33).unwrap().position(32), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchLeg(NonZeroU8);

impl BranchLeg {
    /// Creates a leg from a 1-based index; returns `None` for 0 (disabled).
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        NonZeroU8::new(index).map(Self)
    }

    /// Returns the 1-based index.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0.get()
    }

    /// Returns the 0-based array position if the leg exists on a panel with
    /// `branch_count` branches.
    #[must_use]
    pub fn position(&self, branch_count: usize) -> Option<usize> {
        let index = usize::from(self.get());
        (index <= branch_count).then(|| index - 1)
    }
}

impl fmt::Display for BranchLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
