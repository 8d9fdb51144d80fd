// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How transfers in the window turn into holders.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HolderStrategy {
    /// Signed replay: senders are debited, recipients credited. A holder is an
    /// address whose net delta over the window is positive.
    #[default]
    BalanceReplay,
    /// Credits recipients and never debits senders. Cheaper to reason about
    /// but counts anyone who received tokens in the window, including
    /// addresses that have since emptied their balance.
    RecentRecipients,
}

impl HolderStrategy {
    pub fn debits_senders(&self) -> bool {
        matches!(self, HolderStrategy::BalanceReplay)
    }
}
