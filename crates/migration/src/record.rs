// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use cm_evm::{BridgeCompletion, TransferEvent};
use cm_utils::formatters::u256_decimal;
use serde::Serialize;
use strum::{Display, EnumIter};

/// Which side of the migration a record was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceChain {
    /// Legacy token transfers into the migration contract.
    Direct,
    /// Completions emitted by the bridge on the destination chain.
    Bridged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    pub recipient: Address,
    #[serde(with = "u256_decimal")]
    pub amount: U256,
    pub source_chain: SourceChain,
    pub block_number: u64,
    pub log_index: u64,
}

impl MigrationRecord {
    /// The user migrating is the one sending into the migration contract.
    pub fn from_direct(transfer: &TransferEvent) -> Self {
        Self {
            recipient: transfer.from,
            amount: transfer.amount,
            source_chain: SourceChain::Direct,
            block_number: transfer.block_number,
            log_index: transfer.log_index,
        }
    }

    pub fn from_bridged(completion: &BridgeCompletion) -> Self {
        Self {
            recipient: completion.recipient,
            amount: completion.amount,
            source_chain: SourceChain::Bridged,
            block_number: completion.block_number,
            log_index: completion.log_index,
        }
    }

    pub(crate) fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}
