// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{GatewayError, LogQuery};
use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;
use serde::{Deserialize, Serialize};

sol! {
    #[derive(Debug)]
    event Transfer(address indexed from, address indexed to, uint256 value);

    #[derive(Debug)]
    event MigrationCompleted(address indexed recipient, uint256 amount);

    #[derive(Debug)]
    #[sol(rpc)]
    interface IERC20 {
        function totalSupply() external view returns (uint256);
    }
}

/// A decoded ERC-20 `Transfer`. A zero `from` is a mint, a zero `to` a burn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
    pub block_number: u64,
    pub log_index: u64,
}

impl TransferEvent {
    pub fn query(token: Address) -> LogQuery {
        LogQuery::event(token, Transfer::SIGNATURE_HASH)
    }

    /// Transfers of `token` into `recipient` only.
    pub fn query_to(token: Address, recipient: Address) -> LogQuery {
        Self::query(token).with_topic(2, recipient.into_word())
    }

    pub fn is_mint(&self) -> bool {
        self.from == Address::ZERO
    }

    pub fn is_burn(&self) -> bool {
        self.to == Address::ZERO
    }
}

impl TryFrom<&Log> for TransferEvent {
    type Error = GatewayError;

    fn try_from(log: &Log) -> Result<Self, Self::Error> {
        let event = Transfer::decode_log_data(log.data())
            .map_err(|e| GatewayError::Decode(format!("Transfer: {e}")))?;
        Ok(Self {
            from: event.from,
            to: event.to,
            amount: event.value,
            block_number: log.block_number.unwrap_or_default(),
            log_index: log.log_index.unwrap_or_default(),
        })
    }
}

/// A decoded bridge-side `MigrationCompleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCompletion {
    pub recipient: Address,
    pub amount: U256,
    pub block_number: u64,
    pub log_index: u64,
}

impl BridgeCompletion {
    pub fn query(bridge: Address) -> LogQuery {
        LogQuery::event(bridge, MigrationCompleted::SIGNATURE_HASH)
    }
}

impl TryFrom<&Log> for BridgeCompletion {
    type Error = GatewayError;

    fn try_from(log: &Log) -> Result<Self, Self::Error> {
        let event = MigrationCompleted::decode_log_data(log.data())
            .map_err(|e| GatewayError::Decode(format!("MigrationCompleted: {e}")))?;
        Ok(Self {
            recipient: event.recipient,
            amount: event.amount,
            block_number: log.block_number.unwrap_or_default(),
            log_index: log.log_index.unwrap_or_default(),
        })
    }
}
