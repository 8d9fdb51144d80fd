// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, LogData, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use cm_evm::{MigrationCompleted, Transfer};

fn rpc_log(address: Address, data: LogData, block_number: u64, log_index: u64) -> Log {
    Log {
        inner: alloy::primitives::Log { address, data },
        block_number: Some(block_number),
        log_index: Some(log_index),
        transaction_hash: Some(B256::with_last_byte(log_index as u8)),
        ..Default::default()
    }
}

/// An ERC-20 `Transfer` log as an RPC node would return it.
pub fn transfer_log(
    token: Address,
    from: Address,
    to: Address,
    amount: u64,
    block_number: u64,
    log_index: u64,
) -> Log {
    let data = Transfer {
        from,
        to,
        value: U256::from(amount),
    }
    .encode_log_data();
    rpc_log(token, data, block_number, log_index)
}

/// A bridge `MigrationCompleted` log.
pub fn migration_completed_log(
    bridge: Address,
    recipient: Address,
    amount: u64,
    block_number: u64,
    log_index: u64,
) -> Log {
    let data = MigrationCompleted {
        recipient,
        amount: U256::from(amount),
    }
    .encode_log_data();
    rpc_log(bridge, data, block_number, log_index)
}

/// Carries the `Transfer` signature but no indexed arguments or data, so it
/// matches a `Transfer` query and then fails to decode.
pub fn malformed_transfer_log(token: Address, block_number: u64, log_index: u64) -> Log {
    let data = LogData::new_unchecked(vec![Transfer::SIGNATURE_HASH], Default::default());
    rpc_log(token, data, block_number, log_index)
}
