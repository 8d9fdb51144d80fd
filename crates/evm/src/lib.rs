// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod block_range;
mod events;
mod evm_chain_gateway;
mod gateway;
mod log_fetcher;
mod supply;

pub use block_range::*;
pub use events::*;
pub use evm_chain_gateway::*;
pub use gateway::*;
pub use log_fetcher::*;
pub use supply::*;
