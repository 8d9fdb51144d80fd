// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ChainGateway;
use alloy::primitives::{Address, U256};
use tracing::{debug, warn};

/// Current `totalSupply()` of `token`, or `None` when the chain cannot answer.
pub async fn token_supply<G>(gateway: &G, token: Address) -> Option<U256>
where
    G: ChainGateway + ?Sized,
{
    match gateway.total_supply(token).await {
        Ok(supply) => {
            debug!(chain = gateway.chain_name(), %token, %supply, "Read token supply");
            Some(supply)
        }
        Err(e) => {
            warn!(
                chain = gateway.chain_name(),
                %token,
                error = %e,
                "Could not read token supply"
            );
            None
        }
    }
}
