// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::gateway::connect_gateway;
use crate::helpers::print_json;
use alloy::primitives::{Address, I256};
use anyhow::{anyhow, Result};
use cm_config::AppConfig;
use cm_ledger::HolderReconstruction;
use cm_utils::formatters::i256_decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HolderBalance {
    pub address: Address,
    #[serde(with = "i256_decimal")]
    pub balance: I256,
}

#[derive(Debug, Serialize)]
pub struct HoldersReport {
    #[serde(flatten)]
    pub reconstruction: HolderReconstruction,
    pub complete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_holders: Vec<HolderBalance>,
}

impl HoldersReport {
    pub fn new(reconstruction: HolderReconstruction, top: usize) -> Self {
        let top_holders = reconstruction
            .ledger
            .top_holders(top)
            .into_iter()
            .map(|(address, balance)| HolderBalance { address, balance })
            .collect();
        Self {
            complete: reconstruction.is_complete(),
            reconstruction,
            top_holders,
        }
    }
}

pub async fn execute(config: &AppConfig, chain: &str, token: &str, top: usize) -> Result<()> {
    let chain_config = config
        .chain(chain)
        .ok_or_else(|| anyhow!("Chain '{chain}' is not configured"))?;
    let token_config = chain_config
        .token(token)
        .ok_or_else(|| anyhow!("Token '{token}' is not configured on chain '{chain}'"))?;

    let gateway = connect_gateway(chain_config, config.request_timeout()).await;
    let reconstruction = cm_ledger::reconstruct_holders(
        gateway.as_ref(),
        token_config.address()?,
        &config.reconstruct_options(token_config)?,
    )
    .await;

    print_json(&HoldersReport::new(reconstruction, top))
}
