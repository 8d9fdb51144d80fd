// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::rpc::{RpcAuth, RPC};
use alloy_primitives::Address;
use anyhow::*;
use cm_ledger::{HolderStrategy, DEFAULT_MAX_WINDOW_BLOCKS};
use cm_utils::normalize_address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
    pub name: String,
    pub rpc_url: String,
    #[serde(default)]
    pub rpc_auth: RpcAuth,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

impl ChainConfig {
    pub fn rpc_url(&self) -> Result<RPC> {
        RPC::from_url(&self.rpc_url)
            .map_err(|e| anyhow!("Failed to parse RPC URL for chain {}: {}", self.name, e))
    }

    pub fn token(&self, name: &str) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.name == name)
    }
}

/// A token whose holders are reconstructed on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenConfig {
    pub name: String,
    pub address: String,
    /// First block worth scanning. Without it the window may reach genesis.
    pub deploy_block: Option<u64>,
    #[serde(default = "default_max_window_blocks")]
    pub max_window_blocks: u64,
    #[serde(default)]
    pub strategy: HolderStrategy,
    /// A staking receipt token. Its holders are reported as stakers and its
    /// supply as the staked amount.
    #[serde(default)]
    pub staking: bool,
}

fn default_max_window_blocks() -> u64 {
    DEFAULT_MAX_WINDOW_BLOCKS.get()
}

impl TokenConfig {
    pub fn address(&self) -> Result<Address> {
        normalize_address(&self.address)
            .with_context(|| format!("Invalid address for token {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_defaults() -> Result<()> {
        let chain: ChainConfig = serde_yaml::from_str(
            r#"
name: "sonic"
rpc_url: "https://rpc.soniclabs.com"
tokens:
  - name: "trevee"
    address: "0xe90FE2DE4A415aD48B6DcEc08bA6ae98231948Ac"
  - name: "strevee"
    address: "0x3ba32287b008ddf3c5a38df272369931e3030152"
    deploy_block: 1200
    max_window_blocks: 50000
    strategy: recent_recipients
    staking: true
"#,
        )?;

        assert_eq!(chain.rpc_auth, RpcAuth::None);

        let trevee = chain.token("trevee").unwrap();
        assert_eq!(trevee.max_window_blocks, 100_000);
        assert_eq!(trevee.strategy, HolderStrategy::BalanceReplay);
        assert_eq!(trevee.deploy_block, None);
        assert!(!trevee.staking);
        assert_eq!(
            trevee.address()?,
            normalize_address("0xe90fe2de4a415ad48b6dcec08ba6ae98231948ac")?
        );

        let staked = chain.token("strevee").unwrap();
        assert_eq!(staked.max_window_blocks, 50_000);
        assert_eq!(staked.strategy, HolderStrategy::RecentRecipients);
        assert!(staked.staking);
        assert!(chain.token("missing").is_none());
        Ok(())
    }

    #[test]
    fn test_bad_token_address() {
        let token = TokenConfig {
            name: "broken".to_string(),
            address: "0x1234".to_string(),
            deploy_block: None,
            max_window_blocks: 10,
            strategy: HolderStrategy::default(),
            staking: false,
        };
        assert!(token.address().is_err());
    }
}
