// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::U256;
use anyhow::{Context, Result};
use cm_migration::{BridgedSource, DirectSource};
use cm_utils::formatters::u256_decimal;
use cm_utils::{normalize_address, ExcludedAddresses};
use serde::{Deserialize, Serialize};

/// Legacy chain side: transfers of `token` into `contract`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectMigrationConfig {
    pub chain: String,
    pub token: String,
    pub contract: String,
    pub deploy_block: Option<u64>,
}

/// Destination chain side: `MigrationCompleted` events of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgedMigrationConfig {
    pub chain: String,
    pub contract: String,
    pub deploy_block: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MigrationConfig {
    pub direct: DirectMigrationConfig,
    pub bridged: BridgedMigrationConfig,
    /// Treasury, deployer and other non-holder recipients.
    #[serde(default)]
    pub excluded: Vec<String>,
    /// Externally reported migrated amount to split across both sides.
    #[serde(default, with = "u256_decimal")]
    pub combined_total: U256,
}

impl MigrationConfig {
    pub fn direct_source(&self) -> Result<DirectSource> {
        Ok(DirectSource {
            token: normalize_address(&self.direct.token).context("Invalid migration token")?,
            migration_contract: normalize_address(&self.direct.contract)
                .context("Invalid migration contract")?,
            deploy_block: self.direct.deploy_block.unwrap_or_default(),
        })
    }

    pub fn bridged_source(&self) -> Result<BridgedSource> {
        Ok(BridgedSource {
            bridge: normalize_address(&self.bridged.contract)
                .context("Invalid bridge contract")?,
            deploy_block: self.bridged.deploy_block.unwrap_or_default(),
        })
    }

    /// The configured exclusions plus both migration contracts.
    pub fn excluded(&self) -> Result<ExcludedAddresses> {
        let mut addresses = self
            .excluded
            .iter()
            .map(|a| normalize_address(a))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid excluded address")?;
        addresses.push(self.direct_source()?.migration_contract);
        addresses.push(self.bridged_source()?.bridge);
        Ok(ExcludedAddresses::new(addresses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    const CONFIG: &str = r#"
direct:
  chain: "ethereum"
  token: "0x00000000000000000000000000000000000000A1"
  contract: "0x00000000000000000000000000000000000000a2"
  deploy_block: 19000000
bridged:
  chain: "sonic"
  contract: "0x00000000000000000000000000000000000000B1"
excluded:
  - "0x00000000000000000000000000000000000000EE"
combined_total: "25000000000000000000000000"
"#;

    #[test]
    fn test_sources_and_exclusions() -> Result<()> {
        let config: MigrationConfig = serde_yaml::from_str(CONFIG)?;

        let direct = config.direct_source()?;
        assert_eq!(direct.deploy_block, 19_000_000);
        assert_eq!(config.bridged_source()?.deploy_block, 0);
        assert_eq!(
            config.combined_total,
            U256::from(25_000_000u64) * U256::from(10u64).pow(U256::from(18u64))
        );

        let excluded = config.excluded()?;
        assert!(excluded.contains(&Address::ZERO));
        assert!(excluded.contains(&normalize_address(
            "0x00000000000000000000000000000000000000ee"
        )?));
        assert!(excluded.contains(&direct.migration_contract));
        assert!(excluded.contains(&config.bridged_source()?.bridge));
        assert_eq!(excluded.len(), 4);
        Ok(())
    }

    #[test]
    fn test_combined_total_defaults_to_zero() -> Result<()> {
        let config: MigrationConfig = serde_yaml::from_str(
            r#"
direct: { chain: a, token: "0x00000000000000000000000000000000000000a1", contract: "0x00000000000000000000000000000000000000a2" }
bridged: { chain: b, contract: "0x00000000000000000000000000000000000000b1" }
"#,
        )?;
        assert_eq!(config.combined_total, U256::ZERO);
        assert!(config.excluded.is_empty());
        Ok(())
    }
}
