// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::AppConfig;
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::warn;
use url::Url;

#[derive(Clone, Debug)]
pub struct ValidUrl(Url);

impl FromStr for ValidUrl {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValidUrl(Url::parse(s)?))
    }
}

impl From<ValidUrl> for String {
    fn from(value: ValidUrl) -> Self {
        value.0.to_string()
    }
}

/// Reject configurations that cannot produce a meaningful run.
pub fn validate(config: &AppConfig) -> Result<()> {
    config.batch_options()?;

    let mut names = HashSet::new();
    for chain in config.chains() {
        if !names.insert(chain.name.as_str()) {
            bail!("Chain '{}' is configured more than once", chain.name);
        }
        let rpc = chain.rpc_url()?;
        for token in &chain.tokens {
            token.address()?;
            config.reconstruct_options(token)?;
            if token.deploy_block.is_none() && !rpc.is_local() {
                warn!(
                    chain = %chain.name,
                    token = %token.name,
                    rpc = %rpc.url(),
                    "No deploy_block set, the scan window may reach back to genesis"
                );
            }
        }
    }

    if let Some(migration) = config.migration() {
        let sides = [
            ("direct", &migration.direct.chain, migration.direct.deploy_block),
            ("bridged", &migration.bridged.chain, migration.bridged.deploy_block),
        ];
        for (side, chain, deploy_block) in sides {
            let Some(chain_config) = config.chain(chain) else {
                bail!("Migration refers to unknown chain '{chain}'");
            };
            let rpc = chain_config.rpc_url()?;
            if deploy_block.is_none() && !rpc.is_local() {
                warn!(
                    chain = %chain,
                    side = %side,
                    rpc = %rpc.url(),
                    "No deploy_block set for migration source, it will be scanned from genesis"
                );
            }
        }
        migration.excluded()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn parse(yaml: &str) -> AppConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_url() {
        assert!(ValidUrl::from_str("http://127.0.0.1:4317").is_ok());
        assert!(ValidUrl::from_str("127.0.0.1").is_err());
    }

    #[test]
    fn test_duplicate_chain() {
        let config = parse(
            r#"
chains:
  - { name: "sonic", rpc_url: "https://rpc.soniclabs.com" }
  - { name: "sonic", rpc_url: "https://rpc.soniclabs.com" }
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_rpc_and_token() {
        let bad_rpc = parse("chains: [{ name: a, rpc_url: \"ftp://nope\" }]");
        assert!(validate(&bad_rpc).is_err());

        let bad_token = parse(
            r#"
chains:
  - name: "a"
    rpc_url: "http://localhost:8545"
    tokens: [{ name: "t", address: "0xnothex" }]
"#,
        );
        assert!(validate(&bad_token).is_err());

        let zero_window = parse(
            r#"
chains:
  - name: "a"
    rpc_url: "http://localhost:8545"
    tokens: [{ name: "t", address: "0x00000000000000000000000000000000000000a1", max_window_blocks: 0 }]
"#,
        );
        assert!(validate(&zero_window).is_err());
    }

    #[test]
    fn test_migration_chain_must_exist() {
        let config = parse(
            r#"
chains:
  - { name: "sonic", rpc_url: "https://rpc.soniclabs.com" }
migration:
  direct: { chain: "ethereum", token: "0x00000000000000000000000000000000000000a1", contract: "0x00000000000000000000000000000000000000a2" }
  bridged: { chain: "sonic", contract: "0x00000000000000000000000000000000000000b1" }
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_deploy_block_is_allowed() {
        let config = parse(
            r#"
chains:
  - name: "sonic"
    rpc_url: "https://rpc.soniclabs.com"
    tokens: [{ name: "t", address: "0x00000000000000000000000000000000000000a1" }]
"#,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    #[traced_test]
    fn test_migration_without_deploy_block_warns() {
        let config = parse(
            r#"
chains:
  - { name: "ethereum", rpc_url: "https://eth.llamarpc.com" }
  - { name: "sonic", rpc_url: "https://rpc.soniclabs.com" }
migration:
  direct: { chain: "ethereum", token: "0x00000000000000000000000000000000000000a1", contract: "0x00000000000000000000000000000000000000a2" }
  bridged: { chain: "sonic", contract: "0x00000000000000000000000000000000000000b1", deploy_block: 100 }
"#,
        );
        assert!(validate(&config).is_ok());
        assert!(logs_contain(
            "No deploy_block set for migration source, it will be scanned from genesis"
        ));
        assert!(logs_contain("side=direct"));
        assert!(!logs_contain("side=bridged"));
    }

    #[test]
    #[traced_test]
    fn test_local_migration_source_does_not_warn() {
        let config = parse(
            r#"
chains:
  - { name: "ethereum", rpc_url: "http://localhost:8545" }
  - { name: "sonic", rpc_url: "http://127.0.0.1:8546" }
migration:
  direct: { chain: "ethereum", token: "0x00000000000000000000000000000000000000a1", contract: "0x00000000000000000000000000000000000000a2" }
  bridged: { chain: "sonic", contract: "0x00000000000000000000000000000000000000b1" }
"#,
        );
        assert!(validate(&config).is_ok());
        assert!(!logs_contain("No deploy_block set for migration source"));
    }
}
