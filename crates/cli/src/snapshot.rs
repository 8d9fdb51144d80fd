// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::gateway::connect_gateway;
use crate::helpers::print_json;
use alloy::primitives::{Address, U256};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use cm_config::AppConfig;
use cm_evm::{token_supply, ChainGateway};
use cm_ledger::{reconstruct_holders, HolderReconstruction, ReconstructOptions};
use cm_migration::{Apportionment, MigrationSources, MigrationStats};
use cm_utils::formatters::{option_u256_decimal, u256_decimal};
use cm_utils::ExcludedAddresses;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct TokenTarget {
    pub name: String,
    pub address: Address,
    pub staking: bool,
    pub options: ReconstructOptions,
}

pub struct ChainTarget {
    pub name: String,
    pub gateway: Arc<dyn ChainGateway>,
    pub tokens: Vec<TokenTarget>,
}

pub struct MigrationTarget {
    pub sources: MigrationSources,
    pub excluded: ExcludedAddresses,
    pub combined_total: U256,
}

impl MigrationTarget {
    pub async fn run(&self) -> MigrationSnapshot {
        let stats = self.sources.aggregate(&self.excluded).await;
        let apportionment = stats.apportion(self.combined_total);
        MigrationSnapshot {
            stats,
            apportionment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationSnapshot {
    pub stats: MigrationStats,
    pub apportionment: Apportionment,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenSnapshot {
    pub chain: String,
    pub name: String,
    pub staking: bool,
    #[serde(with = "option_u256_decimal")]
    pub supply: Option<U256>,
    pub holders: HolderReconstruction,
}

impl TokenSnapshot {
    fn is_complete(&self) -> bool {
        self.supply.is_some() && self.holders.is_complete()
    }
}

/// Per-chain rollup. Plain tokens feed `supply` and `holders`, staking tokens
/// feed `staked` and `stakers`. A supply is `None` if any contributing read
/// failed. `circulating` is `supply - staked`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainSnapshot {
    #[serde(with = "option_u256_decimal")]
    pub supply: Option<U256>,
    pub holders: usize,
    #[serde(with = "option_u256_decimal")]
    pub staked: Option<U256>,
    pub stakers: usize,
    #[serde(with = "option_u256_decimal")]
    pub circulating: Option<U256>,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub chains: BTreeMap<String, ChainSnapshot>,
    pub total_holders: usize,
    pub total_stakers: usize,
    #[serde(with = "u256_decimal")]
    pub total_staked: U256,
    /// Sum over chains with a plain token. `None` if any of them lacks a
    /// circulating figure.
    #[serde(with = "option_u256_decimal")]
    pub circulating_supply: Option<U256>,
    pub tokens: Vec<TokenSnapshot>,
    pub migration: Option<MigrationSnapshot>,
}

impl Snapshot {
    fn from_parts(
        generated_at: DateTime<Utc>,
        chain_names: impl IntoIterator<Item = String>,
        tokens: Vec<TokenSnapshot>,
        migration: Option<MigrationSnapshot>,
    ) -> Self {
        let chains: BTreeMap<String, ChainSnapshot> = chain_names
            .into_iter()
            .map(|name| {
                let on_chain: Vec<&TokenSnapshot> =
                    tokens.iter().filter(|t| t.chain == name).collect();
                let (supply, holders) = rollup(on_chain.iter().copied().filter(|t| !t.staking));
                let (staked, stakers) = rollup(on_chain.iter().copied().filter(|t| t.staking));
                let has_staking = on_chain.iter().any(|t| t.staking);
                let circulating = match (supply, staked) {
                    (Some(supply), _) if !has_staking => Some(supply),
                    (Some(supply), Some(staked)) => Some(supply.saturating_sub(staked)),
                    _ => None,
                };
                let complete = on_chain.iter().all(|t| t.is_complete());
                (
                    name,
                    ChainSnapshot {
                        supply,
                        holders,
                        staked,
                        stakers,
                        circulating,
                        complete,
                    },
                )
            })
            .collect();

        let total_holders = chains.values().map(|c| c.holders).sum();
        let total_stakers = chains.values().map(|c| c.stakers).sum();
        let total_staked = chains
            .values()
            .filter_map(|c| c.staked)
            .fold(U256::ZERO, U256::saturating_add);
        let circulating_supply = tokens
            .iter()
            .filter(|t| !t.staking)
            .map(|t| t.chain.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|chain| chains.get(chain))
            .try_fold(U256::ZERO, |acc, c| Some(acc.saturating_add(c.circulating?)));

        Self {
            generated_at,
            chains,
            total_holders,
            total_stakers,
            total_staked,
            circulating_supply,
            tokens,
            migration,
        }
    }
}

/// Summed supply and holder count. The supply is `None` when there are no
/// tokens or any read failed.
fn rollup<'a>(tokens: impl Iterator<Item = &'a TokenSnapshot>) -> (Option<U256>, usize) {
    let mut supply: Option<U256> = None;
    let mut failed = false;
    let mut holders = 0;
    for token in tokens {
        holders += token.holders.holder_count;
        match token.supply {
            Some(v) => supply = Some(supply.unwrap_or_default().saturating_add(v)),
            None => failed = true,
        }
    }
    (if failed { None } else { supply }, holders)
}

async fn snapshot_token(chain: &ChainTarget, token: &TokenTarget) -> TokenSnapshot {
    let gateway = chain.gateway.as_ref();
    let (supply, holders) = tokio::join!(
        token_supply(gateway, token.address),
        reconstruct_holders(gateway, token.address, &token.options)
    );
    TokenSnapshot {
        chain: chain.name.clone(),
        name: token.name.clone(),
        staking: token.staking,
        supply,
        holders,
    }
}

/// Run every reconstruction and the migration aggregation concurrently.
#[instrument(skip_all)]
pub async fn collect_snapshot(
    chains: &[ChainTarget],
    migration: Option<&MigrationTarget>,
) -> Snapshot {
    let token_futures = chains
        .iter()
        .flat_map(|chain| chain.tokens.iter().map(move |token| snapshot_token(chain, token)));

    let migration_future = async {
        match migration {
            Some(target) => Some(target.run().await),
            None => None,
        }
    };

    let (tokens, migration) = tokio::join!(join_all(token_futures), migration_future);

    let snapshot = Snapshot::from_parts(
        Utc::now(),
        chains.iter().map(|c| c.name.clone()),
        tokens,
        migration,
    );
    info!(
        chains = snapshot.chains.len(),
        total_holders = snapshot.total_holders,
        total_stakers = snapshot.total_stakers,
        "Snapshot collected"
    );
    snapshot
}

/// One gateway per configured chain, shared by tokens and migration sources.
pub async fn connect_all(config: &AppConfig) -> HashMap<String, Arc<dyn ChainGateway>> {
    let timeout = config.request_timeout();
    let connected = join_all(config.chains().iter().map(|chain| async move {
        (chain.name.clone(), connect_gateway(chain, timeout).await)
    }))
    .await;
    connected.into_iter().collect()
}

pub fn chain_targets(
    config: &AppConfig,
    gateways: &HashMap<String, Arc<dyn ChainGateway>>,
) -> Result<Vec<ChainTarget>> {
    config
        .chains()
        .iter()
        .map(|chain| {
            let tokens = chain
                .tokens
                .iter()
                .map(|token| {
                    Ok(TokenTarget {
                        name: token.name.clone(),
                        address: token.address()?,
                        staking: token.staking,
                        options: config.reconstruct_options(token)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ChainTarget {
                name: chain.name.clone(),
                gateway: gateway_for(gateways, &chain.name)?,
                tokens,
            })
        })
        .collect()
}

pub fn migration_target(
    config: &AppConfig,
    gateways: &HashMap<String, Arc<dyn ChainGateway>>,
) -> Result<Option<MigrationTarget>> {
    let Some(migration) = config.migration() else {
        return Ok(None);
    };
    let sources = MigrationSources::new(
        gateway_for(gateways, &migration.direct.chain)?,
        migration.direct_source()?,
        gateway_for(gateways, &migration.bridged.chain)?,
        migration.bridged_source()?,
        config.batch_options()?,
    );
    Ok(Some(MigrationTarget {
        sources,
        excluded: migration.excluded()?,
        combined_total: migration.combined_total,
    }))
}

pub fn gateway_for(
    gateways: &HashMap<String, Arc<dyn ChainGateway>>,
    chain: &str,
) -> Result<Arc<dyn ChainGateway>> {
    gateways
        .get(chain)
        .cloned()
        .ok_or_else(|| anyhow!("Chain '{chain}' is not configured"))
}

pub async fn execute(config: &AppConfig) -> Result<()> {
    let gateways = connect_all(config).await;
    let chains = chain_targets(config, &gateways)?;
    let migration = migration_target(config, &gateways)?;

    let snapshot = collect_snapshot(&chains, migration.as_ref()).await;
    print_json(&snapshot)
}
