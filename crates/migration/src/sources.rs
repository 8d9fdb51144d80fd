// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{aggregate_migrations, MigrationStats, PartialSource, SourceChain};
use alloy::primitives::Address;
use alloy::rpc::types::Log;
use cm_evm::{
    fetch_logs_batched, BatchOptions, BlockRange, BridgeCompletion, ChainGateway, GatewayError,
    LogQuery, TransferEvent,
};
use cm_utils::ExcludedAddresses;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Legacy token transfers into the migration contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectSource {
    pub token: Address,
    pub migration_contract: Address,
    pub deploy_block: u64,
}

/// `MigrationCompleted` events of the bridge contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgedSource {
    pub bridge: Address,
    pub deploy_block: u64,
}

/// Events of one source plus the batches that could not be fetched. The
/// events cover every other batch of the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFetch<T> {
    pub events: Vec<T>,
    pub skipped_batches: Vec<BlockRange>,
}

impl<T> SourceFetch<T> {
    pub fn is_complete(&self) -> bool {
        self.skipped_batches.is_empty()
    }
}

/// Fetches both sides of a migration, each from its own chain.
#[derive(Clone)]
pub struct MigrationSources {
    direct_gateway: Arc<dyn ChainGateway>,
    direct: DirectSource,
    bridged_gateway: Arc<dyn ChainGateway>,
    bridged: BridgedSource,
    batch: BatchOptions,
}

impl MigrationSources {
    pub fn new(
        direct_gateway: Arc<dyn ChainGateway>,
        direct: DirectSource,
        bridged_gateway: Arc<dyn ChainGateway>,
        bridged: BridgedSource,
        batch: BatchOptions,
    ) -> Self {
        Self {
            direct_gateway,
            direct,
            bridged_gateway,
            bridged,
            batch,
        }
    }

    pub async fn fetch_direct(&self) -> Result<SourceFetch<TransferEvent>, GatewayError> {
        let contract = self.direct.migration_contract;
        let mut fetched: SourceFetch<TransferEvent> = fetch_events(
            self.direct_gateway.as_ref(),
            &TransferEvent::query_to(self.direct.token, contract),
            self.direct.deploy_block,
            self.batch,
        )
        .await?;
        fetched.events.retain(|t| t.to == contract);
        Ok(fetched)
    }

    pub async fn fetch_bridged(&self) -> Result<SourceFetch<BridgeCompletion>, GatewayError> {
        fetch_events(
            self.bridged_gateway.as_ref(),
            &BridgeCompletion::query(self.bridged.bridge),
            self.bridged.deploy_block,
            self.batch,
        )
        .await
    }

    /// Fetch both sources concurrently and aggregate them. Events from the
    /// healthy batches of a partially fetched source are still counted.
    pub async fn aggregate(&self, excluded: &ExcludedAddresses) -> MigrationStats {
        let (direct, bridged) = tokio::join!(self.fetch_direct(), self.fetch_bridged());

        let mut partial_sources = vec![];
        let mut keep = |source: SourceChain, skipped_batches: Vec<BlockRange>| {
            if !skipped_batches.is_empty() {
                warn!(%source, skipped = skipped_batches.len(), "Migration source fetched partially");
                partial_sources.push(PartialSource {
                    source,
                    skipped_batches,
                });
            }
        };
        let direct = direct.map(|fetched| {
            keep(SourceChain::Direct, fetched.skipped_batches);
            fetched.events
        });
        let bridged = bridged.map(|fetched| {
            keep(SourceChain::Bridged, fetched.skipped_batches);
            fetched.events
        });

        let mut stats = aggregate_migrations(direct, bridged, excluded);
        stats.partial_sources = partial_sources;
        stats
    }
}

/// Every matching event from `deploy_block` to the head. Only a failure to
/// read the head fails the source; failed batches are reported alongside the
/// events of the others.
async fn fetch_events<T>(
    gateway: &dyn ChainGateway,
    query: &LogQuery,
    deploy_block: u64,
    batch: BatchOptions,
) -> Result<SourceFetch<T>, GatewayError>
where
    T: for<'a> TryFrom<&'a Log, Error = GatewayError>,
{
    let chain = gateway.chain_name();
    let head = gateway.current_block_height().await?;
    let Some(window) = BlockRange::new(deploy_block, head) else {
        info!(chain, deploy_block, head, "Deploy block is beyond chain head");
        return Ok(SourceFetch {
            events: vec![],
            skipped_batches: vec![],
        });
    };

    let mut events = vec![];
    let skipped_batches = fetch_logs_batched(gateway, query, window, batch, |_, logs| {
        for log in &logs {
            match T::try_from(log) {
                Ok(event) => events.push(event),
                Err(e) => debug!(chain, tx = ?log.transaction_hash, error = %e, "Skipping undecodable log"),
            }
        }
    })
    .await;

    Ok(SourceFetch {
        events,
        skipped_batches,
    })
}
