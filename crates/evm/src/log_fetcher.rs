// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{BlockRange, ChainGateway, LogQuery};
use alloy::rpc::types::Log;
use cm_utils::retry_with_backoff;
use std::num::NonZeroU64;
use tracing::{info, warn};

/// Most public RPCs reject `eth_getLogs` spans much wider than this.
pub const DEFAULT_BATCH_SIZE: NonZeroU64 = match NonZeroU64::new(5_000) {
    Some(v) => v,
    None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: NonZeroU64,
    /// Extra attempts per batch. Zero abandons a failing batch straight away.
    pub max_retries: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: 0,
        }
    }
}

/// Walk `window` in consecutive batches, handing each batch's logs to
/// `on_batch` in ascending block order.
///
/// A batch that still fails after its retries is skipped, not fatal. The
/// skipped ranges are returned so callers can tell a partial scan from a
/// complete one.
pub async fn fetch_logs_batched<G, F>(
    gateway: &G,
    query: &LogQuery,
    window: BlockRange,
    options: BatchOptions,
    mut on_batch: F,
) -> Vec<BlockRange>
where
    G: ChainGateway + ?Sized,
    F: FnMut(BlockRange, Vec<Log>),
{
    let chain = gateway.chain_name();
    let total_batches = window.batch_count(options.batch_size);

    info!(
        chain,
        address = %query.address,
        %window,
        total_batches,
        "Fetching logs in batches"
    );

    let mut skipped = Vec::new();
    for (idx, batch) in window.batches(options.batch_size).enumerate() {
        let result = retry_with_backoff("eth_getLogs", options.max_retries, || {
            gateway.query_logs(query, batch)
        })
        .await;

        match result {
            Ok(logs) => {
                info!(
                    chain,
                    batch = idx + 1,
                    total_batches,
                    range = %batch,
                    events = logs.len(),
                    "Fetched log batch"
                );
                on_batch(batch, logs);
            }
            Err(e) => {
                warn!(
                    chain,
                    batch = idx + 1,
                    total_batches,
                    range = %batch,
                    error = %e,
                    "Skipping log batch"
                );
                skipped.push(batch);
            }
        }
    }

    info!(
        chain,
        fetched = total_batches - skipped.len() as u64,
        skipped = skipped.len(),
        "Log fetch complete"
    );
    skipped
}
