// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{BalanceLedger, CoverageWindow, HolderStrategy};
use alloy::primitives::Address;
use cm_evm::{
    fetch_logs_batched, BatchOptions, BlockRange, ChainGateway, TransferEvent, DEFAULT_BATCH_SIZE,
};
use serde::Serialize;
use std::num::NonZeroU64;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_WINDOW_BLOCKS: NonZeroU64 = match NonZeroU64::new(100_000) {
    Some(v) => v,
    None => unreachable!(),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Never scan below this block, normally the token's deploy block.
    pub min_start_block: u64,
    pub max_window_blocks: NonZeroU64,
    pub batch_size: NonZeroU64,
    pub strategy: HolderStrategy,
    pub max_retries: u32,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            min_start_block: 0,
            max_window_blocks: DEFAULT_MAX_WINDOW_BLOCKS,
            batch_size: DEFAULT_BATCH_SIZE,
            strategy: HolderStrategy::default(),
            max_retries: 0,
        }
    }
}

impl ReconstructOptions {
    pub fn coverage(&self) -> CoverageWindow {
        CoverageWindow::new(self.min_start_block, self.max_window_blocks)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            batch_size: self.batch_size,
            max_retries: self.max_retries,
        }
    }
}

/// Outcome of one holder reconstruction.
///
/// `holder_count` is exact for the window only when [`Self::is_complete`]
/// holds. Otherwise it is a lower bound.
#[derive(Debug, Clone, Serialize)]
pub struct HolderReconstruction {
    pub chain: String,
    pub token: Address,
    pub strategy: HolderStrategy,
    pub holder_count: usize,
    /// Chain height the window was resolved against. `None` when the head
    /// could not be read.
    pub head: Option<u64>,
    pub window: Option<BlockRange>,
    pub skipped_batches: Vec<BlockRange>,
    pub undecodable_logs: usize,
    #[serde(skip)]
    pub ledger: BalanceLedger,
}

impl HolderReconstruction {
    fn empty(chain: &str, token: Address, strategy: HolderStrategy, head: Option<u64>) -> Self {
        Self {
            chain: chain.to_string(),
            token,
            strategy,
            holder_count: 0,
            head,
            window: None,
            skipped_batches: vec![],
            undecodable_logs: 0,
            ledger: BalanceLedger::new(strategy),
        }
    }

    /// True when the head was read and every batch and log in the window was
    /// applied.
    pub fn is_complete(&self) -> bool {
        self.head.is_some() && self.skipped_batches.is_empty() && self.undecodable_logs == 0
    }
}

/// Rebuild the holder set of `token` from its `Transfer` log.
///
/// Never fails: an unreachable head yields an empty, incomplete result and a
/// failing batch is skipped while the rest of the window is still applied.
pub async fn reconstruct_holders<G>(
    gateway: &G,
    token: Address,
    options: &ReconstructOptions,
) -> HolderReconstruction
where
    G: ChainGateway + ?Sized,
{
    let chain = gateway.chain_name();

    let head = match gateway.current_block_height().await {
        Ok(head) => head,
        Err(e) => {
            warn!(chain, %token, error = %e, "Could not read chain head, reporting zero holders");
            return HolderReconstruction::empty(chain, token, options.strategy, None);
        }
    };

    let Some(window) = options.coverage().resolve(head) else {
        info!(
            chain,
            %token,
            head,
            min_start_block = options.min_start_block,
            "Start block is beyond chain head, nothing to scan"
        );
        return HolderReconstruction::empty(chain, token, options.strategy, Some(head));
    };

    info!(chain, %token, %window, strategy = %options.strategy, "Reconstructing holders");

    let mut ledger = BalanceLedger::new(options.strategy);
    let mut undecodable_logs = 0;
    let skipped_batches = fetch_logs_batched(
        gateway,
        &TransferEvent::query(token),
        window,
        options.batch_options(),
        |batch, logs| {
            for log in &logs {
                match TransferEvent::try_from(log) {
                    Ok(event) => ledger.record(&event),
                    Err(e) => {
                        debug!(chain, range = %batch, tx = ?log.transaction_hash, error = %e, "Skipping undecodable log");
                        undecodable_logs += 1;
                    }
                }
            }
        },
    )
    .await;

    if undecodable_logs > 0 {
        warn!(chain, %token, undecodable_logs, "Some Transfer logs could not be decoded");
    }

    let holder_count = ledger.holder_count();
    info!(
        chain,
        %token,
        holder_count,
        addresses = ledger.len(),
        skipped = skipped_batches.len(),
        "Holder reconstruction finished"
    );

    HolderReconstruction {
        chain: chain.to_string(),
        token,
        strategy: options.strategy,
        holder_count,
        head: Some(head),
        window: Some(window),
        skipped_batches,
        undecodable_logs,
        ledger,
    }
}
