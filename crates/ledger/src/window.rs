// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cm_evm::BlockRange;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Bounds how far back a reconstruction looks.
///
/// The scan starts `max_window_blocks` below the head but never before
/// `min_start_block` (normally the token's deploy block).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWindow {
    pub min_start_block: u64,
    pub max_window_blocks: NonZeroU64,
}

impl CoverageWindow {
    pub fn new(min_start_block: u64, max_window_blocks: NonZeroU64) -> Self {
        Self {
            min_start_block,
            max_window_blocks,
        }
    }

    /// The inclusive range to scan at chain height `head`. `None` when the
    /// start block lies beyond the head.
    pub fn resolve(&self, head: u64) -> Option<BlockRange> {
        let from_block = head
            .saturating_sub(self.max_window_blocks.get())
            .max(self.min_start_block);
        BlockRange::new(from_block, head)
    }
}
