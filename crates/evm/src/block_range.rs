// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Inclusive span of blocks `[from_block, to_block]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    from_block: u64,
    to_block: u64,
}

impl BlockRange {
    /// Returns `None` when `to_block < from_block`.
    pub fn new(from_block: u64, to_block: u64) -> Option<Self> {
        (from_block <= to_block).then_some(Self {
            from_block,
            to_block,
        })
    }

    pub fn from_block(&self) -> u64 {
        self.from_block
    }

    pub fn to_block(&self) -> u64 {
        self.to_block
    }

    /// Number of blocks in the range. Saturates for the full `u64` span.
    pub fn len(&self) -> u64 {
        (self.to_block - self.from_block).saturating_add(1)
    }

    pub fn contains(&self, block: u64) -> bool {
        self.from_block <= block && block <= self.to_block
    }

    /// Split into consecutive sub-ranges of at most `batch_size` blocks.
    pub fn batches(&self, batch_size: NonZeroU64) -> Batches {
        Batches {
            cursor: Some(self.from_block),
            end: self.to_block,
            batch_size: batch_size.get(),
        }
    }

    pub fn batch_count(&self, batch_size: NonZeroU64) -> u64 {
        let size = batch_size.get();
        let len = self.len();
        len / size + u64::from(len % size != 0)
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from_block, self.to_block)
    }
}

/// Iterator produced by [`BlockRange::batches`].
#[derive(Debug, Clone)]
pub struct Batches {
    cursor: Option<u64>,
    end: u64,
    batch_size: u64,
}

impl Iterator for Batches {
    type Item = BlockRange;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor?;
        let chunk_end = start.saturating_add(self.batch_size - 1).min(self.end);
        self.cursor = (chunk_end < self.end).then(|| chunk_end + 1);
        Some(BlockRange {
            from_block: start,
            to_block: chunk_end,
        })
    }
}
