// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;
use async_trait::async_trait;
use cm_evm::{BlockRange, ChainGateway, GatewayError, LogQuery};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory [`ChainGateway`] holding a fixed set of logs.
///
/// Clones share state so a test can keep a handle and inspect the ranges the
/// code under test asked for.
#[derive(Clone)]
pub struct MockGateway {
    name: String,
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    head: Option<u64>,
    logs: Vec<Log>,
    supplies: HashMap<Address, U256>,
    failing_ranges: Vec<BlockRange>,
    queried: Vec<BlockRange>,
    unavailable: bool,
}

impl MockGateway {
    pub fn new(name: &str, head: u64) -> Self {
        Self {
            name: name.to_string(),
            inner: Arc::new(Mutex::new(MockState {
                head: Some(head),
                ..Default::default()
            })),
        }
    }

    /// Every call fails with [`GatewayError::Unavailable`].
    pub fn unavailable(name: &str) -> Self {
        let gateway = Self::new(name, 0);
        gateway.state().unavailable = true;
        gateway
    }

    pub fn with_logs(self, logs: impl IntoIterator<Item = Log>) -> Self {
        self.state().logs.extend(logs);
        self
    }

    pub fn with_supply(self, token: Address, supply: u64) -> Self {
        self.state().supplies.insert(token, U256::from(supply));
        self
    }

    /// Queries overlapping `range` fail with [`GatewayError::Query`].
    pub fn fail_range(self, range: BlockRange) -> Self {
        self.state().failing_ranges.push(range);
        self
    }

    /// Ranges passed to `query_logs`, in call order.
    pub fn queried_ranges(&self) -> Vec<BlockRange> {
        self.state().queried.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap()
    }

    fn check_available(&self, state: &MockState) -> Result<(), GatewayError> {
        if state.unavailable {
            return Err(GatewayError::Unavailable(format!(
                "{}: connection refused",
                self.name
            )));
        }
        Ok(())
    }
}

fn overlaps(a: &BlockRange, b: &BlockRange) -> bool {
    a.from_block() <= b.to_block() && b.from_block() <= a.to_block()
}

#[async_trait]
impl ChainGateway for MockGateway {
    fn chain_name(&self) -> &str {
        &self.name
    }

    async fn current_block_height(&self) -> Result<u64, GatewayError> {
        let state = self.state();
        self.check_available(&state)?;
        state
            .head
            .ok_or_else(|| GatewayError::Unavailable("no head".to_string()))
    }

    async fn query_logs(
        &self,
        query: &LogQuery,
        range: BlockRange,
    ) -> Result<Vec<Log>, GatewayError> {
        let mut state = self.state();
        state.queried.push(range);
        self.check_available(&state)?;

        if state.failing_ranges.iter().any(|r| overlaps(r, &range)) {
            return Err(GatewayError::Query(format!(
                "query for {range} returned more than 10000 results"
            )));
        }

        let mut logs: Vec<Log> = state
            .logs
            .iter()
            .filter(|log| {
                log.block_number
                    .map(|b| range.contains(b))
                    .unwrap_or(false)
            })
            .filter(|log| query.matches(log))
            .cloned()
            .collect();
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        Ok(logs)
    }

    async fn total_supply(&self, token: Address) -> Result<U256, GatewayError> {
        let state = self.state();
        self.check_available(&state)?;
        state
            .supplies
            .get(&token)
            .copied()
            .ok_or_else(|| GatewayError::Query(format!("execution reverted: {token}")))
    }
}
