// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::BlockRange;
use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::{Filter, Log};
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The endpoint could not be reached at all.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
    /// The endpoint answered with an error payload, eg. the range was too large.
    #[error("Gateway rejected query: {0}")]
    Query(String),
    #[error("Gateway request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Could not decode gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True when the failure says nothing about the query itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Unavailable(_) | GatewayError::Timeout(_))
    }
}

impl From<TransportError> for GatewayError {
    fn from(value: TransportError) -> Self {
        match value {
            RpcError::ErrorResp(payload) => GatewayError::Query(payload.to_string()),
            RpcError::DeserError { err, .. } => GatewayError::Decode(err.to_string()),
            other => GatewayError::Unavailable(other.to_string()),
        }
    }
}

/// An `eth_getLogs` query without its block bounds.
///
/// `topics` is positional: index 0 is the event signature, 1..=3 the indexed
/// arguments. `None` matches anything at that position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub address: Address,
    pub topics: Vec<Option<B256>>,
}

impl LogQuery {
    pub fn event(address: Address, signature: B256) -> Self {
        Self {
            address,
            topics: vec![Some(signature)],
        }
    }

    /// Pin an indexed argument. `position` is the topic index (1..=3).
    pub fn with_topic(mut self, position: usize, topic: B256) -> Self {
        if self.topics.len() <= position {
            self.topics.resize(position + 1, None);
        }
        self.topics[position] = Some(topic);
        self
    }

    pub fn to_filter(&self, range: BlockRange) -> Filter {
        let mut filter = Filter::new()
            .address(self.address)
            .from_block(range.from_block())
            .to_block(range.to_block());

        for (position, topic) in self.topics.iter().enumerate() {
            let Some(topic) = *topic else {
                continue;
            };
            filter = match position {
                0 => filter.event_signature(topic),
                1 => filter.topic1(topic),
                2 => filter.topic2(topic),
                3 => filter.topic3(topic),
                _ => filter,
            };
        }
        filter
    }

    /// Whether a log would be returned by this query. Used by in-memory gateways.
    pub fn matches(&self, log: &Log) -> bool {
        if log.address() != self.address {
            return false;
        }
        let log_topics = log.topics();
        self.topics.iter().enumerate().all(|(i, topic)| match topic {
            None => true,
            Some(t) => log_topics.get(i) == Some(t),
        })
    }
}

/// The read-only chain capabilities the analytics depend on. Every call may
/// fail independently of the others.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Human readable chain name used in logs.
    fn chain_name(&self) -> &str;

    async fn current_block_height(&self) -> Result<u64, GatewayError>;

    async fn query_logs(
        &self,
        query: &LogQuery,
        range: BlockRange,
    ) -> Result<Vec<Log>, GatewayError>;

    /// ERC-20 `totalSupply()` of `token` in base units.
    async fn total_supply(&self, token: Address) -> Result<U256, GatewayError>;
}

#[async_trait]
impl<G: ChainGateway + ?Sized> ChainGateway for Arc<G> {
    fn chain_name(&self) -> &str {
        (**self).chain_name()
    }

    async fn current_block_height(&self) -> Result<u64, GatewayError> {
        (**self).current_block_height().await
    }

    async fn query_logs(
        &self,
        query: &LogQuery,
        range: BlockRange,
    ) -> Result<Vec<Log>, GatewayError> {
        (**self).query_logs(query, range).await
    }

    async fn total_supply(&self, token: Address) -> Result<U256, GatewayError> {
        (**self).total_supply(token).await
    }
}
