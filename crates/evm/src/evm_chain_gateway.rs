// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{BlockRange, ChainGateway, GatewayError, LogQuery, IERC20};
use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::Log;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`ChainGateway`] backed by an alloy provider. Every request is bounded by
/// `request_timeout`; an elapsed timeout is reported as [`GatewayError::Timeout`].
#[derive(Clone)]
pub struct EvmChainGateway {
    name: String,
    provider: DynProvider<Ethereum>,
    request_timeout: Duration,
}

impl EvmChainGateway {
    pub fn new(
        name: impl Into<String>,
        provider: DynProvider<Ethereum>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            request_timeout,
        }
    }

    async fn bounded<T, E, F>(&self, fut: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<GatewayError>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(GatewayError::Timeout(self.request_timeout)),
        }
    }
}

#[async_trait]
impl ChainGateway for EvmChainGateway {
    fn chain_name(&self) -> &str {
        &self.name
    }

    async fn current_block_height(&self) -> Result<u64, GatewayError> {
        self.bounded(self.provider.get_block_number()).await
    }

    async fn query_logs(
        &self,
        query: &LogQuery,
        range: BlockRange,
    ) -> Result<Vec<Log>, GatewayError> {
        let filter = query.to_filter(range);
        trace!(chain = %self.name, %range, "eth_getLogs");
        self.bounded(self.provider.get_logs(&filter)).await
    }

    async fn total_supply(&self, token: Address) -> Result<U256, GatewayError> {
        let contract = IERC20::new(token, self.provider.clone());
        let call = contract.totalSupply();
        self.bounded(async { call.call().await.map_err(contract_error) })
            .await
    }
}

fn contract_error(err: alloy::contract::Error) -> GatewayError {
    match err {
        alloy::contract::Error::TransportError(e) => e.into(),
        other => GatewayError::Decode(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    fn refused() -> EvmChainGateway {
        // nothing listens on port 1
        let provider = ProviderBuilder::new().connect_http("http://127.0.0.1:1".parse().unwrap());
        EvmChainGateway::new("local", provider.erased(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let gateway = refused();
        assert_eq!(gateway.chain_name(), "local");

        let err = gateway.current_block_height().await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");

        let err = gateway.total_supply(Address::ZERO).await.unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_query_logs_refused() {
        let gateway = refused();
        let query = crate::TransferEvent::query(Address::ZERO);
        let range = BlockRange::new(0, 10).unwrap();
        assert!(gateway.query_logs(&query, range).await.is_err());
    }
}
