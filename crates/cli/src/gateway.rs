// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::Log,
    transports::{
        http::{
            reqwest::{
                header::{HeaderMap, HeaderValue, AUTHORIZATION},
                Client,
            },
            Http,
        },
        ws::{WebSocketConfig, WsConnect},
        Authorization,
    },
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use cm_config::{ChainConfig, RpcAuth, RPC};
use cm_evm::{BlockRange, ChainGateway, EvmChainGateway, GatewayError, LogQuery};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub trait AuthConversions {
    fn to_header_value(&self) -> Option<HeaderValue>;
    fn to_ws_auth(&self) -> Option<Authorization>;
}

impl AuthConversions for RpcAuth {
    fn to_header_value(&self) -> Option<HeaderValue> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{}:{}", username, password));
                HeaderValue::from_str(&format!("Basic {}", credentials)).ok()
            }
            RpcAuth::Bearer(token) => HeaderValue::from_str(&format!("Bearer {}", token)).ok(),
        }
    }

    fn to_ws_auth(&self) -> Option<Authorization> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => Some(Authorization::basic(username, password)),
            RpcAuth::Bearer(token) => Some(Authorization::bearer(token)),
        }
    }
}

pub struct ProviderConfig {
    rpc: RPC,
    auth: RpcAuth,
}

impl ProviderConfig {
    pub fn new(rpc: RPC, auth: RpcAuth) -> Self {
        Self { rpc, auth }
    }

    /// Read-only provider. HTTP providers connect lazily, websocket ones
    /// handshake here.
    pub async fn create_readonly_provider(&self) -> Result<DynProvider<Ethereum>> {
        if self.rpc.is_websocket() {
            let provider = ProviderBuilder::new()
                .connect_ws(self.create_ws_connect())
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?;
            Ok(provider.erased())
        } else {
            let provider = ProviderBuilder::new().connect_client(self.create_http_client()?);
            Ok(provider.erased())
        }
    }

    fn create_ws_connect(&self) -> WsConnect {
        let config = WebSocketConfig::default()
            .max_frame_size(Some(32 * 1024 * 1024))
            .max_message_size(Some(32 * 1024 * 1024));

        let mut ws_connect = WsConnect::new(self.rpc.url().as_str()).with_config(config);

        if let Some(auth) = self.auth.to_ws_auth() {
            ws_connect = ws_connect.with_auth(auth);
        }

        ws_connect
    }

    fn create_http_client(&self) -> Result<alloy::rpc::client::RpcClient> {
        let mut headers = HeaderMap::new();
        if let Some(auth_header) = self.auth.to_header_value() {
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let http = Http::with_client(client, self.rpc.url().as_str().parse()?);
        Ok(alloy::rpc::client::RpcClient::new(http, false))
    }
}

/// Stands in for a chain whose RPC could not be reached at startup so the
/// rest of the run can go ahead.
pub struct UnreachableGateway {
    name: String,
    reason: String,
}

impl UnreachableGateway {
    pub fn new(name: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            reason,
        }
    }

    fn error(&self) -> GatewayError {
        GatewayError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl ChainGateway for UnreachableGateway {
    fn chain_name(&self) -> &str {
        &self.name
    }

    async fn current_block_height(&self) -> Result<u64, GatewayError> {
        Err(self.error())
    }

    async fn query_logs(
        &self,
        _query: &LogQuery,
        _range: BlockRange,
    ) -> Result<Vec<Log>, GatewayError> {
        Err(self.error())
    }

    async fn total_supply(&self, _token: Address) -> Result<U256, GatewayError> {
        Err(self.error())
    }
}

/// Gateway for a configured chain. Connection failures are logged and turned
/// into an [`UnreachableGateway`] rather than aborting the run.
pub async fn connect_gateway(chain: &ChainConfig, timeout: Duration) -> Arc<dyn ChainGateway> {
    match try_connect(chain, timeout).await {
        Ok(gateway) => {
            info!(chain = %chain.name, "Connected to RPC");
            Arc::new(gateway)
        }
        Err(e) => {
            warn!(chain = %chain.name, error = %e, "RPC unreachable, chain will report no data");
            Arc::new(UnreachableGateway::new(&chain.name, format!("{e:#}")))
        }
    }
}

async fn try_connect(chain: &ChainConfig, timeout: Duration) -> Result<EvmChainGateway> {
    let config = ProviderConfig::new(chain.rpc_url()?, chain.rpc_auth.clone());
    let provider = tokio::time::timeout(timeout, config.create_readonly_provider())
        .await
        .context("Timed out connecting to RPC")??;
    Ok(EvmChainGateway::new(&chain.name, provider, timeout))
}
