use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::RpcError;
use log::debug;
use url::Url;

use crate::abis::IERC20;
use crate::config::ChainSettings;
use crate::error::{Error, Result};

/// Timeout for individual RPC calls (30 seconds)
const RPC_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to the chain the tracked token lives on.
pub trait ChainReader: Send + Sync {
    /// Latest block number.
    fn current_block_height(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Raw smallest-unit balance of the tracked token held by `address`.
    fn token_balance(&self, address: &str) -> impl Future<Output = Result<U256>> + Send;
}

/// [`ChainReader`] over a JSON-RPC node.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider,
    token: Address,
}

impl RpcChainReader {
    pub fn new(settings: &ChainSettings) -> Result<Self> {
        let url = Url::parse(&settings.rpc_url)
            .map_err(|e| Error::Config(format!("invalid rpc_url {}: {}", settings.rpc_url, e)))?;
        let token = settings.token_address.trim().parse::<Address>().map_err(|e| {
            Error::Config(format!(
                "invalid token_address {}: {}",
                settings.token_address, e
            ))
        })?;

        let client = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            provider: DynProvider::new(client),
            token,
        })
    }
}

impl ChainReader for RpcChainReader {
    async fn current_block_height(&self) -> Result<u64> {
        let block = tokio::time::timeout(RPC_CALL_TIMEOUT, self.provider.get_block_number())
            .await
            .map_err(|_| Error::Network("block number request timed out".to_string()))?
            .map_err(|e| Error::Network(format!("block number: {}", e)))?;

        debug!("Current block {}", block);
        Ok(block)
    }

    async fn token_balance(&self, address: &str) -> Result<U256> {
        let holder = address
            .parse::<Address>()
            .map_err(|e| Error::ContractCall(format!("invalid address {}: {}", address, e)))?;

        let token = IERC20::new(self.token, &self.provider);

        let balance = tokio::time::timeout(RPC_CALL_TIMEOUT, token.balanceOf(holder).call())
            .await
            .map_err(|_| Error::Network("balanceOf request timed out".to_string()))?
            .map_err(classify_call_error)?;

        debug!("Balance of {} is {}", address, balance);
        Ok(balance)
    }
}

/// Node error responses (reverts included) are call errors; anything else
/// from the transport is a network error.
fn classify_call_error(err: alloy::contract::Error) -> Error {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            Error::ContractCall(format!("balanceOf rejected: {}", payload))
        },
        alloy::contract::Error::TransportError(e) => Error::Network(format!("balanceOf: {}", e)),
        other => Error::ContractCall(format!("balanceOf: {}", other)),
    }
}
