use std::fmt::Display;

use alloy::{
    network::{ReceiptResponse as _, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{Provider, RootProvider},
    rpc::types::TransactionRequest,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;

use super::error::ChainFailure;

/// Access to a blockchain node.
///
/// Every failure is returned already classified, so that the facade doesn't
/// have to know which node or wallet produced it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identifier of the network the node is currently connected to.
    async fn network_id(&self) -> Result<u64, ChainFailure>;

    /// Execute a read-only call.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainFailure>;

    /// Submit a transaction signed by `from` and wait for it to be mined.
    async fn send(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash, ChainFailure>;
}

/// JSON-RPC transport over HTTP.
///
/// Transactions are submitted with `eth_sendTransaction`, so the node must be
/// able to sign for the sending account.
pub struct RpcTransport {
    provider: RootProvider,
}

impl RpcTransport {
    pub fn http(rpc_url: &str) -> Result<Self, ChainFailure> {
        let url = Url::parse(rpc_url)
            .map_err(|err| ChainFailure::classify(format!("invalid network url: {err}")))?;

        Ok(Self {
            provider: RootProvider::new_http(url),
        })
    }
}

fn failure<E: Display>(err: E) -> ChainFailure {
    ChainFailure::classify(err.to_string())
}

#[async_trait]
impl Transport for RpcTransport {
    async fn network_id(&self) -> Result<u64, ChainFailure> {
        self.provider.get_net_version().await.map_err(failure)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainFailure> {
        let request = TransactionRequest::default()
            .with_to(to)
            .with_input(data);

        self.provider.call(request).await.map_err(failure)
    }

    async fn send(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash, ChainFailure> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data);

        let receipt = self
            .provider
            .send_transaction(request)
            .await
            .map_err(failure)?
            .get_receipt()
            .await
            .map_err(failure)?;

        if receipt.status() {
            Ok(receipt.transaction_hash())
        } else {
            Err(ChainFailure::classify(format!(
                "execution reverted: transaction {} failed",
                receipt.transaction_hash()
            )))
        }
    }
}
