//! Alloy provider-backed `ChainClient`

use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use alloy::providers::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use super::{CallRequest, ChainClient, InclusionReceipt, TxHandle};
use crate::error::{ChainError, ChainErrorKind, LendloopError, Result};
use crate::signing::Wallet;

/// Chain client over an HTTP node with a local signer.
///
/// Nonces are filled from the node's pending count on every submission, which is
/// sound because the rest of the crate never has two transactions in flight.
pub struct RpcChainClient {
    provider: DynProvider,
    signer: Address,
    receipt_timeout: Option<Duration>,
}

impl RpcChainClient {
    /// Build a signing provider for `rpc_url`
    pub fn connect(rpc_url: &str, wallet: &Wallet, receipt_timeout: Option<Duration>) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| LendloopError::RpcUrl(format!("{rpc_url}: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased();

        Ok(Self {
            provider,
            signer: wallet.address(),
            receipt_timeout,
        })
    }

    /// Confirm the node answers before any transaction is attempted
    pub async fn check_connection(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| LendloopError::Chain(classify_transport_error(e)))?;
        info!(chain_id, signer = %self.signer, "Connected to chain node");
        Ok(chain_id)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn submit(&self, request: &CallRequest) -> std::result::Result<TxHandle, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(request.to)
            .with_input(request.call.calldata())
            .with_value(request.value)
            .with_gas_price(request.gas.gas_price)
            .with_gas_limit(request.gas.gas_limit);

        debug!(
            method = request.method(),
            to = %request.to,
            value = %request.value,
            gas_price = request.gas.gas_price,
            gas_limit = request.gas.gas_limit,
            "Submitting transaction"
        );

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(classify_transport_error)?;

        Ok(TxHandle {
            tx_hash: *pending.tx_hash(),
        })
    }

    async fn await_inclusion(
        &self,
        handle: TxHandle,
    ) -> std::result::Result<InclusionReceipt, ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), handle.tx_hash)
            .with_timeout(self.receipt_timeout)
            .get_receipt()
            .await
            .map_err(classify_pending_error)?;

        if !receipt.status() {
            return Err(ChainError::receipt_reverted(handle.tx_hash));
        }

        Ok(InclusionReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

/// JSON-RPC error payloads come from the node (reverted or rejected); transport
/// failures mean the node was not reached.
fn classify_transport_error(err: TransportError) -> ChainError {
    match &err {
        RpcError::ErrorResp(payload) => {
            let mut classified = ChainError::from_node_message(payload.message.to_string());
            classified.message = err.to_string();
            classified
        }
        RpcError::Transport(_) => ChainError::new(ChainErrorKind::Network, err.to_string()),
        _ => ChainError::classify(err.to_string()),
    }
}

fn classify_pending_error(err: PendingTransactionError) -> ChainError {
    match err {
        PendingTransactionError::TransportError(e) => classify_transport_error(e),
        other => ChainError::classify(other.to_string()),
    }
}
