//! Chain access: one signer, one outstanding transaction at a time.
//!
//! `ChainClient` is the seam between the transaction state machines and the node.
//! Implementations submit exactly what they are given and never retry; retry policy
//! belongs to the caller.

mod contracts;
pub mod rpc;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tracing::{error, info};

use crate::error::ChainError;

pub use contracts::{ContractCall, REFERRAL_CODE};
pub use rpc::RpcChainClient;

/// Legacy gas parameters applied to every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSettings {
    /// Gas price in wei
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// One transaction attempt: target, call, attached value and gas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub call: ContractCall,
    /// Native currency attached to the call (non-zero only for native deposits)
    pub value: U256,
    pub gas: GasSettings,
}

impl CallRequest {
    pub fn new(to: Address, call: ContractCall, gas: GasSettings) -> Self {
        Self {
            to,
            call,
            value: U256::ZERO,
            gas,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn method(&self) -> &'static str {
        self.call.method()
    }
}

/// Identifier of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub tx_hash: TxHash,
}

/// Successful inclusion of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the process signer
    fn signer_address(&self) -> Address;

    /// Sign and broadcast. Consumes a nonce only when the node accepts the transaction.
    async fn submit(&self, request: &CallRequest) -> Result<TxHandle, ChainError>;

    /// Block until the transaction is included; a failed receipt is `Reverted`.
    async fn await_inclusion(&self, handle: TxHandle) -> Result<InclusionReceipt, ChainError>;
}

/// Submit `request` and wait for its inclusion, logging each step.
pub async fn send_and_confirm(
    chain: &dyn ChainClient,
    label: &str,
    request: &CallRequest,
) -> Result<InclusionReceipt, ChainError> {
    let handle = match chain.submit(request).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(
                kind = %e.kind,
                method = request.method(),
                to = %request.to,
                "{label} submission failed: {}",
                e.reason()
            );
            return Err(e);
        }
    };
    info!(
        tx_hash = %handle.tx_hash,
        method = request.method(),
        to = %request.to,
        "{label} transaction sent"
    );

    match chain.await_inclusion(handle).await {
        Ok(receipt) => {
            info!(
                tx_hash = %receipt.tx_hash,
                block = ?receipt.block_number,
                gas_used = receipt.gas_used,
                "{label} transaction included"
            );
            Ok(receipt)
        }
        Err(e) => {
            error!(
                kind = %e.kind,
                tx_hash = %handle.tx_hash,
                "{label} transaction failed: {}",
                e.reason()
            );
            Err(e)
        }
    }
}
