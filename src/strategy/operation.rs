//! Argument and value shaping for the two asset paths

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;

use crate::chain::{CallRequest, ContractCall, GasSettings, REFERRAL_CODE};
use crate::config::OperationParams;

/// ERC-20 asset deposited directly into the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20Operation {
    pub pool: Address,
    pub asset: Address,
    /// Base units (18 decimals)
    pub amount: U256,
    pub display_amount: Decimal,
}

/// Native currency routed through the gateway contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeOperation {
    pub gateway: Address,
    pub pool: Address,
    /// Token approved for the gateway when a deposit reverts
    pub approval_token: Address,
    /// Wei
    pub amount: U256,
    pub display_amount: Decimal,
}

/// The economic action a cycle repeats.
///
/// Both variants share one state machine in `OperationExecutor`; they differ only
/// in how the call and its value are shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOperation {
    Erc20(Erc20Operation),
    Native(NativeOperation),
}

impl AssetOperation {
    pub fn erc20(params: &OperationParams) -> Self {
        AssetOperation::Erc20(Erc20Operation {
            pool: params.pool,
            asset: params.asset,
            amount: params.amount,
            display_amount: params.amount_display,
        })
    }

    pub fn native(params: &OperationParams) -> Self {
        AssetOperation::Native(NativeOperation {
            gateway: params.native_gateway,
            pool: params.pool,
            approval_token: params.asset,
            amount: params.native_amount,
            display_amount: params.native_amount_display,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AssetOperation::Erc20(_) => "ERC-20",
            AssetOperation::Native(_) => "native",
        }
    }

    /// Contract every deposit and withdraw call is sent to
    pub fn target(&self) -> Address {
        match self {
            AssetOperation::Erc20(op) => op.pool,
            AssetOperation::Native(op) => op.gateway,
        }
    }

    /// (token, spender) approved when a deposit reverts
    pub fn approval(&self) -> (Address, Address) {
        match self {
            AssetOperation::Erc20(op) => (op.asset, op.pool),
            AssetOperation::Native(op) => (op.approval_token, op.gateway),
        }
    }

    /// Human-readable quantity for log lines
    pub fn describe(&self) -> String {
        match self {
            AssetOperation::Erc20(op) => format!("{} of {}", op.display_amount, op.asset),
            AssetOperation::Native(op) => format!("{} ETH", op.display_amount),
        }
    }

    /// Native deposits carry the amount as transaction value and no amount argument.
    pub fn deposit_request(&self, beneficiary: Address, gas: GasSettings) -> CallRequest {
        match self {
            AssetOperation::Erc20(op) => CallRequest::new(
                op.pool,
                ContractCall::Deposit {
                    asset: op.asset,
                    amount: op.amount,
                    on_behalf_of: beneficiary,
                    referral_code: REFERRAL_CODE,
                },
                gas,
            ),
            AssetOperation::Native(op) => CallRequest::new(
                op.gateway,
                ContractCall::DepositEth {
                    pool: op.pool,
                    on_behalf_of: beneficiary,
                    referral_code: REFERRAL_CODE,
                },
                gas,
            )
            .with_value(op.amount),
        }
    }

    /// Native withdrawals carry the amount as an argument and no value.
    pub fn withdraw_request(&self, recipient: Address, gas: GasSettings) -> CallRequest {
        match self {
            AssetOperation::Erc20(op) => CallRequest::new(
                op.pool,
                ContractCall::Withdraw {
                    asset: op.asset,
                    amount: op.amount,
                    to: recipient,
                },
                gas,
            ),
            AssetOperation::Native(op) => CallRequest::new(
                op.gateway,
                ContractCall::WithdrawEth {
                    pool: op.pool,
                    amount: op.amount,
                    to: recipient,
                },
                gas,
            ),
        }
    }
}
