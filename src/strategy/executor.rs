use alloy::primitives::TxHash;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::operation::AssetOperation;
use crate::allowance::AllowanceManager;
use crate::chain::{send_and_confirm, ChainClient, GasSettings, InclusionReceipt};
use crate::error::ChainError;

/// Result of one logical deposit or withdraw call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    /// Transaction attempts made, including the retry
    pub attempts: u8,
    /// An approval transaction was attempted as compensation
    pub approval_attempted: bool,
    pub tx_hash: Option<TxHash>,
    /// Short failure reason for the log
    pub reason: Option<String>,
}

impl ActionOutcome {
    fn succeeded(mut self, receipt: InclusionReceipt) -> Self {
        self.success = true;
        self.tx_hash = Some(receipt.tx_hash);
        self.reason = None;
        self
    }

    fn failed(mut self, reason: impl Into<String>) -> Self {
        self.success = false;
        self.reason = Some(reason.into());
        self
    }
}

/// Deposit lifecycle: one revert-triggered approval, then at most one retry
#[derive(Debug)]
enum DepositState {
    Submit,
    ApproveAndRetry { revert_reason: String },
    Retry,
    Succeeded(InclusionReceipt),
    Failed(String),
}

/// Performs deposits and withdrawals for one asset path
pub struct OperationExecutor {
    chain: Arc<dyn ChainClient>,
    allowance: AllowanceManager,
    operation: AssetOperation,
    gas: GasSettings,
}

impl OperationExecutor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        allowance: AllowanceManager,
        operation: AssetOperation,
        gas: GasSettings,
    ) -> Self {
        Self {
            chain,
            allowance,
            operation,
            gas,
        }
    }

    pub fn operation(&self) -> &AssetOperation {
        &self.operation
    }

    /// Deposit, approving and retrying once if the first attempt reverts
    pub async fn deposit(&self) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        let mut state = DepositState::Submit;

        info!(
            kind = self.operation.kind(),
            "Attempting to deposit {}",
            self.operation.describe()
        );

        loop {
            state = match state {
                DepositState::Submit => {
                    outcome.attempts += 1;
                    match self.send_deposit("Deposit").await {
                        Ok(receipt) => DepositState::Succeeded(receipt),
                        Err(e) if e.is_revert() => {
                            warn!(
                                "Deposit reverted ({}). Attempting to approve and retry deposit...",
                                e.reason()
                            );
                            DepositState::ApproveAndRetry {
                                revert_reason: e.reason().to_string(),
                            }
                        }
                        Err(e) => DepositState::Failed(e.reason().to_string()),
                    }
                }
                DepositState::ApproveAndRetry { revert_reason } => {
                    outcome.approval_attempted = true;
                    let (token, spender) = self.operation.approval();
                    if self.allowance.approve_unlimited(token, spender).await {
                        info!("Retrying deposit after approval...");
                        DepositState::Retry
                    } else {
                        DepositState::Failed(format!(
                            "approval failed after deposit revert: {revert_reason}"
                        ))
                    }
                }
                DepositState::Retry => {
                    outcome.attempts += 1;
                    match self.send_deposit("Retry deposit").await {
                        Ok(receipt) => DepositState::Succeeded(receipt),
                        Err(e) => DepositState::Failed(format!("retry failed: {}", e.reason())),
                    }
                }
                DepositState::Succeeded(receipt) => {
                    info!(
                        tx_hash = %receipt.tx_hash,
                        attempts = outcome.attempts,
                        "Successfully deposited {}",
                        self.operation.describe()
                    );
                    return outcome.succeeded(receipt);
                }
                DepositState::Failed(reason) => {
                    error!(attempts = outcome.attempts, "Deposit failed: {}", reason);
                    return outcome.failed(reason);
                }
            };
        }
    }

    /// Withdraw once; failures are reported, never retried
    pub async fn withdraw(&self) -> ActionOutcome {
        let outcome = ActionOutcome {
            attempts: 1,
            ..ActionOutcome::default()
        };

        info!(
            kind = self.operation.kind(),
            "Attempting to withdraw {}",
            self.operation.describe()
        );

        let request = self
            .operation
            .withdraw_request(self.chain.signer_address(), self.gas);

        match send_and_confirm(self.chain.as_ref(), "Withdrawal", &request).await {
            Ok(receipt) => {
                info!(
                    tx_hash = %receipt.tx_hash,
                    "Successfully withdrew {}",
                    self.operation.describe()
                );
                outcome.succeeded(receipt)
            }
            Err(e) => {
                error!(kind = %e.kind, "Withdrawal failed: {}", e.reason());
                outcome.failed(e.reason())
            }
        }
    }

    async fn send_deposit(&self, label: &str) -> Result<InclusionReceipt, ChainError> {
        let request = self
            .operation
            .deposit_request(self.chain.signer_address(), self.gas);
        send_and_confirm(self.chain.as_ref(), label, &request).await
    }
}
