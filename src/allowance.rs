//! Allowance management: unlimited approval and revocation

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{error, info};

use crate::chain::{send_and_confirm, CallRequest, ChainClient, ContractCall, GasSettings};

/// A known spender the wallet may have approved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpenderTarget {
    pub name: &'static str,
    pub spender: Address,
}

impl SpenderTarget {
    pub fn pool(spender: Address) -> Self {
        Self {
            name: "pool contract",
            spender,
        }
    }

    pub fn native_gateway(spender: Address) -> Self {
        Self {
            name: "native gateway",
            spender,
        }
    }
}

/// Which of the known spenders an allowance command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetSelection {
    Pool,
    Native,
    Both,
}

impl TargetSelection {
    pub fn pick(self, pool: SpenderTarget, native: SpenderTarget) -> Vec<SpenderTarget> {
        match self {
            TargetSelection::Pool => vec![pool],
            TargetSelection::Native => vec![native],
            TargetSelection::Both => vec![pool, native],
        }
    }
}

/// Result of one approve or revoke against one spender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target: SpenderTarget,
    pub success: bool,
}

/// Overall result of a pass over several spenders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceStatus {
    Succeeded,
    PartialFailure,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowanceReport {
    pub results: Vec<TargetOutcome>,
}

impl AllowanceReport {
    pub fn status(&self) -> AllowanceStatus {
        let ok = self.results.iter().filter(|r| r.success).count();
        if ok == self.results.len() {
            AllowanceStatus::Succeeded
        } else if ok == 0 {
            AllowanceStatus::Failed
        } else {
            AllowanceStatus::PartialFailure
        }
    }

    /// Non-interactive commands exit non-zero unless this holds
    pub fn all_succeeded(&self) -> bool {
        self.status() == AllowanceStatus::Succeeded
    }

    pub fn failed_targets(&self) -> Vec<&'static str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.target.name)
            .collect()
    }
}

/// Issues ERC-20 `approve` transactions for the process signer
#[derive(Clone)]
pub struct AllowanceManager {
    chain: Arc<dyn ChainClient>,
    gas: GasSettings,
}

impl AllowanceManager {
    pub fn new(chain: Arc<dyn ChainClient>, gas: GasSettings) -> Self {
        Self { chain, gas }
    }

    /// Approve the maximum `uint256` for `spender`. True only once included.
    pub async fn approve_unlimited(&self, token: Address, spender: Address) -> bool {
        info!(%token, %spender, "Approving max amount for spender");
        self.set_allowance(token, spender, U256::MAX, "Approval").await
    }

    /// Set the allowance for `spender` back to zero. True only once included.
    pub async fn revoke_allowance(&self, token: Address, spender: Address) -> bool {
        info!(%token, %spender, "Revoking approval (setting allowance to 0)");
        self.set_allowance(token, spender, U256::ZERO, "Revoke").await
    }

    /// Approve every target in order; a failure never blocks the next one
    pub async fn approve_targets(&self, token: Address, targets: &[SpenderTarget]) -> AllowanceReport {
        let mut report = AllowanceReport::default();
        for &target in targets {
            info!(target = target.name, spender = %target.spender, "Approving asset");
            let success = self.approve_unlimited(token, target.spender).await;
            report.results.push(TargetOutcome { target, success });
        }
        report
    }

    /// Revoke every target in order; a failure never blocks the next one
    pub async fn revoke_targets(&self, token: Address, targets: &[SpenderTarget]) -> AllowanceReport {
        let mut report = AllowanceReport::default();
        for &target in targets {
            info!(target = target.name, spender = %target.spender, "Attempting to revoke approval");
            let success = self.revoke_allowance(token, target.spender).await;
            report.results.push(TargetOutcome { target, success });
        }
        report
    }

    async fn set_allowance(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        label: &str,
    ) -> bool {
        let request = CallRequest::new(token, ContractCall::Approve { spender, amount }, self.gas);

        match send_and_confirm(self.chain.as_ref(), label, &request).await {
            Ok(_) => {
                info!(%token, %spender, "{label} succeeded");
                true
            }
            Err(e) => {
                error!(%token, %spender, kind = %e.kind, "{label} failed: {}", e.reason());
                false
            }
        }
    }
}
