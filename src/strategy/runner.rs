use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::executor::{ActionOutcome, OperationExecutor};

/// What happened to the withdraw half of an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawStatus {
    Succeeded,
    Failed,
    /// Deposit failed, so no withdraw was attempted
    Skipped,
}

/// One deposit-then-withdraw pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationOutcome {
    /// 1-based
    pub index: u32,
    pub deposit: ActionOutcome,
    pub withdraw: WithdrawStatus,
}

impl IterationOutcome {
    pub fn deposit_ok(&self) -> bool {
        self.deposit.success
    }
}

/// Totals for a whole run, logged once at the end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u32,
    pub deposits_succeeded: u32,
    pub deposits_failed: u32,
    pub withdrawals_succeeded: u32,
    pub withdrawals_failed: u32,
    pub withdrawals_skipped: u32,
    pub approvals_attempted: u32,
    pub pauses: u32,
}

impl RunSummary {
    fn record(&mut self, outcome: &IterationOutcome) {
        self.iterations += 1;
        if outcome.deposit.success {
            self.deposits_succeeded += 1;
        } else {
            self.deposits_failed += 1;
        }
        if outcome.deposit.approval_attempted {
            self.approvals_attempted += 1;
        }
        match outcome.withdraw {
            WithdrawStatus::Succeeded => self.withdrawals_succeeded += 1,
            WithdrawStatus::Failed => self.withdrawals_failed += 1,
            WithdrawStatus::Skipped => self.withdrawals_skipped += 1,
        }
    }
}

/// Pause between iterations, if any: positive and finite seconds only
pub fn pause_duration(delay_seconds: f64) -> Option<Duration> {
    if delay_seconds.is_finite() && delay_seconds > 0.0 {
        Duration::try_from_secs_f64(delay_seconds).ok()
    } else {
        None
    }
}

/// Drives deposit/withdraw cycles, containing failures per iteration
pub struct CycleRunner {
    executor: OperationExecutor,
}

impl CycleRunner {
    pub fn new(executor: OperationExecutor) -> Self {
        Self { executor }
    }

    /// Run `iterations` cycles. Never fails: every iteration is attempted.
    pub async fn run(&self, iterations: u32, delay_seconds: f64) -> RunSummary {
        let pause = pause_duration(delay_seconds);
        let mut summary = RunSummary::default();

        info!(
            kind = self.executor.operation().kind(),
            iterations,
            delay_seconds,
            "Bot starting..."
        );

        for index in 1..=iterations {
            info!("==================== ITERATION {} of {} ====================", index, iterations);

            let outcome = self.run_iteration(index).await;
            summary.record(&outcome);

            info!(
                deposit_ok = outcome.deposit_ok(),
                withdraw = ?outcome.withdraw,
                "==================== ITERATION {} FINISHED ====================",
                index
            );

            if index < iterations {
                if let Some(pause) = pause {
                    info!("Waiting {:?} before next iteration...", pause);
                    sleep(pause).await;
                    summary.pauses += 1;
                }
            }
        }

        info!(?summary, "All iterations completed. Bot shutting down.");
        summary
    }

    async fn run_iteration(&self, index: u32) -> IterationOutcome {
        let deposit = self.executor.deposit().await;

        let withdraw = if deposit.success {
            info!("Deposit successful. Proceeding to withdraw.");
            let withdrawal = self.executor.withdraw().await;
            if withdrawal.success {
                info!("Withdrawal successful.");
                WithdrawStatus::Succeeded
            } else {
                warn!("Withdrawal failed. Continuing to next iteration.");
                WithdrawStatus::Failed
            }
        } else {
            warn!("Deposit failed. Skipping withdrawal and continuing to next iteration.");
            WithdrawStatus::Skipped
        };

        IterationOutcome {
            index,
            deposit,
            withdraw,
        }
    }
}
