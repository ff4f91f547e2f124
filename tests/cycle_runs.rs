mod common;

use alloy::primitives::U256;
use common::{params, ScriptedChain, Step, ASSET, GATEWAY, POOL, SIGNER};
use lendloop::allowance::AllowanceManager;
use lendloop::chain::{ChainClient, ContractCall};
use lendloop::error::ChainError;
use lendloop::strategy::{AssetOperation, CycleRunner, OperationExecutor, RunSummary};
use std::sync::Arc;

async fn run(chain: Arc<ScriptedChain>, operation: AssetOperation, iterations: u32) -> RunSummary {
    let p = params();
    let dyn_chain: Arc<dyn ChainClient> = chain;
    let allowance = AllowanceManager::new(dyn_chain.clone(), p.gas);
    let executor = OperationExecutor::new(dyn_chain, allowance, operation, p.gas);
    CycleRunner::new(executor).run(iterations, 0.0).await
}

#[tokio::test]
async fn two_clean_iterations_never_approve() {
    let chain = Arc::new(ScriptedChain::new());

    let summary = run(chain.clone(), AssetOperation::erc20(&params()), 2).await;

    assert_eq!(
        chain.methods(),
        vec!["deposit", "withdraw", "deposit", "withdraw"]
    );
    assert_eq!(summary.deposits_succeeded, 2);
    assert_eq!(summary.withdrawals_succeeded, 2);
    assert_eq!(summary.approvals_attempted, 0);
    assert_eq!(summary.pauses, 0);
}

#[tokio::test]
async fn reverted_deposit_is_approved_and_retried_once() {
    let chain = Arc::new(
        ScriptedChain::new().script(
            "deposit",
            [Step::SubmitFails(ChainError::from_node_message(
                "execution reverted: ERC20: transfer amount exceeds allowance",
            ))],
        ),
    );

    let summary = run(chain.clone(), AssetOperation::erc20(&params()), 1).await;

    assert_eq!(chain.methods(), vec!["deposit", "approve", "deposit", "withdraw"]);
    let approve = &chain.submitted()[1];
    assert_eq!(approve.to, ASSET);
    assert_eq!(
        approve.call,
        ContractCall::Approve {
            spender: POOL,
            amount: U256::MAX,
        }
    );
    assert_eq!(summary.deposits_succeeded, 1);
    assert_eq!(summary.approvals_attempted, 1);
    assert_eq!(summary.withdrawals_succeeded, 1);
}

#[tokio::test]
async fn failed_receipt_counts_as_revert() {
    let chain = Arc::new(ScriptedChain::new().script("deposit", [Step::ReceiptReverts]));

    let summary = run(chain.clone(), AssetOperation::erc20(&params()), 1).await;

    assert_eq!(chain.count("approve"), 1);
    assert_eq!(chain.count("deposit"), 2);
    assert_eq!(summary.deposits_succeeded, 1);
}

#[tokio::test]
async fn rejected_deposit_skips_approval_and_withdraw() {
    let chain = Arc::new(ScriptedChain::new().script(
        "deposit",
        [Step::SubmitFails(ChainError::from_node_message(
            "insufficient funds for gas * price + value",
        ))],
    ));

    let summary = run(chain.clone(), AssetOperation::erc20(&params()), 1).await;

    assert_eq!(chain.methods(), vec!["deposit"]);
    assert_eq!(summary.deposits_failed, 1);
    assert_eq!(summary.withdrawals_skipped, 1);
    assert_eq!(summary.approvals_attempted, 0);
}

#[tokio::test]
async fn second_revert_does_not_loop() {
    let chain = Arc::new(
        ScriptedChain::new().script("deposit", [Step::ReceiptReverts, Step::ReceiptReverts]),
    );

    let summary = run(chain.clone(), AssetOperation::erc20(&params()), 1).await;

    assert_eq!(chain.methods(), vec!["deposit", "approve", "deposit"]);
    assert_eq!(summary.deposits_failed, 1);
    assert_eq!(summary.withdrawals_skipped, 1);
}

#[tokio::test]
async fn failures_in_one_iteration_do_not_stop_the_next() {
    let chain = Arc::new(
        ScriptedChain::new()
            .script(
                "deposit",
                [Step::SubmitFails(ChainError::from_node_message("nonce too low"))],
            )
            .script("withdraw", [Step::ReceiptReverts]),
    );

    let summary = run(chain.clone(), AssetOperation::erc20(&params()), 3).await;

    assert_eq!(
        chain.methods(),
        vec!["deposit", "deposit", "withdraw", "deposit", "withdraw"]
    );
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.deposits_failed, 1);
    assert_eq!(summary.withdrawals_failed, 1);
    assert_eq!(summary.withdrawals_succeeded, 1);
}

#[tokio::test]
async fn native_cycle_shapes_value_and_arguments() {
    let p = params();
    let chain = Arc::new(ScriptedChain::new());

    run(chain.clone(), AssetOperation::native(&p), 1).await;

    let submitted = chain.submitted();
    assert_eq!(submitted.len(), 2);

    let deposit = &submitted[0];
    assert_eq!(deposit.to, GATEWAY);
    assert_eq!(deposit.value, p.native_amount);
    assert_eq!(
        deposit.call,
        ContractCall::DepositEth {
            pool: POOL,
            on_behalf_of: SIGNER,
            referral_code: 0,
        }
    );

    let withdraw = &submitted[1];
    assert_eq!(withdraw.to, GATEWAY);
    assert_eq!(withdraw.value, U256::ZERO);
    assert_eq!(
        withdraw.call,
        ContractCall::WithdrawEth {
            pool: POOL,
            amount: p.native_amount,
            to: SIGNER,
        }
    );
    assert!(submitted.iter().all(|r| r.gas == p.gas));
}

#[tokio::test]
async fn native_revert_approves_asset_for_gateway() {
    let chain = Arc::new(ScriptedChain::new().script("depositETH", [Step::ReceiptReverts]));

    run(chain.clone(), AssetOperation::native(&params()), 1).await;

    assert_eq!(
        chain.methods(),
        vec!["depositETH", "approve", "depositETH", "withdrawETH"]
    );
    let approve = &chain.submitted()[1];
    assert_eq!(approve.to, ASSET);
    assert_eq!(
        approve.call,
        ContractCall::Approve {
            spender: GATEWAY,
            amount: U256::MAX,
        }
    );
}
