use anyhow::Context;
use clap::Parser;
use lendloop::allowance::{AllowanceManager, AllowanceReport, SpenderTarget, TargetSelection};
use lendloop::chain::{ChainClient, RpcChainClient};
use lendloop::cli::{Cli, Commands};
use lendloop::config::{AppConfig, LoggingConfig, OperationParams};
use lendloop::logging::init_logging;
use lendloop::revoke::{EditorLineSource, RevocationTool};
use lendloop::signing::Wallet;
use lendloop::strategy::{AssetOperation, CycleRunner, OperationExecutor};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // PRIVATE_KEY may live in a local .env file
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let cfg = match AppConfig::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            let _guard = init_logging(&LoggingConfig::default());
            error!(config = %cli.config, "Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _guard = init_logging(&cfg.logging);

    match run(&cli, &cfg).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, cfg: &AppConfig) -> anyhow::Result<ExitCode> {
    let params = cfg
        .operation_params()
        .context("invalid operation parameters")?;
    let wallet = Wallet::from_env().context("failed to load signer")?;

    let client = RpcChainClient::connect(&cfg.rpc_url, &wallet, params.receipt_timeout)
        .context("failed to build chain client")?;
    client
        .check_connection()
        .await
        .with_context(|| format!("chain node unreachable at {}", cfg.rpc_url))?;

    let chain: Arc<dyn ChainClient> = Arc::new(client);
    let allowance = AllowanceManager::new(chain.clone(), params.gas);

    let code = match cli.command() {
        Commands::Run => {
            let operation = AssetOperation::erc20(&params);
            run_cycles(chain, allowance, operation, &params).await
        }
        Commands::RunNative => {
            let operation = AssetOperation::native(&params);
            run_cycles(chain, allowance, operation, &params).await
        }
        Commands::Approve { target } => approve(&allowance, &params, target).await,
        Commands::Revoke { target } => {
            let tool =
                RevocationTool::new(allowance, params.asset, params.pool, params.native_gateway);
            match target {
                Some(selection) => revoke_once(&tool, selection).await,
                None => {
                    let mut input = EditorLineSource::new()?;
                    let reports = tool.run_interactive(&mut input).await?;
                    info!(passes = reports.len(), "Revocation session finished");
                    ExitCode::SUCCESS
                }
            }
        }
    };

    Ok(code)
}

async fn run_cycles(
    chain: Arc<dyn ChainClient>,
    allowance: AllowanceManager,
    operation: AssetOperation,
    params: &OperationParams,
) -> ExitCode {
    let (token, spender) = operation.approval();
    info!(
        signer = %chain.signer_address(),
        kind = operation.kind(),
        target = %operation.target(),
        approval_token = %token,
        approval_spender = %spender,
        amount = %operation.describe(),
        iterations = params.iterations,
        delay_seconds = params.delay_seconds,
        "Cycle configuration loaded"
    );

    let executor = OperationExecutor::new(chain, allowance, operation, params.gas);
    let runner = CycleRunner::new(executor);

    tokio::select! {
        summary = runner.run(params.iterations, params.delay_seconds) => {
            info!(
                deposits_failed = summary.deposits_failed,
                withdrawals_failed = summary.withdrawals_failed,
                "Run finished"
            );
        }
        _ = shutdown_signal() => {
            warn!("Interrupted. Any submitted transaction stays in flight and is not cancelled.");
        }
    }

    ExitCode::SUCCESS
}

async fn approve(
    allowance: &AllowanceManager,
    params: &OperationParams,
    selection: TargetSelection,
) -> ExitCode {
    let targets = selection.pick(
        SpenderTarget::pool(params.pool),
        SpenderTarget::native_gateway(params.native_gateway),
    );
    let report = allowance.approve_targets(params.asset, &targets).await;
    if !report.all_succeeded() {
        warn!(failed = ?report.failed_targets(), "Approval did not succeed for every target");
    }
    exit_status(&report)
}

async fn revoke_once(tool: &RevocationTool, selection: TargetSelection) -> ExitCode {
    exit_status(&tool.revoke(selection).await)
}

fn exit_status(report: &AllowanceReport) -> ExitCode {
    if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
