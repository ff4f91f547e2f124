use clap::{Parser, Subcommand};

use crate::allowance::TargetSelection;

#[derive(Parser)]
#[command(name = "lendloop")]
#[command(version)]
#[command(about = "Lending pool deposit/withdraw cycle bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = "config/config.json", env = "LENDLOOP_CONFIG_PATH")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Deposit/withdraw the ERC-20 asset against the pool (default)
    Run,
    /// Deposit/withdraw the native currency through the gateway
    RunNative,
    /// Grant an unlimited allowance for the asset
    Approve {
        /// Spender(s) to approve
        #[arg(long, value_enum, default_value_t = TargetSelection::Pool)]
        target: TargetSelection,
    },
    /// Set the asset allowance back to zero
    Revoke {
        /// Spender(s) to revoke; omit for the interactive menu
        #[arg(long, value_enum)]
        target: Option<TargetSelection>,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}
