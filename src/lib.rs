pub mod allowance;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod revoke;
pub mod signing;
pub mod strategy;

pub use allowance::{AllowanceManager, AllowanceReport, AllowanceStatus, SpenderTarget, TargetSelection};
pub use chain::{ChainClient, RpcChainClient};
pub use config::{AppConfig, OperationParams};
pub use error::{ChainError, ChainErrorKind, LendloopError, Result};
pub use revoke::RevocationTool;
pub use signing::Wallet;
pub use strategy::{CycleRunner, OperationExecutor, RunSummary};
