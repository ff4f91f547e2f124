//! Deposit/withdraw cycling: operation shaping, the transaction state machine,
//! and the multi-iteration runner.

pub mod executor;
pub mod operation;
pub mod runner;

pub use executor::{ActionOutcome, OperationExecutor};
pub use operation::{AssetOperation, Erc20Operation, NativeOperation};
pub use runner::{pause_duration, CycleRunner, IterationOutcome, RunSummary, WithdrawStatus};
