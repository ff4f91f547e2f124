#![allow(dead_code)]

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use lendloop::chain::{CallRequest, ChainClient, GasSettings, InclusionReceipt, TxHandle};
use lendloop::config::OperationParams;
use lendloop::error::ChainError;
use lendloop::revoke::LineSource;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const POOL: Address = address!("1111111111111111111111111111111111111111");
pub const ASSET: Address = address!("2222222222222222222222222222222222222222");
pub const SIGNER: Address = address!("3333333333333333333333333333333333333333");
pub const GATEWAY: Address = address!("4444444444444444444444444444444444444444");

/// How the next transaction for a method resolves
#[derive(Debug, Clone)]
pub enum Step {
    Included,
    /// Refused at submission, nothing broadcast
    SubmitFails(ChainError),
    /// Broadcast, then the receipt reports status 0
    ReceiptReverts,
}

#[derive(Default)]
struct State {
    script: HashMap<&'static str, VecDeque<Step>>,
    submitted: Vec<CallRequest>,
    pending: HashMap<TxHash, Step>,
    next_hash: u8,
}

/// Chain double: records every submission and resolves it from a per-method script.
/// Methods without a scripted step are included.
#[derive(Default)]
pub struct ScriptedChain {
    state: Mutex<State>,
}

impl ScriptedChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, method: &'static str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.state
            .lock()
            .unwrap()
            .script
            .entry(method)
            .or_default()
            .extend(steps);
        self
    }

    pub fn submitted(&self) -> Vec<CallRequest> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.submitted().iter().map(|r| r.method()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().into_iter().filter(|m| *m == method).count()
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    fn signer_address(&self) -> Address {
        SIGNER
    }

    async fn submit(&self, request: &CallRequest) -> Result<TxHandle, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(request.clone());

        let step = state
            .script
            .get_mut(request.method())
            .and_then(|steps| steps.pop_front())
            .unwrap_or(Step::Included);

        if let Step::SubmitFails(err) = step {
            return Err(err);
        }

        state.next_hash += 1;
        let tx_hash = TxHash::repeat_byte(state.next_hash);
        state.pending.insert(tx_hash, step);
        Ok(TxHandle { tx_hash })
    }

    async fn await_inclusion(&self, handle: TxHandle) -> Result<InclusionReceipt, ChainError> {
        let step = self.state.lock().unwrap().pending.remove(&handle.tx_hash);
        match step {
            Some(Step::ReceiptReverts) => Err(ChainError::receipt_reverted(handle.tx_hash)),
            _ => Ok(InclusionReceipt {
                tx_hash: handle.tx_hash,
                block_number: Some(1),
                gas_used: 21_000,
            }),
        }
    }
}

pub fn params() -> OperationParams {
    OperationParams {
        pool: POOL,
        asset: ASSET,
        native_gateway: GATEWAY,
        amount: U256::from(10u64).pow(U256::from(18u64)),
        native_amount: U256::from(5u64) * U256::from(10u64).pow(U256::from(17u64)),
        amount_display: dec!(1),
        native_amount_display: dec!(0.5),
        gas: GasSettings {
            gas_price: 2_000_000_000,
            gas_limit: 300_000,
        },
        iterations: 1,
        delay_seconds: 0.0,
        receipt_timeout: None,
    }
}

/// Pre-recorded answers, consumed in order
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLines {
    fn read_line(&mut self, prompt: &str) -> lendloop::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}
