use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::chain::GasSettings;
use crate::error::{LendloopError, Result};

/// Gateway the native-asset cycle talks to unless overridden.
pub const DEFAULT_NATIVE_GATEWAY: &str = "0xA35f53a71FA6cd7AC9Df7F7814ecBc49dF255A38";

/// Decimals used for the ERC-20 deposit/withdraw amount.
pub const ERC20_DECIMALS: u8 = 18;

/// Decimals of the chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimals between gwei and wei.
pub const GWEI_DECIMALS: u8 = 9;

/// Main configuration structure, loaded once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Chain node endpoint
    pub rpc_url: String,
    /// Pool contract, also the spender for the ERC-20 cycle
    pub contract_address: String,
    /// ERC-20 asset deposited by the ERC-20 cycle and approved on revert
    pub address_asset: String,
    /// Quantity for the ERC-20 cycle (18 decimals)
    pub amount: Decimal,
    /// Quantity for the native cycle, defaults to `amount`
    #[serde(default)]
    pub eth_amount: Option<Decimal>,
    /// Legacy gas price in gwei
    pub gas_price_gwei: Decimal,
    pub gas_limit: u64,
    /// Number of deposit/withdraw cycles
    pub iterations: u32,
    /// Pause between cycles in seconds
    #[serde(default)]
    pub delay_seconds: f64,
    /// Native-asset gateway contract
    #[serde(default = "default_native_gateway")]
    pub eth_contract_address: String,
    /// Give up waiting for inclusion after this many seconds (unset = wait forever)
    #[serde(default)]
    pub receipt_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for the daily rolling log file
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_native_gateway() -> String {
    DEFAULT_NATIVE_GATEWAY.to_string()
}

impl AppConfig {
    /// Load configuration from a file, overridden by `LENDLOOP_*` environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::from(path.as_ref()).required(true))
            // LENDLOOP_ITERATIONS=5, LENDLOOP_LOGGING__LEVEL=debug, ...
            .add_source(
                Environment::with_prefix("LENDLOOP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from an in-memory document (no environment layer)
    pub fn from_document(content: &str, format: FileFormat) -> Result<Self> {
        let cfg: Self = Self::defaults()?
            .add_source(File::from_str(content, format))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn defaults() -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("delay_seconds", 0.0)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)
    }

    /// Reject values that would only fail later, mid-run
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(LendloopError::InvalidConfig("rpc_url is empty".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LendloopError::InvalidConfig(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        check_precision("amount", self.amount, ERC20_DECIMALS)?;
        if let Some(eth_amount) = self.eth_amount {
            if eth_amount <= Decimal::ZERO {
                return Err(LendloopError::InvalidConfig(format!(
                    "eth_amount must be positive, got {eth_amount}"
                )));
            }
            check_precision("eth_amount", eth_amount, NATIVE_DECIMALS)?;
        }
        if self.gas_price_gwei < Decimal::ZERO {
            return Err(LendloopError::InvalidConfig(format!(
                "gas_price_gwei cannot be negative, got {}",
                self.gas_price_gwei
            )));
        }
        check_precision("gas_price_gwei", self.gas_price_gwei, GWEI_DECIMALS)?;
        if self.gas_limit == 0 {
            return Err(LendloopError::InvalidConfig("gas_limit must be > 0".into()));
        }
        if self.iterations == 0 {
            return Err(LendloopError::InvalidConfig("iterations must be >= 1".into()));
        }
        if !self.delay_seconds.is_finite() || self.delay_seconds < 0.0 {
            return Err(LendloopError::InvalidConfig(format!(
                "delay_seconds must be a finite non-negative number, got {}",
                self.delay_seconds
            )));
        }
        if Duration::try_from_secs_f64(self.delay_seconds).is_err() {
            return Err(LendloopError::InvalidConfig(format!(
                "delay_seconds is too large, got {}",
                self.delay_seconds
            )));
        }
        Ok(())
    }

    /// Native-cycle quantity, falling back to `amount`
    pub fn native_amount(&self) -> Decimal {
        self.eth_amount.unwrap_or(self.amount)
    }

    /// Resolve addresses and units into the immutable parameter bundle
    pub fn operation_params(&self) -> Result<OperationParams> {
        Ok(OperationParams {
            pool: parse_address("contract_address", &self.contract_address)?,
            asset: parse_address("address_asset", &self.address_asset)?,
            native_gateway: parse_address("eth_contract_address", &self.eth_contract_address)?,
            amount: to_base_units("amount", self.amount, ERC20_DECIMALS)?,
            native_amount: to_base_units("eth_amount", self.native_amount(), NATIVE_DECIMALS)?,
            amount_display: self.amount.normalize(),
            native_amount_display: self.native_amount().normalize(),
            gas: GasSettings {
                gas_price: gwei_to_wei(self.gas_price_gwei)?,
                gas_limit: self.gas_limit,
            },
            iterations: self.iterations,
            delay_seconds: self.delay_seconds,
            receipt_timeout: self.receipt_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Immutable, fully-resolved operation parameters
#[derive(Debug, Clone)]
pub struct OperationParams {
    pub pool: Address,
    pub asset: Address,
    pub native_gateway: Address,
    /// ERC-20 amount in base units
    pub amount: U256,
    /// Native amount in wei
    pub native_amount: U256,
    pub amount_display: Decimal,
    pub native_amount_display: Decimal,
    pub gas: GasSettings,
    pub iterations: u32,
    pub delay_seconds: f64,
    pub receipt_timeout: Option<Duration>,
}

pub fn parse_address(field: &str, value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| LendloopError::AddressParsing(format!("{field} ({value}): {e}")))
}

/// Unit conversion truncates extra fractional digits, so refuse them up front
fn check_precision(field: &str, value: Decimal, decimals: u8) -> Result<()> {
    if value.normalize().scale() > u32::from(decimals) {
        return Err(LendloopError::InvalidConfig(format!(
            "{field} has more than {decimals} decimal places, got {value}"
        )));
    }
    Ok(())
}

fn to_base_units(field: &str, value: Decimal, decimals: u8) -> Result<U256> {
    parse_units(&value.normalize().to_string(), decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| LendloopError::Amount(format!("{field} ({value}): {e}")))
}

fn gwei_to_wei(gwei: Decimal) -> Result<u128> {
    let wei = parse_units(&gwei.normalize().to_string(), "gwei")
        .map(|units| units.get_absolute())
        .map_err(|e| LendloopError::Amount(format!("gas_price_gwei ({gwei}): {e}")))?;
    u128::try_from(wei)
        .map_err(|_| LendloopError::Amount(format!("gas_price_gwei ({gwei}) overflows u128 wei")))
}
