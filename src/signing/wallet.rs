use crate::error::{LendloopError, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tracing::info;
use zeroize::Zeroize;

/// Environment variable holding the signing key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// The process signer: one private key bound to one address
///
/// # Security
/// The private key string is zeroized as soon as the signer is built and is never
/// stored in the Wallet struct.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a private key hex string (with or without 0x)
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let mut secure_key = private_key.trim().trim_start_matches("0x").to_string();

        let parsed = secure_key.parse::<PrivateKeySigner>();
        secure_key.zeroize();

        let signer =
            parsed.map_err(|e| LendloopError::Wallet(format!("Invalid private key: {}", e)))?;

        info!("Wallet initialized: {} (private key zeroized from memory)", signer.address());

        Ok(Self { signer })
    }

    /// Create a wallet from the `PRIVATE_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let mut private_key = std::env::var(PRIVATE_KEY_ENV).map_err(|_| {
            LendloopError::Wallet(format!("{PRIVATE_KEY_ENV} environment variable not set"))
        })?;

        let result = Self::from_private_key(&private_key);

        private_key.zeroize();

        result
    }

    /// Get the wallet address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Network wallet used by the signing provider
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}
