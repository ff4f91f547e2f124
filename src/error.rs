use thiserror::Error;

/// Main error type for the cycle bot
#[derive(Error, Debug)]
pub enum LendloopError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    #[error("Amount parsing error: {0}")]
    Amount(String),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    // Chain errors
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Invalid RPC URL: {0}")]
    RpcUrl(String),

    // Interactive input errors
    #[error("Input error: {0}")]
    Input(String),
}

/// Result type alias for LendloopError
pub type Result<T> = std::result::Result<T, LendloopError>;

/// Message fragment a node or receipt check uses when a call executed and reverted.
pub const REVERT_SIGNATURE: &str = "execution reverted";

/// Short message attached to a mined transaction whose receipt reports failure.
pub const RECEIPT_REVERTED: &str = "transaction execution reverted";

/// How a chain failure is classified.
///
/// Only `Reverted` triggers the approve-and-retry compensation on deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainErrorKind {
    /// The call executed on-chain (or in the node's preflight) and reverted.
    Reverted,
    /// The node refused to accept or relay the transaction.
    Rejected,
    /// The node could not be reached.
    Network,
    /// Anything that could not be classified.
    Unknown,
}

impl std::fmt::Display for ChainErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainErrorKind::Reverted => write!(f, "Reverted"),
            ChainErrorKind::Rejected => write!(f, "Rejected"),
            ChainErrorKind::Network => write!(f, "Network"),
            ChainErrorKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Classified failure of a single transaction attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ChainError {
    pub kind: ChainErrorKind,
    pub message: String,
    /// Node- or receipt-level summary, preferred over `message` for display.
    pub short_message: Option<String>,
}

impl ChainError {
    pub fn new(kind: ChainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            short_message: None,
        }
    }

    pub fn with_short_message(mut self, short: impl Into<String>) -> Self {
        self.short_message = Some(short.into());
        self
    }

    /// A mined transaction whose receipt status is failure.
    pub fn receipt_reverted(tx_hash: impl std::fmt::Display) -> Self {
        Self::new(
            ChainErrorKind::Reverted,
            format!("{RECEIPT_REVERTED} (tx {tx_hash})"),
        )
        .with_short_message(RECEIPT_REVERTED)
    }

    /// Error payload returned by the node: reverted when it carries the revert
    /// signature, otherwise a relay rejection.
    pub fn from_node_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if is_revert_message(&message) {
            ChainErrorKind::Reverted
        } else {
            ChainErrorKind::Rejected
        };
        Self {
            kind,
            short_message: Some(message.clone()),
            message,
        }
    }

    /// Fallback for failures without structure: reverted when the text matches,
    /// unknown otherwise.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = if is_revert_message(&message) {
            ChainErrorKind::Reverted
        } else {
            ChainErrorKind::Unknown
        };
        Self::new(kind, message)
    }

    pub fn is_revert(&self) -> bool {
        self.kind == ChainErrorKind::Reverted
    }

    /// Human-readable reason: the short message when available, else the full one.
    pub fn reason(&self) -> &str {
        self.short_message.as_deref().unwrap_or(&self.message)
    }
}

/// Best-effort revert detection on node/receipt text.
///
/// A false positive costs one unnecessary approval transaction.
pub fn is_revert_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains(REVERT_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_revert_message_is_reverted() {
        let err = ChainError::from_node_message("execution reverted: ERC20: insufficient allowance");
        assert_eq!(err.kind, ChainErrorKind::Reverted);
        assert!(err.is_revert());
        assert_eq!(err.reason(), "execution reverted: ERC20: insufficient allowance");
    }

    #[test]
    fn test_node_other_message_is_rejected() {
        let err = ChainError::from_node_message("nonce too low");
        assert_eq!(err.kind, ChainErrorKind::Rejected);
        assert!(!err.is_revert());
    }

    #[test]
    fn test_receipt_reverted_uses_short_message() {
        let err = ChainError::receipt_reverted("0xabc");
        assert!(err.is_revert());
        assert_eq!(err.reason(), RECEIPT_REVERTED);
        assert!(err.message.contains("0xabc"));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert!(ChainError::classify("Execution Reverted").is_revert());
        assert_eq!(
            ChainError::classify("connection reset").kind,
            ChainErrorKind::Unknown
        );
    }

    #[test]
    fn test_reason_falls_back_to_message() {
        let err = ChainError::new(ChainErrorKind::Network, "connection refused");
        assert_eq!(err.reason(), "connection refused");
        assert_eq!(err.to_string(), "Network: connection refused");
    }
}
