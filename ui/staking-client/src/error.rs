//! Error taxonomy surfaced to the UI.

use thiserror::Error;

/// Failures reported by a [`ChainProvider`](crate::provider::ChainProvider)
/// or a [`StakingContract`](crate::provider::StakingContract).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The endpoint could not be reached at all.
    #[error("provider unreachable: {0}")]
    Unavailable(String),
    /// The wallet or node answered with an error (user denial, revert, ...).
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Call(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    #[error("Please install MetaMask or use a Web3-enabled browser")]
    ProviderUnavailable,

    #[error("Connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Contract read failed: {0}")]
    ContractReadFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Another operation is already in progress")]
    OperationPending,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Minting is not enabled for this contract")]
    MintDisabled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StakingError {
    /// Maps a failed account-access request onto the connect taxonomy.
    pub(crate) fn from_access(err: ChainError) -> Self {
        match err {
            ChainError::Unavailable(msg) => {
                tracing::debug!("account access failed at transport level: {msg}");
                Self::ProviderUnavailable
            }
            ChainError::Rejected(msg) | ChainError::Call(msg) => Self::ConnectionRejected(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, StakingError>;
