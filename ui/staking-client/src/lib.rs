//! Client-side session for a staking token contract: wallet connection,
//! contract reads, and stake / unstake / claim / mint transactions.

pub mod amount;
pub mod config;
pub mod controller;
pub mod error;
pub mod eth;
pub mod provider;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::{Feature, StakingConfig};
pub use controller::StakingController;
pub use error::{ChainError, StakingError};
pub use eth::EthProvider;
pub use state::{ConnectionStatus, ContractView, InputField, Operation, StakingState};

pub use ethers::types::{Address, U256};
