//! Client-side view of one account's relationship to the staking contract.

use ethers::types::{Address, U256};

/// Wallet connection state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// A mutating contract call in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Stake,
    Unstake,
    ClaimRewards,
    Mint,
}

impl Operation {
    /// Progress label shown on the triggering button.
    pub fn progress_label(self) -> &'static str {
        match self {
            Self::Stake => "Staking...",
            Self::Unstake => "Unstaking...",
            Self::ClaimRewards => "Claiming...",
            Self::Mint => "Minting...",
        }
    }

    /// The input field reset after this operation succeeds, if any.
    pub fn input_field(self) -> Option<InputField> {
        match self {
            Self::Stake => Some(InputField::Stake),
            Self::Unstake => Some(InputField::Unstake),
            Self::Mint => Some(InputField::Mint),
            Self::ClaimRewards => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub connected: bool,
    pub account: Option<Address>,
}

/// Cached projection of the contract's state for the session account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractView {
    pub balance: U256,
    pub staked_amount: U256,
    pub rewards: U256,
    pub token_name: String,
    pub token_symbol: String,
    /// Only read when the mint feature is enabled.
    pub total_supply: Option<U256>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    Stake,
    Unstake,
    Mint,
}

pub const INPUT_RESET_VALUE: &str = "0";

/// Amounts typed by the user, kept as entered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFields {
    pub stake: String,
    pub unstake: String,
    pub mint: String,
}

impl Default for InputFields {
    fn default() -> Self {
        Self {
            stake: INPUT_RESET_VALUE.to_string(),
            unstake: INPUT_RESET_VALUE.to_string(),
            mint: INPUT_RESET_VALUE.to_string(),
        }
    }
}

impl InputFields {
    pub fn get(&self, field: InputField) -> &str {
        match field {
            InputField::Stake => &self.stake,
            InputField::Unstake => &self.unstake,
            InputField::Mint => &self.mint,
        }
    }

    pub fn set(&mut self, field: InputField, value: String) {
        match field {
            InputField::Stake => self.stake = value,
            InputField::Unstake => self.unstake = value,
            InputField::Mint => self.mint = value,
        }
    }

    pub fn reset(&mut self, field: InputField) {
        self.set(field, INPUT_RESET_VALUE.to_string());
    }
}

/// Snapshot published to the UI after every change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakingState {
    pub status: ConnectionStatus,
    pub session: Session,
    pub view: Option<ContractView>,
    pub pending: Option<Operation>,
    pub inputs: InputFields,
    pub last_error: Option<String>,
}

impl StakingState {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub(crate) fn clear_session(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.session = Session::default();
        self.view = None;
    }
}
