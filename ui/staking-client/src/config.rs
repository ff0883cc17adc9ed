//! Runtime configuration: which contract to talk to, through which endpoint,
//! and which optional features the contract exposes.

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StakingError};

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x2DC30696313315D3b8CB77726BE340e307468544";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Optional contract capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// `mint(to, amount)` and `totalSupply()` are available.
    Mint,
}

impl FromStr for Feature {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mint" => Ok(Self::Mint),
            other => Err(StakingError::Config(format!("unknown feature '{other}'"))),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    pub contract_address: String,
    pub features: BTreeSet<Feature>,
    /// JSON-RPC endpoint of the wallet/node. `None` means no provider.
    pub rpc_url: Option<String>,
    pub account_poll_interval_ms: u64,
    /// Decimal places used when parsing input and rendering amounts.
    pub display_decimals: u32,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            features: BTreeSet::new(),
            rpc_url: Some(DEFAULT_RPC_URL.to_string()),
            account_poll_interval_ms: 1_000,
            display_decimals: 0,
        }
    }
}

impl StakingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| StakingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StakingError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Build the configuration from the environment.
    ///
    /// `STAKING_CONFIG` names a JSON file to start from; otherwise defaults
    /// are used. `STAKING_CONTRACT_ADDRESS`, `STAKING_RPC_URL` (empty for no
    /// provider) and `STAKING_FEATURES` (comma separated) override it.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var("STAKING_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(address) = lookup("STAKING_CONTRACT_ADDRESS") {
            self.contract_address = address;
        }
        if let Some(url) = lookup("STAKING_RPC_URL") {
            self.rpc_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(features) = lookup("STAKING_FEATURES") {
            self.features = features
                .split(',')
                .filter(|f| !f.trim().is_empty())
                .map(Feature::from_str)
                .collect::<Result<_>>()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.contract_address()?;
        if self.account_poll_interval_ms == 0 {
            return Err(StakingError::Config(
                "account_poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn contract_address(&self) -> Result<Address> {
        self.contract_address.parse().map_err(|_| {
            StakingError::Config(format!(
                "invalid contract address '{}'",
                self.contract_address
            ))
        })
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn account_poll_interval(&self) -> Duration {
        Duration::from_millis(self.account_poll_interval_ms)
    }
}
