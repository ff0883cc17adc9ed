//! Shared handles for the staking UI.

use dioxus::prelude::*;
use staking_client::{EthProvider, StakingConfig, StakingController, StakingError, StakingState};
use tracing::{info, warn};

/// Session controller shared by every component via context.
pub type SharedController = StakingController<EthProvider>;

/// Build the controller from the environment.
///
/// An unusable endpoint leaves the controller without a provider; `connect`
/// then reports it to the user instead of the app refusing to start.
pub fn build_controller() -> Result<SharedController, StakingError> {
    let config = StakingConfig::from_env()?;
    info!(
        contract = %config.contract_address,
        features = ?config.features,
        rpc = ?config.rpc_url,
        "starting staking session"
    );

    let provider = config.rpc_url.as_deref().and_then(|url| {
        EthProvider::connect(url, config.account_poll_interval())
            .map_err(|e| warn!("{e}"))
            .ok()
    });

    StakingController::new(config, provider)
}

/// Reactive snapshot of the controller state.
pub fn use_staking() -> Signal<StakingState> {
    use_context::<Signal<StakingState>>()
}
