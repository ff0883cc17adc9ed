//! Staking session controller.
//!
//! Owns the client-side session for one account against one staking
//! contract. It turns user intents into contract calls and mirrors contract
//! reads into a [`StakingState`] snapshot, which it publishes on a `watch`
//! channel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use ethers::types::{Address, U256};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::amount::parse_amount;
use crate::config::{Feature, StakingConfig};
use crate::error::{Result, StakingError};
use crate::provider::{ChainProvider, ChainResult, StakingContract, WriteCall};
use crate::state::{
    ConnectionStatus, ContractView, InputField, Operation, Session, StakingState,
};

/// Cloneable handle to a staking session. All clones share one session.
pub struct StakingController<P: ChainProvider> {
    shared: Arc<Shared<P>>,
}

impl<P: ChainProvider> Clone for StakingController<P> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

struct Shared<P: ChainProvider> {
    config: StakingConfig,
    contract_address: Address,
    provider: Option<P>,
    state: watch::Sender<StakingState>,
    binding: Mutex<Binding<P::Contract>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<P: ChainProvider> Drop for Shared<P> {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = listener.take() {
            handle.abort();
        }
    }
}

/// Contract handle for the current session. `epoch` increases every time the
/// session is rebound or cleared, so results read for an older session can be
/// recognised and dropped.
struct Binding<C> {
    contract: Option<Arc<C>>,
    account: Option<Address>,
    epoch: u64,
}

struct Bound<C> {
    contract: Arc<C>,
    account: Address,
    epoch: u64,
}

/// Clears the pending operation however the operation ends.
struct PendingGuard<'a> {
    state: &'a watch::Sender<StakingState>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.pending = None);
    }
}

impl<P: ChainProvider> StakingController<P> {
    /// `provider` is `None` when no wallet is available; `connect` then
    /// reports [`StakingError::ProviderUnavailable`].
    pub fn new(config: StakingConfig, provider: Option<P>) -> Result<Self> {
        config.validate()?;
        let contract_address = config.contract_address()?;
        let (state, _) = watch::channel(StakingState::default());

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                contract_address,
                provider,
                state,
                binding: Mutex::new(Binding {
                    contract: None,
                    account: None,
                    epoch: 0,
                }),
                listener: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &StakingConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> StakingState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<StakingState> {
        self.shared.state.subscribe()
    }

    pub fn set_input(&self, field: InputField, value: String) {
        self.update(|s| s.inputs.set(field, value));
    }

    /// Parse the current contents of `field` into base units.
    pub fn amount_from_input(&self, field: InputField) -> Result<U256> {
        let raw = self.shared.state.borrow().inputs.get(field).to_string();
        parse_amount(&raw, self.shared.config.display_decimals).map_err(|e| self.fail(e))
    }

    pub fn dismiss_error(&self) {
        self.update(|s| s.last_error = None);
    }

    /// Request account access and load the contract view for the first
    /// authorized account.
    pub async fn connect(&self) -> Result<()> {
        let Some(provider) = self.shared.provider.as_ref() else {
            return Err(self.fail(StakingError::ProviderUnavailable));
        };
        let previous = self.begin_connect()?;

        info!("requesting wallet account access");
        let account = match provider.request_accounts().await {
            Ok(accounts) => accounts.first().copied().ok_or_else(|| {
                StakingError::ConnectionRejected("no accounts authorized".into())
            }),
            Err(e) => Err(StakingError::from_access(e)),
        };
        let account = match account {
            Ok(account) => account,
            Err(e) => {
                self.update(|s| s.status = previous);
                return Err(self.fail(e));
            }
        };

        self.bind(provider, account);
        self.ensure_listener(provider);
        self.refresh().await
    }

    /// Pick up a session the wallet already authorized, without prompting,
    /// and start listening for account changes either way.
    pub async fn restore(&self) -> Result<()> {
        let Some(provider) = self.shared.provider.as_ref() else {
            debug!("no provider configured; skipping session restore");
            return Ok(());
        };
        let accounts = provider
            .authorized_accounts()
            .await
            .map_err(|e| self.fail(StakingError::from_access(e)))?;
        self.ensure_listener(provider);

        let Some(&account) = accounts.first() else {
            debug!("no previously authorized account");
            return Ok(());
        };
        let previous = self.begin_connect()?;
        if previous == ConnectionStatus::Connected {
            // A connect finished while we were asking; keep its session.
            self.update(|s| s.status = previous);
            return Ok(());
        }
        self.bind(provider, account);
        self.refresh().await
    }

    /// Drop the session and stop listening for account changes.
    pub fn disconnect(&self) {
        if let Some(handle) = self.listener().take() {
            handle.abort();
        }
        self.clear_session();
        info!("wallet session closed");
    }

    /// Re-read the contract view for the session account.
    ///
    /// All reads must succeed; on any failure the previous view stays.
    pub async fn refresh(&self) -> Result<()> {
        let bound = self.bound().map_err(|e| self.fail(e))?;
        self.reload(&bound).await
    }

    pub async fn stake(&self, amount: U256) -> Result<()> {
        self.execute(Operation::Stake, Some(amount), |_| WriteCall::Stake(amount))
            .await
    }

    pub async fn unstake(&self, amount: U256) -> Result<()> {
        self.execute(Operation::Unstake, Some(amount), |_| {
            WriteCall::Unstake(amount)
        })
        .await
    }

    pub async fn claim_rewards(&self) -> Result<()> {
        self.execute(Operation::ClaimRewards, None, |_| WriteCall::ClaimRewards)
            .await
    }

    /// Mint `amount` to the session account.
    pub async fn mint(&self, amount: U256) -> Result<()> {
        if !self.shared.config.has(Feature::Mint) {
            return Err(self.fail(StakingError::MintDisabled));
        }
        self.execute(Operation::Mint, Some(amount), |to| WriteCall::Mint {
            to,
            amount,
        })
        .await
    }

    async fn execute(
        &self,
        op: Operation,
        amount: Option<U256>,
        call: impl FnOnce(Address) -> WriteCall,
    ) -> Result<()> {
        let acquired = self.shared.state.send_if_modified(|s| {
            if s.pending.is_some() {
                return false;
            }
            s.pending = Some(op);
            true
        });
        if !acquired {
            debug!(?op, "ignored while another operation is in flight");
            return Err(StakingError::OperationPending);
        }
        let _pending = PendingGuard {
            state: &self.shared.state,
        };

        let bound = self.bound().map_err(|e| self.fail(e))?;
        if amount.is_some_and(|a| a.is_zero()) {
            return Err(self.fail(StakingError::InvalidAmount(
                "amount must be greater than zero".into(),
            )));
        }

        let call = call(bound.account);
        info!(?op, ?call, "submitting transaction");
        let outcome: ChainResult<()> = async {
            let tx = bound.contract.submit(call).await?;
            bound.contract.confirm(tx).await
        }
        .await;
        if let Err(e) = outcome {
            return Err(self.fail(StakingError::TransactionFailed(e.to_string())));
        }

        self.reload(&bound).await?;
        if let Some(field) = op.input_field() {
            self.update(|s| s.inputs.reset(field));
        }
        Ok(())
    }

    async fn handle_accounts_changed(&self, accounts: Vec<Address>) {
        match accounts.first() {
            None => {
                info!("wallet reported no accounts; closing session");
                self.clear_session();
            }
            Some(&account) => {
                let Some(provider) = self.shared.provider.as_ref() else {
                    return;
                };
                info!(?account, "wallet account changed");
                self.bind(provider, account);
                if let Err(e) = self.refresh().await {
                    debug!("refresh after account change failed: {e}");
                }
            }
        }
    }

    /// Read the full view and apply it if the session is still current.
    async fn reload(&self, bound: &Bound<P::Contract>) -> Result<()> {
        let include_supply = self.shared.config.has(Feature::Mint);
        let view = read_view(bound.contract.as_ref(), bound.account, include_supply).await;

        let binding = self.binding();
        if binding.epoch != bound.epoch {
            debug!("discarding contract reads for a superseded session");
            return Ok(());
        }
        match view {
            Ok(view) => {
                debug!(account = ?bound.account, balance = %view.balance, staked = %view.staked_amount, "contract view refreshed");
                self.update(|s| s.view = Some(view));
                Ok(())
            }
            Err(e) => {
                drop(binding);
                Err(self.fail(StakingError::ContractReadFailed(e.to_string())))
            }
        }
    }

    fn begin_connect(&self) -> Result<ConnectionStatus> {
        let mut previous = None;
        self.shared.state.send_if_modified(|s| {
            if s.status == ConnectionStatus::Connecting {
                return false;
            }
            previous = Some(s.status);
            s.status = ConnectionStatus::Connecting;
            true
        });
        previous.ok_or(StakingError::OperationPending)
    }

    fn bind(&self, provider: &P, account: Address) {
        let contract = Arc::new(provider.contract(self.shared.contract_address, account));
        let mut binding = self.binding();
        binding.epoch += 1;
        binding.contract = Some(contract);
        binding.account = Some(account);

        self.update(|s| {
            if s.session.account != Some(account) {
                s.view = None;
            }
            s.status = ConnectionStatus::Connected;
            s.session = Session {
                connected: true,
                account: Some(account),
            };
        });
        info!(?account, "wallet session established");
    }

    fn clear_session(&self) {
        let mut binding = self.binding();
        binding.epoch += 1;
        binding.contract = None;
        binding.account = None;
        self.update(StakingState::clear_session);
    }

    fn bound(&self) -> Result<Bound<P::Contract>> {
        let binding = self.binding();
        match (&binding.contract, binding.account) {
            (Some(contract), Some(account)) => Ok(Bound {
                contract: contract.clone(),
                account,
                epoch: binding.epoch,
            }),
            _ => Err(StakingError::NotConnected),
        }
    }

    /// Start the account-change listener unless one is already running.
    fn ensure_listener(&self, provider: &P) {
        let mut listener = self.listener();
        if listener.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let mut subscription = provider.subscribe_accounts();
        let shared: Weak<Shared<P>> = Arc::downgrade(&self.shared);
        *listener = Some(tokio::spawn(async move {
            // One event at a time; the subscription coalesces anything that
            // arrives meanwhile.
            while let Some(accounts) = subscription.changed().await {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                StakingController { shared }
                    .handle_accounts_changed(accounts)
                    .await;
            }
        }));
        debug!("account-change listener registered");
    }

    fn fail(&self, err: StakingError) -> StakingError {
        warn!("{err}");
        let message = err.to_string();
        self.update(|s| s.last_error = Some(message));
        err
    }

    fn update(&self, f: impl FnOnce(&mut StakingState)) {
        self.shared.state.send_modify(f);
    }

    fn binding(&self) -> MutexGuard<'_, Binding<P::Contract>> {
        self.shared
            .binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn listener(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.shared
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Issue the view reads concurrently and assemble them in one piece.
async fn read_view<C: StakingContract>(
    contract: &C,
    account: Address,
    include_supply: bool,
) -> ChainResult<ContractView> {
    let supply = async {
        if include_supply {
            contract.total_supply().await.map(Some)
        } else {
            Ok(None)
        }
    };
    let (balance, staked_amount, rewards, token_name, token_symbol, total_supply) = tokio::try_join!(
        contract.balance_of(account),
        contract.staked_amount(account),
        contract.total_rewards(account),
        contract.name(),
        contract.symbol(),
        supply,
    )?;

    Ok(ContractView {
        balance,
        staked_amount,
        rewards,
        token_name,
        token_symbol,
        total_supply,
    })
}
