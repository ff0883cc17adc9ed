//! The capability seam between the controller and the chain.
//!
//! The controller never touches a transport directly. It is handed a
//! [`ChainProvider`], which can be the ethers-backed [`EthProvider`] or an
//! in-memory double in tests.
//!
//! [`EthProvider`]: crate::eth::EthProvider

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ChainError;

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Mutating calls accepted by the staking contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteCall {
    Stake(U256),
    Unstake(U256),
    ClaimRewards,
    Mint { to: Address, amount: U256 },
}

/// Bridge to the user's wallet.
#[async_trait]
pub trait ChainProvider: Send + Sync + 'static {
    type Contract: StakingContract;

    /// Ask the wallet for account access. May prompt the user.
    async fn request_accounts(&self) -> ChainResult<Vec<Address>>;

    /// Accounts already authorized for this client. Never prompts.
    async fn authorized_accounts(&self) -> ChainResult<Vec<Address>>;

    /// Bind a contract handle at `address` whose writes are signed by `signer`.
    fn contract(&self, address: Address, signer: Address) -> Self::Contract;

    /// Start watching for account changes.
    fn subscribe_accounts(&self) -> AccountSubscription;
}

/// Typed proxy for the staking contract.
#[async_trait]
pub trait StakingContract: Send + Sync + 'static {
    async fn balance_of(&self, account: Address) -> ChainResult<U256>;
    async fn staked_amount(&self, account: Address) -> ChainResult<U256>;
    async fn total_rewards(&self, account: Address) -> ChainResult<U256>;
    async fn name(&self) -> ChainResult<String>;
    async fn symbol(&self) -> ChainResult<String>;
    async fn total_supply(&self) -> ChainResult<U256>;

    /// Submit a write; resolves once the transaction has been accepted by
    /// the node.
    async fn submit(&self, call: WriteCall) -> ChainResult<TxHash>;

    /// Wait for one confirmation of `tx`. Fails if it was dropped or reverted.
    async fn confirm(&self, tx: TxHash) -> ChainResult<()>;
}

/// Account-change notifications.
///
/// Backed by a `watch` channel, so notifications that arrive while the
/// previous one is still being handled collapse into the latest account
/// list. Dropping the subscription stops the producer task, if any.
pub struct AccountSubscription {
    rx: watch::Receiver<Vec<Address>>,
    task: Option<JoinHandle<()>>,
}

impl AccountSubscription {
    pub fn new(rx: watch::Receiver<Vec<Address>>) -> Self {
        Self { rx, task: None }
    }

    /// A subscription whose notifications come from `task`.
    pub fn with_task(rx: watch::Receiver<Vec<Address>>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Wait for the next change. `None` once the producer is gone.
    pub async fn changed(&mut self) -> Option<Vec<Address>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
