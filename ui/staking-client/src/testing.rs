//! In-memory chain used by the controller tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use tokio::sync::{watch, Semaphore};

use crate::error::ChainError;
use crate::provider::{
    AccountSubscription, ChainProvider, ChainResult, StakingContract, WriteCall,
};

pub fn account(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub struct ChainState {
    pub accounts: Vec<Address>,
    pub access_error: Option<ChainError>,
    pub balances: HashMap<Address, U256>,
    pub staked: HashMap<Address, U256>,
    pub rewards: HashMap<Address, U256>,
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
    pub read_error: Option<ChainError>,
    pub submit_error: Option<ChainError>,
    pub confirm_error: Option<ChainError>,
    pub submitted: Vec<WriteCall>,
    pub supply_reads: usize,
    pending: HashMap<TxHash, (Address, WriteCall)>,
    next_tx: u64,
}

impl ChainState {
    fn apply(&mut self, signer: Address, call: WriteCall) -> ChainResult<()> {
        match call {
            WriteCall::Stake(amount) => {
                let balance = self.balances.entry(signer).or_default();
                *balance = balance
                    .checked_sub(amount)
                    .ok_or_else(|| ChainError::Rejected("insufficient balance".into()))?;
                *self.staked.entry(signer).or_default() += amount;
            }
            WriteCall::Unstake(amount) => {
                let staked = self.staked.entry(signer).or_default();
                *staked = staked
                    .checked_sub(amount)
                    .ok_or_else(|| ChainError::Rejected("insufficient stake".into()))?;
                *self.balances.entry(signer).or_default() += amount;
            }
            WriteCall::ClaimRewards => {
                let rewards = self.rewards.insert(signer, U256::zero()).unwrap_or_default();
                *self.balances.entry(signer).or_default() += rewards;
            }
            WriteCall::Mint { to, amount } => {
                *self.balances.entry(to).or_default() += amount;
                self.total_supply += amount;
            }
        }
        Ok(())
    }
}

pub struct MockChain {
    state: Mutex<ChainState>,
    accounts_tx: watch::Sender<Vec<Address>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        let (accounts_tx, _) = watch::channel(Vec::new());
        Arc::new(Self {
            state: Mutex::new(ChainState {
                accounts: Vec::new(),
                access_error: None,
                balances: HashMap::new(),
                staked: HashMap::new(),
                rewards: HashMap::new(),
                name: "Stake Token".into(),
                symbol: "STK".into(),
                total_supply: U256::from(1_000),
                read_error: None,
                submit_error: None,
                confirm_error: None,
                submitted: Vec::new(),
                supply_reads: 0,
                pending: HashMap::new(),
                next_tx: 1,
            }),
            accounts_tx,
            gate: Mutex::new(None),
        })
    }

    /// Authorize `who` and give it the listed holdings.
    pub fn fund(&self, who: Address, balance: u64, staked: u64, rewards: u64) {
        let mut state = self.state();
        if !state.accounts.contains(&who) {
            state.accounts.push(who);
        }
        state.balances.insert(who, U256::from(balance));
        state.staked.insert(who, U256::from(staked));
        state.rewards.insert(who, U256::from(rewards));
    }

    pub fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    /// Simulate the wallet's account-change notification.
    pub fn emit_accounts(&self, accounts: Vec<Address>) {
        self.state().accounts = accounts.clone();
        self.accounts_tx.send_replace(accounts);
    }

    pub fn listeners(&self) -> usize {
        self.accounts_tx.receiver_count()
    }

    /// Make every confirmation wait for a permit on the returned semaphore.
    pub fn hold_confirmations(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn provider(self: &Arc<Self>) -> MockProvider {
        MockProvider {
            chain: self.clone(),
        }
    }
}

pub struct MockProvider {
    chain: Arc<MockChain>,
}

#[async_trait]
impl ChainProvider for MockProvider {
    type Contract = MockContract;

    async fn request_accounts(&self) -> ChainResult<Vec<Address>> {
        let state = self.chain.state();
        match &state.access_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.accounts.clone()),
        }
    }

    async fn authorized_accounts(&self) -> ChainResult<Vec<Address>> {
        Ok(self.chain.state().accounts.clone())
    }

    fn contract(&self, _address: Address, signer: Address) -> MockContract {
        MockContract {
            chain: self.chain.clone(),
            signer,
        }
    }

    fn subscribe_accounts(&self) -> AccountSubscription {
        AccountSubscription::new(self.chain.accounts_tx.subscribe())
    }
}

pub struct MockContract {
    chain: Arc<MockChain>,
    signer: Address,
}

impl MockContract {
    fn read<T>(&self, f: impl FnOnce(&mut ChainState) -> T) -> ChainResult<T> {
        let mut state = self.chain.state();
        if let Some(err) = &state.read_error {
            return Err(err.clone());
        }
        Ok(f(&mut state))
    }
}

#[async_trait]
impl StakingContract for MockContract {
    async fn balance_of(&self, account: Address) -> ChainResult<U256> {
        self.read(|s| s.balances.get(&account).copied().unwrap_or_default())
    }

    async fn staked_amount(&self, account: Address) -> ChainResult<U256> {
        self.read(|s| s.staked.get(&account).copied().unwrap_or_default())
    }

    async fn total_rewards(&self, account: Address) -> ChainResult<U256> {
        self.read(|s| s.rewards.get(&account).copied().unwrap_or_default())
    }

    async fn name(&self) -> ChainResult<String> {
        self.read(|s| s.name.clone())
    }

    async fn symbol(&self) -> ChainResult<String> {
        self.read(|s| s.symbol.clone())
    }

    async fn total_supply(&self) -> ChainResult<U256> {
        self.read(|s| {
            s.supply_reads += 1;
            s.total_supply
        })
    }

    async fn submit(&self, call: WriteCall) -> ChainResult<TxHash> {
        let mut state = self.chain.state();
        if let Some(err) = &state.submit_error {
            return Err(err.clone());
        }
        let tx = TxHash::from_low_u64_be(state.next_tx);
        state.next_tx += 1;
        state.submitted.push(call.clone());
        state.pending.insert(tx, (self.signer, call));
        Ok(tx)
    }

    async fn confirm(&self, tx: TxHash) -> ChainResult<()> {
        let gate = self.chain.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let mut state = self.chain.state();
        if let Some(err) = &state.confirm_error {
            return Err(err.clone());
        }
        let (signer, call) = state
            .pending
            .remove(&tx)
            .ok_or_else(|| ChainError::Call(format!("unknown transaction {tx:?}")))?;
        state.apply(signer, call)
    }
}
