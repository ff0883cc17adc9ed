//! Ethereum JSON-RPC implementation of the provider seam, built on ethers.
//!
//! Keys stay with the wallet/node behind the endpoint: contract handles are
//! bound with `with_sender`, so `eth_sendTransaction` is signed remotely.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::contract::{abigen, ContractError};
use ethers::providers::{Http, Middleware, PendingTransaction, Provider, ProviderError, RpcError};
use ethers::types::{Address, TransactionReceipt, TxHash, U256, U64};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ChainError, Result, StakingError};
use crate::provider::{
    AccountSubscription, ChainProvider, ChainResult, StakingContract, WriteCall,
};

abigen!(
    StakingToken,
    r#"[
        function name() external view returns (string)
        function symbol() external view returns (string)
        function totalSupply() external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
        function stakedAmount(address account) external view returns (uint256)
        function totalRewards(address account) external view returns (uint256)
        function stake(uint256 amount) external
        function unstake(uint256 amount) external
        function claimRewards() external
        function mint(address to, uint256 amount) external
    ]"#
);

impl From<ProviderError> for ChainError {
    fn from(err: ProviderError) -> Self {
        match err.as_error_response() {
            Some(resp) => ChainError::Rejected(resp.message.clone()),
            None => ChainError::Unavailable(err.to_string()),
        }
    }
}

fn contract_error(err: ContractError<Provider<Http>>) -> ChainError {
    match err {
        ContractError::MiddlewareError { e } => e.into(),
        ContractError::ProviderError { e } => e.into(),
        other => ChainError::Call(other.to_string()),
    }
}

/// Wallet endpoint reached over HTTP JSON-RPC.
#[derive(Clone)]
pub struct EthProvider {
    provider: Arc<Provider<Http>>,
    poll_interval: Duration,
}

impl EthProvider {
    pub fn connect(rpc_url: &str, poll_interval: Duration) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| StakingError::Config(format!("invalid rpc url '{rpc_url}': {e}")))?
            .interval(poll_interval);
        debug!("using JSON-RPC provider at {rpc_url}");
        Ok(Self {
            provider: Arc::new(provider),
            poll_interval,
        })
    }
}

#[async_trait]
impl ChainProvider for EthProvider {
    type Contract = EthStakingContract;

    async fn request_accounts(&self) -> ChainResult<Vec<Address>> {
        let accounts: Vec<Address> = self.provider.request("eth_requestAccounts", ()).await?;
        Ok(accounts)
    }

    async fn authorized_accounts(&self) -> ChainResult<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }

    fn contract(&self, address: Address, signer: Address) -> EthStakingContract {
        let client = Arc::new(self.provider.as_ref().clone().with_sender(signer));
        EthStakingContract {
            binding: StakingToken::new(address, client.clone()),
            client,
        }
    }

    fn subscribe_accounts(&self) -> AccountSubscription {
        let (tx, rx) = watch::channel(Vec::new());
        let provider = self.provider.clone();
        let period = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut last: Option<Vec<Address>> = None;
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                match provider.get_accounts().await {
                    Ok(accounts) => {
                        if last.as_ref() != Some(&accounts) {
                            // The first poll only records the baseline.
                            if last.is_some() {
                                debug!(count = accounts.len(), "wallet accounts changed");
                                tx.send_replace(accounts.clone());
                            }
                            last = Some(accounts);
                        }
                    }
                    Err(e) => debug!("eth_accounts poll failed: {e}"),
                }
            }
        });

        AccountSubscription::with_task(rx, task)
    }
}

pub struct EthStakingContract {
    binding: StakingToken<Provider<Http>>,
    client: Arc<Provider<Http>>,
}

#[async_trait]
impl StakingContract for EthStakingContract {
    async fn balance_of(&self, account: Address) -> ChainResult<U256> {
        self.binding.balance_of(account).call().await.map_err(contract_error)
    }

    async fn staked_amount(&self, account: Address) -> ChainResult<U256> {
        self.binding
            .staked_amount(account)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn total_rewards(&self, account: Address) -> ChainResult<U256> {
        self.binding
            .total_rewards(account)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn name(&self) -> ChainResult<String> {
        self.binding.name().call().await.map_err(contract_error)
    }

    async fn symbol(&self) -> ChainResult<String> {
        self.binding.symbol().call().await.map_err(contract_error)
    }

    async fn total_supply(&self) -> ChainResult<U256> {
        self.binding.total_supply().call().await.map_err(contract_error)
    }

    async fn submit(&self, call: WriteCall) -> ChainResult<TxHash> {
        let contract_call = match &call {
            WriteCall::Stake(amount) => self.binding.stake(*amount),
            WriteCall::Unstake(amount) => self.binding.unstake(*amount),
            WriteCall::ClaimRewards => self.binding.claim_rewards(),
            WriteCall::Mint { to, amount } => self.binding.mint(*to, *amount),
        };
        let pending = contract_call.send().await.map_err(contract_error)?;
        let tx = pending.tx_hash();
        info!(?tx, ?call, "transaction submitted");
        Ok(tx)
    }

    async fn confirm(&self, tx: TxHash) -> ChainResult<()> {
        let receipt = PendingTransaction::new(tx, self.client.as_ref())
            .confirmations(1)
            .await?;
        receipt_outcome(tx, receipt)
    }
}

fn receipt_outcome(tx: TxHash, receipt: Option<TransactionReceipt>) -> ChainResult<()> {
    match receipt {
        Some(receipt) if receipt.status == Some(U64::from(1)) => {
            info!(?tx, block = ?receipt.block_number, "transaction confirmed");
            Ok(())
        }
        Some(_) => {
            warn!(?tx, "transaction reverted");
            Err(ChainError::Rejected(format!("transaction {tx:?} reverted")))
        }
        None => {
            warn!(?tx, "transaction dropped from mempool");
            Err(ChainError::Call(format!("transaction {tx:?} was dropped")))
        }
    }
}
