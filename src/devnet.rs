//! In-memory wallet for local runs and tests.
//!
//! `DevWallet` answers the same requests a browser wallet extension does,
//! keeps a MessageVault deployed on a single chain, and pushes
//! `accountsChanged` / `chainChanged` events when its user switches account
//! or network. It signs nothing: accounts are plain addresses.

use super::config::{parse_chain_id, AddChainParameters, ContractBinding};
use super::contract::{Call, MessageVault};
use super::error::{codes, ProviderError};
use super::provider::{CallRequest, ProviderEvent, ReceiptSummary, RequestArguments, WalletProvider};
use async_trait::async_trait;
use ethers::abi::Abi;
use ethers::types::{Address, Bytes, H256, U256, U64};
use ethers::utils::keccak256;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

pub const MAINNET_CHAIN_ID: u64 = 1;

struct PendingReceipt {
    receipt: ReceiptSummary,
    /// Receipt lookups that still answer `null`
    polls_left: u32,
}

struct DevState {
    installed: bool,
    rejecting: bool,
    offline: bool,
    mine_reverts: bool,
    confirmation_polls: u32,

    authorized: bool,
    accounts: Vec<Address>,
    selected: usize,

    chain_id: u64,
    known_chains: HashSet<u64>,

    vault_chain: u64,
    vault_address: Address,
    vault: MessageVault,

    balances: HashMap<Address, U256>,
    receipts: HashMap<H256, PendingReceipt>,
    block_number: u64,
    nonce: u64,
}

impl DevState {
    fn selected_account(&self) -> Option<Address> {
        self.accounts.get(self.selected).copied()
    }

    fn exposed_accounts(&self) -> Vec<Address> {
        if self.authorized {
            self.selected_account().into_iter().collect()
        } else {
            vec![]
        }
    }

    fn hosts_vault(&self, to: Address) -> bool {
        self.chain_id == self.vault_chain && to == self.vault_address
    }

    /// Adds `amount` to `account`, leaving the balance untouched on overflow
    fn credit(&mut self, account: Address, amount: U256) -> Result<(), ProviderError> {
        let balance = self.balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ProviderError::internal("balance overflow"))?;
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParameter {
    chain_id: String,
}

pub struct DevWallet {
    interface: Abi,
    state: Mutex<DevState>,
    event_sender: broadcast::Sender<ProviderEvent>,
}

impl DevWallet {
    /// A wallet whose only account is `owner`, sitting on `chain_id`, where
    /// `owner` has deployed the vault at the binding's address.
    pub fn new(binding: &ContractBinding, chain_id: u64, owner: Address) -> Self {
        let (event_sender, _) = broadcast::channel(64);
        let state = DevState {
            installed: true,
            rejecting: false,
            offline: false,
            mine_reverts: false,
            confirmation_polls: 0,
            authorized: false,
            accounts: vec![owner],
            selected: 0,
            chain_id,
            known_chains: [MAINNET_CHAIN_ID, chain_id].into_iter().collect(),
            vault_chain: chain_id,
            vault_address: binding.address,
            vault: MessageVault::deploy(owner),
            balances: HashMap::new(),
            receipts: HashMap::new(),
            block_number: 0,
            nonce: 0,
        };

        Self {
            interface: binding.abi.clone(),
            state: Mutex::new(state),
            event_sender,
        }
    }

    /// Adds a wallet account holding `balance` wei
    pub fn with_account(self, account: Address, balance: U256) -> Self {
        {
            let mut state = self.state();
            if !state.accounts.contains(&account) {
                state.accounts.push(account);
            }
            state.balances.insert(account, balance);
        }
        self
    }

    /// Starts the wallet on another chain than the one hosting the vault
    pub fn starting_on(self, chain_id: u64) -> Self {
        {
            let mut state = self.state();
            state.chain_id = chain_id;
            state.known_chains.insert(chain_id);
        }
        self
    }

    /// Makes the wallet unaware of `chain_id` until it is added again
    pub fn without_chain(self, chain_id: u64) -> Self {
        self.state().known_chains.remove(&chain_id);
        self
    }

    fn state(&self) -> MutexGuard<'_, DevState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ProviderEvent) {
        if self.event_sender.send(event).is_err() {
            debug!("(devnet) provider event dropped: no subscriber");
        }
    }

    pub fn set_installed(&self, installed: bool) {
        self.state().installed = installed;
    }

    /// While set, every approval prompt is declined by the user
    pub fn set_rejecting(&self, rejecting: bool) {
        self.state().rejecting = rejecting;
    }

    /// While set, every request fails as if the RPC endpoint were down
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Mine reverting transactions with status 0 instead of refusing them
    pub fn set_mine_reverts(&self, mine_reverts: bool) {
        self.state().mine_reverts = mine_reverts;
    }

    /// Number of receipt lookups that answer `null` before a transaction
    /// shows up as included
    pub fn set_confirmation_polls(&self, polls: u32) {
        self.state().confirmation_polls = polls;
    }

    pub fn fund(&self, account: Address, amount: U256) {
        let mut state = self.state();
        let balance = state.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// The user picks another account in the wallet UI
    pub fn select_account(&self, account: Address) {
        let exposed = {
            let mut state = self.state();
            let index = match state.accounts.iter().position(|a| *a == account) {
                Some(index) => index,
                None => {
                    state.accounts.push(account);
                    state.accounts.len() - 1
                }
            };
            state.selected = index;
            state.exposed_accounts()
        };
        info!("(devnet) selected account {:?}", account);
        if !exposed.is_empty() {
            self.emit(ProviderEvent::AccountsChanged(exposed));
        }
    }

    /// The user switches network in the wallet UI
    pub fn change_chain(&self, chain_id: u64) {
        {
            let mut state = self.state();
            state.known_chains.insert(chain_id);
            state.chain_id = chain_id;
        }
        info!("(devnet) changed chain to {:#x}", chain_id);
        self.emit(ProviderEvent::ChainChanged(format!("{:#x}", chain_id)));
    }

    /// The user revokes the dapp's access
    pub fn disconnect(&self) {
        self.state().authorized = false;
        self.emit(ProviderEvent::AccountsChanged(vec![]));
    }

    pub fn chain_id(&self) -> u64 {
        self.state().chain_id
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.state().accounts.clone()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn vault_balance(&self) -> U256 {
        self.state().vault.get_balance()
    }

    pub fn vault_message(&self) -> String {
        self.state().vault.get_message().to_string()
    }

    fn request_accounts(&self) -> Result<Value, ProviderError> {
        let mut state = self.state();
        if state.rejecting {
            return Err(ProviderError::user_rejected());
        }
        state.authorized = true;
        Ok(json!(state.exposed_accounts()))
    }

    fn switch_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let target: SwitchChainParameter = param(params, 0)?;
        let chain_id = parse_chain_id(&target.chain_id).ok_or_else(|| {
            ProviderError::new(
                codes::INVALID_PARAMS,
                format!("Invalid chain id {}", target.chain_id),
            )
        })?;

        let changed = {
            let mut state = self.state();
            // An unknown chain is reported before the user is ever prompted
            if !state.known_chains.contains(&chain_id) {
                return Err(ProviderError::new(
                    codes::UNRECOGNIZED_CHAIN,
                    format!(
                        "Unrecognized chain ID \"{}\". Try adding the chain using wallet_addEthereumChain first.",
                        target.chain_id
                    ),
                ));
            }
            if state.rejecting {
                return Err(ProviderError::user_rejected());
            }
            let changed = state.chain_id != chain_id;
            state.chain_id = chain_id;
            changed
        };

        if changed {
            self.emit(ProviderEvent::ChainChanged(format!("{:#x}", chain_id)));
        }
        Ok(Value::Null)
    }

    fn add_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let descriptor: AddChainParameters = param(params, 0)?;
        let chain_id = parse_chain_id(&descriptor.chain_id).ok_or_else(|| {
            ProviderError::new(
                codes::INVALID_PARAMS,
                format!("Invalid chain id {}", descriptor.chain_id),
            )
        })?;
        if descriptor.native_currency.decimals != 18 {
            return Err(ProviderError::new(
                codes::INVALID_PARAMS,
                "nativeCurrency.decimals must be 18",
            ));
        }
        if descriptor.rpc_urls.is_empty() {
            return Err(ProviderError::new(
                codes::INVALID_PARAMS,
                "rpcUrls must contain at least one endpoint",
            ));
        }

        let mut state = self.state();
        if state.rejecting {
            return Err(ProviderError::user_rejected());
        }
        info!(
            "(devnet) added chain {} ({})",
            descriptor.chain_name, descriptor.chain_id
        );
        state.known_chains.insert(chain_id);
        Ok(Value::Null)
    }

    fn call(&self, params: &Value) -> Result<Value, ProviderError> {
        let request: CallRequest = param(params, 0)?;
        let state = self.state();
        if !state.hosts_vault(request.to) {
            // no code at that address on this chain
            return Ok(json!(Bytes::default()));
        }

        // eth_call never persists state
        let mut vault = state.vault.clone();
        let outcome = vault
            .execute(
                &self.interface,
                &Call {
                    caller: request.from.unwrap_or_default(),
                    value: request.value.unwrap_or_default(),
                    data: &request.data,
                },
            )
            .map_err(|revert| ProviderError::reverted(&revert.reason()))?;

        Ok(json!(Bytes::from(outcome.output)))
    }

    fn send_transaction(&self, params: &Value) -> Result<Value, ProviderError> {
        let request: CallRequest = param(params, 0)?;
        let mut state = self.state();

        let from = match (request.from, state.exposed_accounts().first()) {
            (Some(from), Some(active)) if from == *active => from,
            _ => {
                return Err(ProviderError::new(
                    codes::UNAUTHORIZED,
                    "The requested account has not been authorized by the user.",
                ))
            }
        };
        if state.rejecting {
            return Err(ProviderError::user_rejected());
        }

        let value = request.value.unwrap_or_default();
        let funds = state.balances.get(&from).copied().unwrap_or_default();
        if funds < value {
            return Err(ProviderError::new(
                codes::INSUFFICIENT_FUNDS,
                "insufficient funds for gas * price + value",
            ));
        }

        let mut succeeded = true;
        if state.hosts_vault(request.to) {
            let mut vault = state.vault.clone();
            let result = vault.execute(
                &self.interface,
                &Call {
                    caller: from,
                    value,
                    data: &request.data,
                },
            );
            match result {
                Ok(outcome) => {
                    if let Some((to, amount)) = outcome.payout {
                        state.credit(to, amount)?;
                    }
                    state.vault = vault;
                }
                Err(revert) if state.mine_reverts => {
                    debug!("(devnet) mining reverted transaction: {}", revert);
                    succeeded = false;
                }
                Err(revert) => return Err(ProviderError::reverted(&revert.reason())),
            }
        } else {
            state.credit(request.to, value)?;
        }

        if succeeded {
            *state.balances.entry(from).or_default() -= value;
        }

        let mut preimage = from.as_bytes().to_vec();
        preimage.extend_from_slice(&state.nonce.to_be_bytes());
        let hash = H256::from(keccak256(preimage));
        state.nonce += 1;
        state.block_number += 1;

        let receipt = ReceiptSummary {
            transaction_hash: hash,
            block_number: Some(U64::from(state.block_number)),
            status: Some(if succeeded { U64::one() } else { U64::zero() }),
        };
        let polls_left = state.confirmation_polls;
        state.receipts.insert(
            hash,
            PendingReceipt {
                receipt,
                polls_left,
            },
        );

        debug!("(devnet) sent transaction {:?} from {:?}", hash, from);
        Ok(json!(hash))
    }

    fn transaction_receipt(&self, params: &Value) -> Result<Value, ProviderError> {
        let hash: H256 = param(params, 0)?;
        let mut state = self.state();
        match state.receipts.get_mut(&hash) {
            Some(pending) if pending.polls_left > 0 => {
                pending.polls_left -= 1;
                Ok(Value::Null)
            }
            Some(pending) => Ok(json!(pending.receipt)),
            None => Ok(Value::Null),
        }
    }
}

/// Deserializes the positional parameter at `index`
fn param<T: DeserializeOwned>(params: &Value, index: usize) -> Result<T, ProviderError> {
    let value = params.get(index).cloned().ok_or_else(|| {
        ProviderError::new(
            codes::INVALID_PARAMS,
            format!("missing parameter {}", index),
        )
    })?;
    serde_json::from_value(value)
        .map_err(|e| ProviderError::new(codes::INVALID_PARAMS, e.to_string()))
}

#[async_trait]
impl WalletProvider for DevWallet {
    fn is_available(&self) -> bool {
        self.state().installed
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        {
            let state = self.state();
            if !state.installed {
                return Err(ProviderError::new(
                    codes::DISCONNECTED,
                    "wallet is not installed",
                ));
            }
            if state.offline {
                error!("(devnet) {} failed: endpoint unreachable", args.method);
                return Err(ProviderError::internal("Failed to fetch"));
            }
        }

        debug!("(devnet) {} {}", args.method, args.params);
        match args.method.as_str() {
            "eth_requestAccounts" => self.request_accounts(),
            "eth_accounts" => Ok(json!(self.state().exposed_accounts())),
            "eth_chainId" => Ok(json!(format!("{:#x}", self.state().chain_id))),
            "wallet_switchEthereumChain" => self.switch_chain(&args.params),
            "wallet_addEthereumChain" => self.add_chain(&args.params),
            "eth_call" => self.call(&args.params),
            "eth_sendTransaction" => self.send_transaction(&args.params),
            "eth_getTransactionReceipt" => self.transaction_receipt(&args.params),
            other => Err(ProviderError::new(
                codes::METHOD_NOT_FOUND,
                format!("The method \"{}\" does not exist / is not available.", other),
            )),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.event_sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TargetChain, SEPOLIA_CHAIN_ID};

    fn wallet() -> (DevWallet, Address) {
        let owner = Address::repeat_byte(0xab);
        let binding = ContractBinding::message_vault().unwrap();
        (DevWallet::new(&binding, SEPOLIA_CHAIN_ID, owner), owner)
    }

    #[tokio::test]
    async fn accounts_are_hidden_until_requested() {
        let (wallet, owner) = wallet();
        let accounts = wallet
            .request(RequestArguments::without_params("eth_accounts"))
            .await
            .unwrap();
        assert_eq!(accounts, json!([]));

        let accounts = wallet
            .request(RequestArguments::without_params("eth_requestAccounts"))
            .await
            .unwrap();
        assert_eq!(accounts, json!([owner]));
    }

    #[tokio::test]
    async fn unknown_chain_must_be_added_before_switching() {
        let (wallet, _) = wallet();
        let wallet = wallet.starting_on(MAINNET_CHAIN_ID).without_chain(SEPOLIA_CHAIN_ID);
        let mut events = wallet.subscribe();
        let chain = TargetChain::sepolia();

        let switch = RequestArguments::new(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain.hex_chain_id() }]),
        );
        let err = wallet.request(switch.clone()).await.unwrap_err();
        assert_eq!(err.code, codes::UNRECOGNIZED_CHAIN);

        wallet
            .request(RequestArguments::new(
                "wallet_addEthereumChain",
                json!([chain.add_chain_parameters()]),
            ))
            .await
            .unwrap();
        wallet.request(switch).await.unwrap();

        assert_eq!(wallet.chain_id(), SEPOLIA_CHAIN_ID);
        assert_eq!(
            events.try_recv().unwrap(),
            ProviderEvent::ChainChanged("0xaa36a7".to_string())
        );
    }

    #[tokio::test]
    async fn switch_to_unknown_chain_is_reported_before_prompting() {
        let (wallet, _) = wallet();
        let wallet = wallet.starting_on(MAINNET_CHAIN_ID).without_chain(SEPOLIA_CHAIN_ID);
        wallet.set_rejecting(true);

        let err = wallet
            .request(RequestArguments::new(
                "wallet_switchEthereumChain",
                json!([{ "chainId": TargetChain::sepolia().hex_chain_id() }]),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::UNRECOGNIZED_CHAIN);
        assert_eq!(wallet.chain_id(), MAINNET_CHAIN_ID);
    }

    #[tokio::test]
    async fn transfer_overflowing_recipient_fails_without_moving_funds() {
        let (wallet, owner) = wallet();
        let rich = Address::repeat_byte(0xee);
        let wallet = wallet.with_account(rich, U256::MAX);
        wallet.fund(owner, U256::from(10));
        wallet.fund(rich, U256::one());
        assert_eq!(wallet.balance_of(rich), U256::MAX);

        wallet
            .request(RequestArguments::without_params("eth_requestAccounts"))
            .await
            .unwrap();
        let err = wallet
            .request(RequestArguments::new(
                "eth_sendTransaction",
                json!([CallRequest {
                    from: Some(owner),
                    to: rich,
                    data: Bytes::default(),
                    value: Some(U256::from(10)),
                }]),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::INTERNAL);
        assert_eq!(wallet.balance_of(owner), U256::from(10));
        assert_eq!(wallet.balance_of(rich), U256::MAX);
    }

    #[tokio::test]
    async fn offline_wallet_fails_every_request() {
        let (wallet, _) = wallet();
        wallet.set_offline(true);
        let err = wallet
            .request(RequestArguments::without_params("eth_chainId"))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::INTERNAL);
    }

    #[tokio::test]
    async fn unsupported_method_is_reported() {
        let (wallet, owner) = wallet();
        for args in [
            RequestArguments::without_params("eth_mining"),
            RequestArguments::new("eth_getBalance", json!([owner, "latest"])),
        ] {
            let err = wallet.request(args).await.unwrap_err();
            assert_eq!(err.code, codes::METHOD_NOT_FOUND);
        }
    }

    #[test]
    fn account_switch_is_pushed_only_when_authorized() {
        let (wallet, _) = wallet();
        let mut events = wallet.subscribe();
        let other = Address::repeat_byte(0xcd);

        wallet.select_account(other);
        assert!(events.try_recv().is_err());

        wallet.state().authorized = true;
        wallet.select_account(other);
        assert_eq!(
            events.try_recv().unwrap(),
            ProviderEvent::AccountsChanged(vec![other])
        );
    }
}
