use super::error::{codes, ProviderError};
use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256, U64};
use ethers_providers::{JsonRpcClient, RpcError};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Arguments of a single provider request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RequestArguments {
    pub fn new(method: &str, params: Value) -> Self {
        Self {
            method: method.to_string(),
            params,
        }
    }

    pub fn without_params(method: &str) -> Self {
        Self::new(method, Value::Array(vec![]))
    }
}

/// Push events a wallet emits on its own initiative
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// `accountsChanged`: the authorized accounts, empty when disconnected
    AccountsChanged(Vec<Address>),
    /// `chainChanged`: the new chain id as a hex string
    ChainChanged(String),
}

/// Request/event interface of a wallet extension.
///
/// Implementations answer JSON-RPC style `request`s and broadcast
/// [`ProviderEvent`]s to every receiver handed out by `subscribe`.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Whether a wallet is installed at all
    fn is_available(&self) -> bool;

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Transaction object of `eth_call` and `eth_sendTransaction`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

/// The fields of a transaction receipt the client inspects
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// 1 on success, 0 when the transaction reverted
    #[serde(default)]
    pub status: Option<U64>,
}

impl ReceiptSummary {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| !s.is_zero()).unwrap_or(true)
    }
}

/// Adapts a node JSON-RPC client (e.g. `ethers_providers::Http`) to the
/// wallet interface. Account authorization is whatever the node has
/// unlocked; the node never pushes account or chain events.
#[derive(Debug)]
pub struct RpcProvider<C> {
    client: C,
    event_sender: broadcast::Sender<ProviderEvent>,
}

impl<C: JsonRpcClient> RpcProvider<C> {
    pub fn new(client: C) -> Self {
        let (event_sender, _) = broadcast::channel(16);
        Self {
            client,
            event_sender,
        }
    }
}

#[async_trait]
impl<C> WalletProvider for RpcProvider<C>
where
    C: JsonRpcClient + 'static,
{
    fn is_available(&self) -> bool {
        true
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        let method = match args.method.as_str() {
            "eth_requestAccounts" => "eth_accounts",
            other => other,
        };
        debug!("(rpc) {} {}", method, args.params);

        self.client
            .request::<Value, Value>(method, args.params)
            .await
            .map_err(|e| {
                if let Some(rpc) = e.as_error_response() {
                    ProviderError {
                        code: rpc.code,
                        message: rpc.message.clone(),
                        data: rpc.data.clone(),
                    }
                } else {
                    error!("(rpc) transport failure on {}: {}", method, e);
                    ProviderError::new(codes::DISCONNECTED, e.to_string())
                }
            })
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.event_sender.subscribe()
    }
}
