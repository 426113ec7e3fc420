use ethers::abi::Abi;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

/// Address the MessageVault contract is deployed at on the target network.
pub const VAULT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Interface of the deployed MessageVault. Must match the on-chain contract
/// exactly, otherwise calls fail to encode or decode.
pub const VAULT_ABI: &str = r#"[
  {"type":"constructor","inputs":[],"stateMutability":"nonpayable"},
  {"type":"function","name":"owner","inputs":[],"outputs":[{"name":"","type":"address","internalType":"address"}],"stateMutability":"view"},
  {"type":"function","name":"storeMessage","inputs":[{"name":"_message","type":"string","internalType":"string"}],"outputs":[],"stateMutability":"nonpayable"},
  {"type":"function","name":"getMessage","inputs":[],"outputs":[{"name":"","type":"string","internalType":"string"}],"stateMutability":"view"},
  {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"},
  {"type":"function","name":"withdraw","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
  {"type":"function","name":"getBalance","inputs":[],"outputs":[{"name":"","type":"uint256","internalType":"uint256"}],"stateMutability":"view"}
]"#;

pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Deployed address + interface pair used to build contract handles
#[derive(Debug, Clone)]
pub struct ContractBinding {
    pub address: Address,
    pub abi: Abi,
}

impl ContractBinding {
    pub fn new(address: Address, abi_json: &str) -> anyhow::Result<Self> {
        let abi = serde_json::from_str::<Abi>(abi_json)?;
        Ok(Self { address, abi })
    }

    /// The MessageVault binding at its default deployment address
    pub fn message_vault() -> anyhow::Result<Self> {
        let address = VAULT_ADDRESS
            .parse::<Address>()
            .map_err(|e| anyhow::anyhow!("VAULT_ADDRESS: {:?}", e))?;
        Self::at(address)
    }

    /// The MessageVault interface bound to `address`
    pub fn at(address: Address) -> anyhow::Result<Self> {
        Self::new(address, VAULT_ABI)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Payload of `wallet_addEthereumChain`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameters {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// Network the dapp expects the wallet to be on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChain {
    pub chain_id: u64,
    pub name: String,
    pub currency: NativeCurrency,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl TargetChain {
    pub fn sepolia() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            name: "Sepolia".to_string(),
            currency: NativeCurrency {
                name: "Sepolia Ether".to_string(),
                symbol: "SepoliaETH".to_string(),
                decimals: 18,
            },
            rpc_url: "https://rpc.sepolia.org".to_string(),
            explorer_url: "https://sepolia.etherscan.io".to_string(),
        }
    }

    /// Chain id in the `0x`-prefixed form wallets exchange
    pub fn hex_chain_id(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub fn add_chain_parameters(&self) -> AddChainParameters {
        AddChainParameters {
            chain_id: self.hex_chain_id(),
            chain_name: self.name.clone(),
            native_currency: self.currency.clone(),
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls: vec![self.explorer_url.clone()],
        }
    }
}

/// Parses a `0x`-prefixed hex chain id
pub fn parse_chain_id(value: &str) -> Option<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// Runtime settings of the console client
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of a node with unlocked accounts. Without it the
    /// console runs against the in-memory development wallet.
    pub rpc_url: Option<String>,
    pub contract_address: Address,
    pub poll_interval: Duration,
    /// `None` waits for inclusion indefinitely
    pub confirmation_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: VAULT_ADDRESS
                .parse::<Address>()
                .unwrap_or_else(|_| Address::zero()),
            poll_interval: Duration::from_millis(500),
            confirmation_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Ok(url) = env::var("VAULT_RPC_URL") {
            if !url.trim().is_empty() {
                config.rpc_url = Some(url);
            }
        }
        if let Ok(address) = env::var("VAULT_CONTRACT_ADDRESS") {
            config.contract_address = address
                .trim()
                .parse::<Address>()
                .map_err(|e| anyhow::anyhow!("VAULT_CONTRACT_ADDRESS: {:?}", e))?;
        }
        if let Ok(ms) = env::var("VAULT_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms.trim().parse()?);
        }
        if let Ok(ms) = env::var("VAULT_CONFIRMATION_TIMEOUT_MS") {
            config.confirmation_timeout = Some(Duration::from_millis(ms.trim().parse()?));
        }

        Ok(config)
    }
}
