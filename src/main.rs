use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use ethers_providers::Http;
use log::{info, warn};
use std::{str::FromStr, sync::Arc};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::select;
use vault_dapp::config::SEPOLIA_CHAIN_ID;
use vault_dapp::devnet::MAINNET_CHAIN_ID;
use vault_dapp::{
    ChainClient, ChainEvents, Config, ContractBinding, Controller, DevWallet, RpcProvider,
    TargetChain, WalletProvider,
};

const DEV_ACCOUNTS: [&str; 2] = [
    "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
    "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
];

const HELP: &str = "commands: connect | switch | store <text> | fetch | deposit <eth> | withdraw | refresh | help | quit
dev wallet only: account <n> | chain <id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let binding = ContractBinding::at(config.contract_address)?;
    let chain = TargetChain::sepolia();

    match config.rpc_url.clone() {
        Some(url) => {
            info!("using JSON-RPC endpoint {}", url);
            let provider = Arc::new(RpcProvider::new(Http::from_str(&url)?));
            run(build(provider, binding, chain, &config), None).await
        }
        None => {
            info!("no VAULT_RPC_URL set, using the in-memory dev wallet");
            let accounts = DEV_ACCOUNTS
                .iter()
                .map(|a| {
                    a.parse::<Address>()
                        .map_err(|e| anyhow::anyhow!("bad dev account {}: {:?}", a, e))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let funds: U256 = parse_ether(10)?;
            let wallet = accounts.iter().fold(
                DevWallet::new(&binding, SEPOLIA_CHAIN_ID, accounts[0]),
                |wallet, account| wallet.with_account(*account, funds),
            );
            let wallet = Arc::new(wallet.starting_on(MAINNET_CHAIN_ID));
            run(build(wallet.clone(), binding, chain, &config), Some(wallet)).await
        }
    }
}

fn build<P: WalletProvider>(
    provider: Arc<P>,
    binding: ContractBinding,
    chain: TargetChain,
    config: &Config,
) -> Controller<P> {
    let client = ChainClient::new(provider, binding, chain)
        .with_poll_interval(config.poll_interval)
        .with_confirmation_timeout(config.confirmation_timeout);
    Controller::new(client)
}

async fn run<P: WalletProvider>(
    mut controller: Controller<P>,
    dev_wallet: Option<Arc<DevWallet>>,
) -> anyhow::Result<()> {
    let mut events: ChainEvents = controller.client().events();
    let mut lines = BufReader::new(io::stdin()).lines();

    controller.mount().await;
    println!("{}\n{}", HELP, controller.view());

    loop {
        select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => return Ok(()),
                };
                let (command, argument) = match line.trim().split_once(' ') {
                    Some((command, argument)) => (command, argument.trim()),
                    None => (line.trim(), ""),
                };

                match command {
                    "" => continue,
                    "connect" => controller.connect().await,
                    "switch" => controller.switch_network().await,
                    "store" => {
                        controller.set_message_input(argument);
                        controller.store_message().await;
                    }
                    "fetch" => controller.fetch_message().await,
                    "deposit" => {
                        controller.set_deposit_input(argument);
                        controller.deposit().await;
                    }
                    "withdraw" => controller.withdraw().await,
                    "refresh" => controller.refresh().await,
                    "account" | "chain" => match &dev_wallet {
                        Some(wallet) => dev_command(wallet, command, argument),
                        None => warn!("{} is only available with the dev wallet", command),
                    },
                    "help" => println!("{}", HELP),
                    "quit" | "exit" => return Ok(()),
                    other => println!("unknown command {:?}\n{}", other, HELP),
                }
            }
            event = events.recv() => {
                match event {
                    Some(event) => controller.handle_chain_event(event).await,
                    None => {
                        warn!("wallet event stream closed");
                        return Ok(());
                    }
                }
            }
        }

        println!("{}", controller.view());
    }
}

/// Plays the wallet user: switch account or network from the console
fn dev_command(wallet: &DevWallet, command: &str, argument: &str) {
    match command {
        "account" => match argument
            .parse::<usize>()
            .ok()
            .and_then(|i| wallet.accounts().get(i).copied())
        {
            Some(account) => wallet.select_account(account),
            None => println!("accounts: {:?}", wallet.accounts()),
        },
        "chain" => match argument.parse::<u64>() {
            Ok(chain_id) => wallet.change_chain(chain_id),
            Err(_) => println!("usage: chain <decimal chain id>"),
        },
        _ => {}
    }
}
