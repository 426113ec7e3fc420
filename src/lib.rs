//! Client for the MessageVault dapp: wallet provider plumbing, typed contract
//! calls and the session state machine behind the console front end.

pub mod client;
pub mod config;
pub mod contract;
pub mod controller;
pub mod devnet;
pub mod error;
pub mod provider;
pub mod session;

pub use client::{ChainClient, ChainEvent, ChainEvents, ContractHandle};
pub use config::{Config, ContractBinding, TargetChain};
pub use controller::Controller;
pub use devnet::DevWallet;
pub use error::{ClientError, ErrorKind, Operation, ProviderError};
pub use provider::{RpcProvider, WalletProvider};
pub use session::{transition, Session, SessionEvent, View};
