use ethers::types::H256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// EIP-1193 / JSON-RPC error codes the client reacts to
pub mod codes {
    pub const EXECUTION_REVERTED: i64 = 3;
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const DISCONNECTED: i64 = 4900;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL: i64 = -32603;
    pub const INSUFFICIENT_FUNDS: i64 = -32000;
}

/// Error object returned by a wallet provider request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    pub fn user_rejected() -> Self {
        Self::new(codes::USER_REJECTED, "User rejected the request.")
    }

    pub fn reverted(reason: &str) -> Self {
        Self::new(
            codes::EXECUTION_REVERTED,
            format!("execution reverted: {}", reason),
        )
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == codes::UNRECOGNIZED_CHAIN
    }
}

/// Failure of a single contract handle invocation
#[derive(Debug, Error)]
pub enum CallError {
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("abi: {0}")]
    Abi(String),
    #[error("no connected account to sign with")]
    NoSigner,
    #[error("transaction {0:?} reverted")]
    Reverted(H256),
    #[error("transaction {0:?} was not included in time")]
    Timeout(H256),
}

/// Operations of the chain client, used to prefix surfaced errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Connect,
    CheckNetwork,
    SwitchNetwork,
    GetHandle,
    ReadOwner,
    ReadMessage,
    ReadBalance,
    WriteMessage,
    SendDeposit,
    SendWithdraw,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Connect => "connect",
            Operation::CheckNetwork => "checkNetwork",
            Operation::SwitchNetwork => "switchNetwork",
            Operation::GetHandle => "getHandle",
            Operation::ReadOwner => "readOwner",
            Operation::ReadMessage => "readMessage",
            Operation::ReadBalance => "readBalance",
            Operation::WriteMessage => "writeMessage",
            Operation::SendDeposit => "sendDeposit",
            Operation::SendWithdraw => "sendWithdraw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No wallet extension detected
    ProviderUnavailable,
    /// Connection or transaction denied by the user
    UserRejected,
    /// No account authorized yet
    NotConnected,
    /// Wrong chain, or the wallet could not switch to the target one
    NetworkMismatch,
    /// The RPC round trip itself failed
    Transport,
    /// Contract business rule violated
    Revert,
    /// Local input could not be turned into a call
    InvalidInput,
    /// Provider answered with something that does not decode
    Decode,
}

impl ErrorKind {
    pub fn of_provider_error(err: &ProviderError) -> Self {
        match err.code {
            codes::USER_REJECTED => ErrorKind::UserRejected,
            codes::EXECUTION_REVERTED => ErrorKind::Revert,
            codes::UNRECOGNIZED_CHAIN => ErrorKind::NetworkMismatch,
            _ if err.message.contains("execution reverted") => ErrorKind::Revert,
            _ => ErrorKind::Transport,
        }
    }
}

/// Uniform failure shape surfaced by every chain client operation
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{operation} failed: {message}")]
pub struct ClientError {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(operation: Operation, kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".to_string();
        }
        Self {
            operation,
            kind,
            message,
        }
    }

    pub fn provider_unavailable(operation: Operation) -> Self {
        Self::new(
            operation,
            ErrorKind::ProviderUnavailable,
            "wallet provider not available",
        )
    }

    pub fn from_provider(operation: Operation, err: ProviderError) -> Self {
        let kind = ErrorKind::of_provider_error(&err);
        Self::new(operation, kind, err.message)
    }

    pub fn from_call(operation: Operation, err: CallError) -> Self {
        match err {
            CallError::Provider(err) => Self::from_provider(operation, err),
            CallError::Abi(message) => Self::new(operation, ErrorKind::Decode, message),
            CallError::NoSigner => Self::new(operation, ErrorKind::UserRejected, err.to_string()),
            CallError::Reverted(_) => Self::new(operation, ErrorKind::Revert, err.to_string()),
            CallError::Timeout(_) => Self::new(operation, ErrorKind::Transport, err.to_string()),
        }
    }
}
