//! Executable model of the MessageVault contract (`contracts/MessageVault.sol`).
//!
//! The vault holds one owner fixed at deployment, a single message string
//! that anybody may overwrite, and a native balance that only grows through
//! `deposit` and is emptied in one piece by the owner through `withdraw`.

use ethers_core::abi::{self, Abi, StateMutability, Token};
use ethers_core::types::{Address, U256};
use std::fmt;

/// Reason a contract call reverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    NotOwner,
    EmptyBalance,
    NotPayable,
    Overflow,
    UnknownFunction([u8; 4]),
    BadCalldata(String),
}

impl Revert {
    pub fn reason(&self) -> String {
        match self {
            Revert::NotOwner => "Only the owner can withdraw".to_string(),
            Revert::EmptyBalance => "No funds to withdraw".to_string(),
            Revert::NotPayable => "Function is not payable".to_string(),
            Revert::Overflow => "Arithmetic overflow".to_string(),
            Revert::UnknownFunction(selector) => format!(
                "Unknown function selector 0x{:02x}{:02x}{:02x}{:02x}",
                selector[0], selector[1], selector[2], selector[3]
            ),
            Revert::BadCalldata(e) => format!("Malformed calldata: {}", e),
        }
    }
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

/// A message call into the vault
#[derive(Debug, Clone)]
pub struct Call<'a> {
    pub caller: Address,
    pub value: U256,
    pub data: &'a [u8],
}

/// Result of a successful call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    /// ABI-encoded return data
    pub output: Vec<u8>,
    /// Native value the vault sent out, and to whom
    pub payout: Option<(Address, U256)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageVault {
    owner: Address,
    message: String,
    balance: U256,
}

impl MessageVault {
    /// Deploys a vault owned by `deployer`
    pub fn deploy(deployer: Address) -> Self {
        Self {
            owner: deployer,
            message: String::new(),
            balance: U256::zero(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn store_message(&mut self, message: String) {
        self.message = message;
    }

    pub fn get_message(&self) -> &str {
        &self.message
    }

    /// Credits `value` to the vault. Reverts instead of wrapping when the
    /// balance would exceed `uint256`.
    pub fn deposit(&mut self, value: U256) -> Result<(), Revert> {
        self.balance = self.balance.checked_add(value).ok_or(Revert::Overflow)?;
        Ok(())
    }

    /// Empties the vault into the owner's account. Returns the amount paid.
    pub fn withdraw(&mut self, caller: Address) -> Result<U256, Revert> {
        if caller != self.owner {
            return Err(Revert::NotOwner);
        }
        if self.balance.is_zero() {
            return Err(Revert::EmptyBalance);
        }

        let amount = self.balance;
        self.balance = U256::zero();
        Ok(amount)
    }

    pub fn get_balance(&self) -> U256 {
        self.balance
    }

    /// Dispatches ABI calldata to the matching function.
    ///
    /// State is only modified when the call succeeds; a revert leaves the
    /// vault untouched.
    pub fn execute(&mut self, interface: &Abi, call: &Call) -> Result<Outcome, Revert> {
        if call.data.len() < 4 {
            return Err(Revert::BadCalldata("missing function selector".to_string()));
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&call.data[..4]);

        let function = interface
            .functions()
            .find(|f| f.short_signature() == selector)
            .ok_or(Revert::UnknownFunction(selector))?;

        if !call.value.is_zero() && !matches!(function.state_mutability, StateMutability::Payable)
        {
            return Err(Revert::NotPayable);
        }

        let args = function
            .decode_input(&call.data[4..])
            .map_err(|e| Revert::BadCalldata(e.to_string()))?;

        let mut outcome = Outcome::default();
        match function.name.as_str() {
            "owner" => outcome.output = abi::encode(&[Token::Address(self.owner)]),
            "getMessage" => outcome.output = abi::encode(&[Token::String(self.message.clone())]),
            "getBalance" => outcome.output = abi::encode(&[Token::Uint(self.balance)]),
            "storeMessage" => match args.into_iter().next() {
                Some(Token::String(message)) => self.store_message(message),
                _ => return Err(Revert::BadCalldata("expected a string".to_string())),
            },
            "deposit" => self.deposit(call.value)?,
            "withdraw" => {
                let amount = self.withdraw(call.caller)?;
                outcome.payout = Some((self.owner, amount));
            }
            _ => return Err(Revert::UnknownFunction(selector)),
        }

        Ok(outcome)
    }
}
