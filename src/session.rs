//! Volatile UI session and the transition function that drives it.
//!
//! Every change to a [`Session`] goes through [`transition`], so the rules
//! that invalidate derived fields (owner flag, cached balance) live in one
//! place.

use ethers::types::{Address, U256};
use ethers::utils::format_ether;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn idle(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Idle,
            text: text.into(),
        }
    }

    pub fn loading(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// User-triggered actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    SwitchNetwork,
    StoreMessage,
    FetchMessage,
    Deposit,
    Withdraw,
    Refresh,
}

impl Action {
    fn progress(&self) -> &'static str {
        match self {
            Action::Connect => "Connecting wallet...",
            Action::SwitchNetwork => "Switching network...",
            Action::StoreMessage => "Storing message...",
            Action::FetchMessage => "Fetching message...",
            Action::Deposit => "Sending deposit...",
            Action::Withdraw => "Withdrawing funds...",
            Action::Refresh => "Refreshing...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub on_target_network: bool,
    /// Advisory: the contract decides who may withdraw
    pub is_owner: bool,
    /// Last message read from the contract
    pub message: Option<String>,
    pub message_input: String,
    pub deposit_input: String,
    pub balance: Option<U256>,
    pub status: Status,
    pub busy: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            account: None,
            on_target_network: false,
            is_owner: false,
            message: None,
            message_input: String::new(),
            deposit_input: String::new(),
            balance: None,
            status: Status::idle("Not connected"),
            busy: false,
        }
    }
}

impl Session {
    /// Connected on the target chain, so contract reads make sense
    pub fn is_ready(&self) -> bool {
        self.account.is_some() && self.on_target_network
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ActionStarted(Action),
    ActionFailed(String),
    /// Always the last event of an action, whatever its outcome
    ActionFinished,
    Connected {
        account: Address,
        on_target_network: bool,
        network_name: String,
    },
    NetworkSwitched,
    MessageInputChanged(String),
    DepositInputChanged(String),
    MessageStored,
    MessageFetched(String),
    Deposited(U256),
    Withdrawn,
    Refreshed,
    OwnerResolved(Address),
    BalanceLoaded(U256),
    AccountChanged(Option<Address>),
    NetworkChanged {
        on_target_network: bool,
        network_name: String,
    },
}

/// Shortened `0xabcd...1234` form of an address
pub fn short_address(address: &Address) -> String {
    let full = format!("{:?}", address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

fn switch_prompt(network_name: &str) -> Status {
    Status::idle(format!("Wrong network: switch to {} to continue", network_name))
}

/// Computes the session that follows `event`
pub fn transition(previous: &Session, event: SessionEvent) -> Session {
    let mut next = previous.clone();

    match event {
        SessionEvent::ActionStarted(action) => {
            next.busy = true;
            next.status = Status::loading(action.progress());
        }
        SessionEvent::ActionFailed(message) => {
            next.status = Status::error(message);
        }
        SessionEvent::ActionFinished => {
            next.busy = false;
        }
        SessionEvent::Connected {
            account,
            on_target_network,
            network_name,
        } => {
            if next.account != Some(account) {
                next.is_owner = false;
                next.balance = None;
            }
            next.account = Some(account);
            next.on_target_network = on_target_network;
            next.status = if on_target_network {
                Status::success(format!("Connected {}", short_address(&account)))
            } else {
                switch_prompt(&network_name)
            };
        }
        SessionEvent::NetworkSwitched => {
            next.on_target_network = true;
            next.status = Status::success("Network switched");
        }
        SessionEvent::MessageInputChanged(text) => next.message_input = text,
        SessionEvent::DepositInputChanged(text) => next.deposit_input = text,
        SessionEvent::MessageStored => {
            next.message_input.clear();
            next.status = Status::success("Message stored");
        }
        SessionEvent::MessageFetched(message) => {
            next.status = Status::success("Message fetched");
            next.message = Some(message);
        }
        SessionEvent::Deposited(amount) => {
            next.deposit_input.clear();
            next.status = Status::success(format!("Deposited {} ETH", format_ether(amount)));
        }
        SessionEvent::Withdrawn => {
            next.status = Status::success("Funds withdrawn");
        }
        SessionEvent::Refreshed => {
            next.status = Status::success("Refreshed");
        }
        SessionEvent::OwnerResolved(owner) => {
            next.is_owner = next.account == Some(owner);
        }
        SessionEvent::BalanceLoaded(balance) => {
            next.balance = Some(balance);
        }
        SessionEvent::AccountChanged(account) => {
            next.account = account;
            next.is_owner = false;
            next.balance = None;
            if account.is_none() {
                next.message = None;
                next.status = Status::idle("Not connected");
            }
        }
        SessionEvent::NetworkChanged {
            on_target_network,
            network_name,
        } => {
            next.on_target_network = on_target_network;
            next.is_owner = false;
            next.balance = None;
            if !on_target_network && next.account.is_some() {
                next.status = switch_prompt(&network_name);
            }
        }
    }

    next
}

/// Interactive controls the view may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Connect,
    SwitchNetwork,
    StoreMessage,
    FetchMessage,
    Deposit,
    Withdraw,
}

/// What the user sees for a given session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub header: String,
    pub network_prompt: Option<String>,
    /// `Some` when the balance section is visible
    pub balance: Option<String>,
    /// `Some` when the message section is visible
    pub message: Option<String>,
    pub controls: Vec<Control>,
    /// Controls are shown but inert while an action runs
    pub controls_enabled: bool,
    pub status: Status,
}

impl View {
    pub fn of(session: &Session, network_name: &str) -> Self {
        let mut controls = Vec::new();
        let header = match session.account {
            Some(account) => format!("Connected: {}", short_address(&account)),
            None => {
                controls.push(Control::Connect);
                "Not connected".to_string()
            }
        };

        let network_prompt = if session.account.is_some() && !session.on_target_network {
            controls.push(Control::SwitchNetwork);
            Some(format!("Please switch to {}", network_name))
        } else {
            None
        };

        let (balance, message) = if session.is_ready() {
            controls.extend([Control::StoreMessage, Control::FetchMessage, Control::Deposit]);
            if session.is_owner {
                controls.push(Control::Withdraw);
            }
            (
                Some(match session.balance {
                    Some(balance) => format!("{} ETH", format_ether(balance)),
                    None => "unknown".to_string(),
                }),
                Some(session.message.clone().unwrap_or_default()),
            )
        } else {
            (None, None)
        };

        Self {
            header,
            network_prompt,
            balance,
            message,
            controls,
            controls_enabled: !session.busy,
            status: session.status.clone(),
        }
    }

    pub fn offers(&self, control: Control) -> bool {
        self.controls.contains(&control)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        if let Some(prompt) = &self.network_prompt {
            writeln!(f, "  ! {}", prompt)?;
        }
        if let Some(balance) = &self.balance {
            writeln!(f, "  balance: {}", balance)?;
        }
        if let Some(message) = &self.message {
            writeln!(f, "  message: {:?}", message)?;
        }
        if !self.controls.is_empty() {
            let names: Vec<_> = self.controls.iter().map(|c| format!("{:?}", c)).collect();
            let state = if self.controls_enabled { "" } else { " (busy)" };
            writeln!(f, "  actions: {}{}", names.join(", "), state)?;
        }
        write!(f, "  [{:?}] {}", self.status.kind, self.status.text)
    }
}
