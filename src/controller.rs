use super::client::{ChainClient, ChainEvent};
use super::error::{ClientError, ErrorKind, Operation};
use super::provider::WalletProvider;
use super::session::{transition, Action, Session, SessionEvent, View};
use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use log::{debug, error, info};

/// Drives the session from user actions and wallet push events.
///
/// Every action marks the session busy, runs its chain calls, records the
/// outcome as status and always clears busy again. Failures never escape:
/// they end up as status text.
pub struct Controller<P> {
    client: ChainClient<P>,
    session: Session,
}

impl<P: WalletProvider> Controller<P> {
    pub fn new(client: ChainClient<P>) -> Self {
        Self {
            client,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &ChainClient<P> {
        &self.client
    }

    pub fn view(&self) -> View {
        View::of(&self.session, &self.client.target_chain().name)
    }

    fn apply(&mut self, event: SessionEvent) {
        debug!("(controller) {:?}", event);
        self.session = transition(&self.session, event);
    }

    fn begin(&mut self, action: Action) {
        self.apply(SessionEvent::ActionStarted(action));
    }

    fn finish(&mut self, action: Action, result: Result<(), ClientError>) {
        if let Err(e) = result {
            error!("(controller) {:?} failed: {}", action, e);
            self.apply(SessionEvent::ActionFailed(e.to_string()));
        }
        self.apply(SessionEvent::ActionFinished);
    }

    /// Contract actions only run once connected on the target chain
    fn ensure_ready(&self, operation: Operation) -> Result<(), ClientError> {
        if self.session.account.is_none() {
            return Err(ClientError::new(
                operation,
                ErrorKind::NotConnected,
                "wallet not connected",
            ));
        }
        if !self.session.on_target_network {
            return Err(ClientError::new(
                operation,
                ErrorKind::NetworkMismatch,
                format!("wrong network: switch to {}", self.client.target_chain().name),
            ));
        }
        Ok(())
    }

    pub fn set_message_input(&mut self, text: impl Into<String>) {
        self.apply(SessionEvent::MessageInputChanged(text.into()));
    }

    pub fn set_deposit_input(&mut self, text: impl Into<String>) {
        self.apply(SessionEvent::DepositInputChanged(text.into()));
    }

    /// Picks up an account the wallet already authorized, without prompting
    pub async fn mount(&mut self) {
        if !self.client.is_provider_available() {
            self.apply(SessionEvent::ActionFailed(
                ClientError::provider_unavailable(Operation::Connect).to_string(),
            ));
            return;
        }

        let result = self.restore().await;
        if let Err(e) = result {
            self.apply(SessionEvent::ActionFailed(e.to_string()));
        }
    }

    async fn restore(&mut self) -> Result<(), ClientError> {
        if let Some(account) = self.client.current_account().await? {
            self.establish(account).await?;
        }
        Ok(())
    }

    async fn establish(&mut self, account: Address) -> Result<(), ClientError> {
        let on_target_network = self.client.check_network().await?;
        self.apply(SessionEvent::Connected {
            account,
            on_target_network,
            network_name: self.client.target_chain().name.clone(),
        });
        self.refresh_derived().await
    }

    /// Re-reads owner and balance for the current account. A no-op unless
    /// connected on the target chain.
    async fn refresh_derived(&mut self) -> Result<(), ClientError> {
        if !self.session.is_ready() {
            return Ok(());
        }

        let owner = self.client.read_owner().await?;
        self.apply(SessionEvent::OwnerResolved(owner));
        let balance = self.client.read_balance().await?;
        self.apply(SessionEvent::BalanceLoaded(balance));
        Ok(())
    }

    pub async fn connect(&mut self) {
        self.begin(Action::Connect);
        let result = self.try_connect().await;
        self.finish(Action::Connect, result);
    }

    async fn try_connect(&mut self) -> Result<(), ClientError> {
        let account = self.client.connect().await?;
        self.establish(account).await
    }

    pub async fn switch_network(&mut self) {
        self.begin(Action::SwitchNetwork);
        let result = self.try_switch_network().await;
        self.finish(Action::SwitchNetwork, result);
    }

    async fn try_switch_network(&mut self) -> Result<(), ClientError> {
        self.client.switch_network().await?;
        if !self.client.check_network().await? {
            return Err(ClientError::new(
                Operation::SwitchNetwork,
                ErrorKind::NetworkMismatch,
                format!("wallet is still not on {}", self.client.target_chain().name),
            ));
        }
        self.apply(SessionEvent::NetworkSwitched);
        self.refresh_derived().await
    }

    /// Stores the current message input
    pub async fn store_message(&mut self) {
        self.begin(Action::StoreMessage);
        let result = self.try_store_message().await;
        self.finish(Action::StoreMessage, result);
    }

    async fn try_store_message(&mut self) -> Result<(), ClientError> {
        self.ensure_ready(Operation::WriteMessage)?;
        let text = self.session.message_input.clone();
        let hash = self.client.write_message(&text).await?;
        info!("(controller) message stored in {:?}", hash);
        self.apply(SessionEvent::MessageStored);
        self.refresh_derived().await
    }

    pub async fn fetch_message(&mut self) {
        self.begin(Action::FetchMessage);
        let result = self.try_fetch_message().await;
        self.finish(Action::FetchMessage, result);
    }

    async fn try_fetch_message(&mut self) -> Result<(), ClientError> {
        self.ensure_ready(Operation::ReadMessage)?;
        let message = self.client.read_message().await?;
        self.apply(SessionEvent::MessageFetched(message));
        Ok(())
    }

    /// Deposits the amount of ETH typed into the deposit input
    pub async fn deposit(&mut self) {
        self.begin(Action::Deposit);
        let result = self.try_deposit().await;
        self.finish(Action::Deposit, result);
    }

    async fn try_deposit(&mut self) -> Result<(), ClientError> {
        self.ensure_ready(Operation::SendDeposit)?;
        let amount = parse_amount(&self.session.deposit_input)?;
        let hash = self.client.send_deposit(amount).await?;
        info!("(controller) deposit sent in {:?}", hash);
        self.apply(SessionEvent::Deposited(amount));
        self.refresh_derived().await
    }

    pub async fn withdraw(&mut self) {
        self.begin(Action::Withdraw);
        let result = self.try_withdraw().await;
        self.finish(Action::Withdraw, result);
    }

    async fn try_withdraw(&mut self) -> Result<(), ClientError> {
        self.ensure_ready(Operation::SendWithdraw)?;
        let hash = self.client.send_withdraw().await?;
        info!("(controller) withdrawal sent in {:?}", hash);
        self.apply(SessionEvent::Withdrawn);
        self.refresh_derived().await
    }

    /// Re-reads owner and balance on demand
    pub async fn refresh(&mut self) {
        self.begin(Action::Refresh);
        let result = self.refresh_derived().await;
        if result.is_ok() {
            self.apply(SessionEvent::Refreshed);
        }
        self.finish(Action::Refresh, result);
    }

    /// Reacts to a wallet push event.
    ///
    /// Not gated by `busy`. Everything derived from the account or network
    /// is recomputed from the event's value, never from earlier state.
    pub async fn handle_chain_event(&mut self, event: ChainEvent) {
        match event {
            ChainEvent::AccountChanged(account) => {
                info!("(controller) account changed to {:?}", account);
                self.apply(SessionEvent::AccountChanged(account));
            }
            ChainEvent::NetworkChanged(on_target_network) => {
                info!("(controller) network changed, on target: {}", on_target_network);
                self.apply(SessionEvent::NetworkChanged {
                    on_target_network,
                    network_name: self.client.target_chain().name.clone(),
                });
            }
        }

        if let Err(e) = self.refresh_derived().await {
            error!("(controller) refresh after {:?} failed: {}", event, e);
            self.apply(SessionEvent::ActionFailed(e.to_string()));
        }
    }
}

/// Parses a positive ETH amount typed by the user
fn parse_amount(input: &str) -> Result<U256, ClientError> {
    let invalid = |reason: &str| {
        ClientError::new(
            Operation::SendDeposit,
            ErrorKind::InvalidInput,
            format!("invalid amount {:?}: {}", input, reason),
        )
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }
    if trimmed.starts_with('-') {
        return Err(invalid("must not be negative"));
    }
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > 18 {
            return Err(invalid("at most 18 decimal places"));
        }
    }
    let amount = parse_ether(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if amount.is_zero() {
        return Err(invalid("must be greater than zero"));
    }
    Ok(amount)
}
