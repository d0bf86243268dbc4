use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::blockchain::{ChainError, ContractGateway, SessionCall, Transaction, TxOutcome};
use crate::config::ListingConfig;
use crate::controller::command::{Command, Reply};
use crate::controller::error::{AppError, AppResult};
use crate::controller::handle::ControllerHandle;
use crate::controller::listing::{self, Viewer};
use crate::observability::metrics;
use crate::session::{dispatch_session, submit_checked, FollowUp};
use crate::state::{AppReducer, AppState, Intent, Notice};

/// Commands waiting beyond this many apply backpressure to callers.
const COMMAND_QUEUE_DEPTH: usize = 32;

/// Tunables the controller reads from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub max_concurrent_reads: usize,
}

impl From<&ListingConfig> for ControllerSettings {
    fn from(config: &ListingConfig) -> Self {
        Self {
            max_concurrent_reads: config.max_concurrent_reads,
        }
    }
}

/// Sole owner of [`AppState`].
///
/// Commands are taken off the queue one at a time and run to completion, so
/// the results of two workflows are never merged out of order.
pub struct Controller<G> {
    gateway: Arc<G>,
    settings: ControllerSettings,
    state: AppState,
    publisher: watch::Sender<AppState>,
}

impl<G: ContractGateway> Controller<G> {
    /// Start the controller task.
    ///
    /// The task ends on shutdown or once every handle has been dropped.
    pub fn spawn(
        gateway: Arc<G>,
        settings: ControllerSettings,
        shutdown: broadcast::Receiver<()>,
    ) -> (ControllerHandle, watch::Receiver<AppState>, JoinHandle<()>) {
        let (sender, commands) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (publisher, state) = watch::channel(AppState::default());

        let controller = Self {
            gateway,
            settings,
            state: AppState::default(),
            publisher,
        };
        let task = tokio::spawn(controller.run(commands, shutdown));

        (ControllerHandle::new(sender), state, task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!("Controller started");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => {
                        tracing::debug!("All controller handles dropped");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Controller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn handle(&mut self, command: Command) {
        let name = command.name();
        metrics::record_command(name);
        tracing::debug!(command = name, "Handling command");

        match command {
            Command::Bootstrap { respond_to } => {
                let result = self.bootstrap().await;
                reply(name, respond_to, result);
            }
            Command::RefreshParticipants { respond_to } => {
                let result = self.refresh_participants().await;
                reply(name, respond_to, result);
            }
            Command::RefreshProducts { respond_to } => {
                let result = self.refresh_products().await;
                reply(name, respond_to, result);
            }
            Command::EditProfile {
                field,
                value,
                respond_to,
            } => {
                self.apply(Intent::InputProfile { field, value });
                reply(name, respond_to, Ok(()));
            }
            Command::EditNewProduct {
                field,
                value,
                respond_to,
            } => {
                self.apply(Intent::InputNewProduct { field, value });
                reply(name, respond_to, Ok(()));
            }
            Command::SelectProduct { index, respond_to } => {
                let result = self.select_product(index);
                reply(name, respond_to, result);
            }
            Command::Navigate { route, respond_to } => {
                self.apply(Intent::Navigate(route));
                reply(name, respond_to, Ok(()));
            }
            Command::Register { respond_to } => {
                self.apply(Intent::ClearNotice);
                let result = self.register().await;
                self.reject_on_error(&result);
                reply(name, respond_to, result);
            }
            Command::CreateProduct { respond_to } => {
                self.apply(Intent::ClearNotice);
                let result = self.create_product().await;
                self.reject_on_error(&result);
                reply(name, respond_to, result);
            }
            Command::Session { call, respond_to } => {
                self.apply(Intent::ClearNotice);
                let result = self.session_action(call).await;
                self.reject_on_error(&result);
                reply(name, respond_to, result);
            }
            Command::AccountsChanged { respond_to } => {
                let result = self.accounts_changed().await;
                reply(name, respond_to, result);
            }
            Command::Snapshot { respond_to } => {
                if respond_to.send(self.state.clone()).is_err() {
                    tracing::debug!(command = name, "Caller went away before the reply");
                }
            }
        }
    }

    /// Run one reducer step and publish the result.
    fn apply(&mut self, intent: Intent) {
        let state = std::mem::take(&mut self.state);
        self.state = AppReducer::reduce(state, intent);
        self.publisher.send_replace(self.state.clone());
    }

    /// Turn a failed user action into a rejection banner.
    fn reject_on_error<T>(&mut self, result: &AppResult<T>) {
        if let Err(e) = result {
            self.apply(Intent::Notify(Notice::Rejected(e.notice_message())));
        }
    }

    /// Report a mined transaction.
    ///
    /// The transaction stands even when the follow-up reads fail; the lists
    /// are then left as they were and the notice says so.
    fn confirm_mined(&mut self, tx_hash: TxHash, message: Option<String>, refreshed: AppResult<()>) {
        let message = match refreshed {
            Ok(()) => message,
            Err(e) => {
                tracing::warn!(%tx_hash, error = %e, "Refresh after mined transaction failed");
                let done = message.unwrap_or_else(|| format!("Transaction {} mined", tx_hash));
                Some(format!("{} (view may be out of date: {})", done, e.notice_message()))
            }
        };
        if let Some(message) = message {
            self.apply(Intent::Notify(Notice::Success(message)));
        }
    }

    fn viewer(&self) -> AppResult<Viewer> {
        let account = self.state.account.ok_or(AppError::NoAccount)?;
        Ok(Viewer {
            account,
            is_admin: self.state.is_admin,
        })
    }

    /// Accounts, then balance, admin and own record for the primary one.
    async fn load_account(&mut self) -> AppResult<Address> {
        let gateway = Arc::clone(&self.gateway);
        let account = gateway
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NoAccount)?;

        let (balance, admin, profile) = tokio::try_join!(
            gateway.balance(account),
            gateway.admin(),
            gateway.participant(account),
        )?;
        let is_admin = admin == account;

        tracing::info!(
            %account,
            is_admin,
            registered = profile.is_registered(),
            "Account loaded"
        );
        self.apply(Intent::SetAccount {
            account,
            balance,
            is_admin,
            profile,
        });
        Ok(account)
    }

    async fn refresh_participants(&mut self) -> AppResult<()> {
        let viewer = self.viewer()?;
        let participants =
            listing::fetch_participants(&*self.gateway, viewer, self.settings.max_concurrent_reads).await?;
        self.apply(Intent::SetParticipants(participants));
        Ok(())
    }

    async fn refresh_products(&mut self) -> AppResult<()> {
        let viewer = self.viewer()?;
        let products =
            listing::fetch_products(&*self.gateway, viewer, self.settings.max_concurrent_reads).await?;
        self.apply(Intent::SetProducts(products));
        Ok(())
    }

    /// Account first, then both listings read concurrently and merged in
    /// a fixed order.
    async fn bootstrap(&mut self) -> AppResult<()> {
        self.load_account().await?;
        let viewer = self.viewer()?;
        let width = self.settings.max_concurrent_reads;
        let gateway = Arc::clone(&self.gateway);

        let (participants, products) = tokio::try_join!(
            listing::fetch_participants(&*gateway, viewer, width),
            listing::fetch_products(&*gateway, viewer, width),
        )?;
        self.apply(Intent::SetParticipants(participants));
        self.apply(Intent::SetProducts(products));
        Ok(())
    }

    fn select_product(&mut self, index: usize) -> AppResult<()> {
        let len = self.state.products.len();
        if index >= len {
            return Err(AppError::NoSuchProduct { index, len });
        }
        self.apply(Intent::SelectProduct(index));
        Ok(())
    }

    async fn register(&mut self) -> AppResult<TxOutcome> {
        let viewer = self.viewer()?;
        let draft = self.state.profile.clone().unwrap_or_default();
        let message = format!("Registered as {}", draft.fullname);
        let gateway = Arc::clone(&self.gateway);

        let outcome = submit_checked(
            &*gateway,
            viewer.account,
            Transaction::Register {
                fullname: draft.fullname,
                email: draft.email,
            },
        )
        .await?;

        let refreshed = self.reload_profile(viewer.account).await;
        self.confirm_mined(outcome.tx_hash, Some(message), refreshed);
        Ok(outcome)
    }

    async fn reload_profile(&mut self, account: Address) -> AppResult<()> {
        let profile = self.gateway.participant(account).await?;
        self.apply(Intent::SetProfile(profile));
        self.refresh_participants().await
    }

    async fn create_product(&mut self) -> AppResult<Address> {
        let viewer = self.viewer()?;
        let meta = self.state.new_product.clone();
        let name = meta.name.clone();
        let gateway = Arc::clone(&self.gateway);

        let outcome = submit_checked(&*gateway, viewer.account, Transaction::DeploySession(meta)).await?;
        let address = outcome
            .contract_address
            .ok_or(ChainError::MissingContractAddress(outcome.tx_hash))?;
        tracing::info!(session = %address, name = %name, "Product created");

        let refreshed = self.refresh_products().await;
        self.confirm_mined(outcome.tx_hash, Some(format!("Product {} created", name)), refreshed);
        Ok(address)
    }

    async fn session_action(&mut self, call: SessionCall) -> AppResult<TxOutcome> {
        let viewer = self.viewer()?;
        let product = self.state.current_product().ok_or(AppError::NoSuchProduct {
            index: self.state.current_product,
            len: self.state.products.len(),
        })?;
        let session = product.address;
        let name = product.meta.name.clone();
        let gateway = Arc::clone(&self.gateway);

        let dispatched = dispatch_session(&*gateway, viewer.account, session, call).await?;
        tracing::info!(
            %session,
            action = call.name(),
            from_status = %dispatched.previous,
            "Session action applied"
        );

        let (message, refreshed) = match FollowUp::for_call(&call) {
            FollowUp::RefreshProducts => (None, self.refresh_products().await),
            FollowUp::ConfirmPrice => (Some(format!("Price submitted for {}", name)), Ok(())),
            FollowUp::RefreshProductsAndParticipants => {
                let products = self.refresh_products().await;
                let participants = self.refresh_participants().await;
                (None, products.and(participants))
            }
        };
        self.confirm_mined(dispatched.outcome.tx_hash, message, refreshed);
        Ok(dispatched.outcome)
    }

    async fn accounts_changed(&mut self) -> AppResult<()> {
        tracing::info!(previous = ?self.state.account, "Account changed, reloading");
        self.apply(Intent::Reset);
        self.bootstrap().await
    }
}

fn reply<T>(command: &'static str, respond_to: Reply<T>, result: AppResult<T>) {
    if let Err(e) = &result {
        tracing::warn!(command, error = %e, "Command failed");
    }
    if respond_to.send(result).is_err() {
        tracing::debug!(command, "Caller went away before the reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::faulty::FaultyChain;
    use crate::blockchain::{SessionMeta, SessionStatus, SimulatedChain};
    use crate::state::{ProductField, ProfileField, Route};
    use alloy::primitives::U256;

    struct Fixture<G = SimulatedChain> {
        chain: Arc<G>,
        handle: ControllerHandle,
        state: watch::Receiver<AppState>,
        _shutdown: broadcast::Sender<()>,
    }

    fn start<G: ContractGateway>(chain: G) -> Fixture<G> {
        let chain = Arc::new(chain);
        let (shutdown, receiver) = broadcast::channel(1);
        let (handle, state, _task) = Controller::spawn(
            Arc::clone(&chain),
            ControllerSettings {
                max_concurrent_reads: 4,
            },
            receiver,
        );
        Fixture {
            chain,
            handle,
            state,
            _shutdown: shutdown,
        }
    }

    fn deploy_started(chain: &SimulatedChain, name: &str) -> Address {
        let session = chain
            .seed(
                Address::with_last_byte(1),
                Transaction::DeploySession(SessionMeta {
                    name: name.to_string(),
                    ..Default::default()
                }),
            )
            .unwrap()
            .unwrap();
        chain
            .seed(
                Address::with_last_byte(1),
                Transaction::Session {
                    session,
                    call: SessionCall::Start,
                },
            )
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_bootstrap_loads_admin() {
        let fixture = start(SimulatedChain::with_accounts(2));
        fixture.handle.bootstrap().await.unwrap();

        let state = fixture.handle.snapshot().await.unwrap();
        assert_eq!(state.account, Some(Address::with_last_byte(1)));
        assert!(state.is_admin);
        assert_eq!(state.balance, U256::from(100_000_000_000_000_000_000u128));
        assert!(!state.is_registered());
        assert_eq!(*fixture.state.borrow(), state);
    }

    #[tokio::test]
    async fn test_commands_before_bootstrap_need_account() {
        let fixture = start(SimulatedChain::with_accounts(1));
        assert_eq!(fixture.handle.refresh_products().await, Err(AppError::NoAccount));
    }

    #[tokio::test]
    async fn test_empty_account_list() {
        let fixture = start(SimulatedChain::new(Vec::new()));
        assert_eq!(fixture.handle.bootstrap().await, Err(AppError::NoAccount));
    }

    #[tokio::test]
    async fn test_register_flow() {
        let chain = SimulatedChain::with_accounts(2);
        chain.switch_account(Address::with_last_byte(2));
        let fixture = start(chain);
        fixture.handle.bootstrap().await.unwrap();

        fixture
            .handle
            .edit_profile(ProfileField::Fullname, "user2")
            .await
            .unwrap();
        fixture
            .handle
            .edit_profile(ProfileField::Email, "user2@test.com")
            .await
            .unwrap();
        fixture.handle.register().await.unwrap();

        let state = fixture.handle.snapshot().await.unwrap();
        assert!(state.is_registered());
        assert_eq!(state.participants.len(), 1);
        assert_eq!(state.participants[0].email, "user2@test.com");
        assert_eq!(state.notice, Some(Notice::Success("Registered as user2".to_string())));
    }

    #[tokio::test]
    async fn test_duplicate_registration_sets_rejection() {
        let chain = SimulatedChain::with_accounts(2);
        chain.switch_account(Address::with_last_byte(2));
        chain
            .seed(
                Address::with_last_byte(2),
                Transaction::Register {
                    fullname: "user2".to_string(),
                    email: "user2@test.com".to_string(),
                },
            )
            .unwrap();
        let fixture = start(chain);
        fixture.handle.bootstrap().await.unwrap();

        let err = fixture.handle.register().await.unwrap_err();
        assert!(matches!(err, AppError::Chain(ChainError::Reverted { .. })));

        let state = fixture.handle.snapshot().await.unwrap();
        assert_eq!(
            state.notice,
            Some(Notice::Rejected("Participant already registered".to_string()))
        );
        assert_eq!(fixture.chain.submitted_transactions(), 0);
    }

    #[tokio::test]
    async fn test_create_product_flow() {
        let fixture = start(SimulatedChain::with_accounts(1));
        fixture.handle.bootstrap().await.unwrap();
        fixture
            .handle
            .edit_new_product(ProductField::Name, "Tablet")
            .await
            .unwrap();
        fixture
            .handle
            .edit_new_product(ProductField::Image, "ipfs://tablet")
            .await
            .unwrap();

        let address = fixture.handle.create_product().await.unwrap();

        let state = fixture.handle.snapshot().await.unwrap();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.products[0].address, address);
        assert_eq!(state.products[0].status, SessionStatus::Idle);
        assert_eq!(state.products[0].meta.image, "ipfs://tablet");
        assert_eq!(state.new_product.name, "Tablet");
    }

    #[tokio::test]
    async fn test_select_out_of_range_rejected() {
        let fixture = start(SimulatedChain::with_accounts(1));
        fixture.handle.bootstrap().await.unwrap();
        assert_eq!(
            fixture.handle.select_product(0).await,
            Err(AppError::NoSuchProduct { index: 0, len: 0 })
        );
    }

    #[tokio::test]
    async fn test_session_action_without_products() {
        let fixture = start(SimulatedChain::with_accounts(1));
        fixture.handle.bootstrap().await.unwrap();
        let err = fixture.handle.session_action(SessionCall::Start).await.unwrap_err();
        assert_eq!(err, AppError::NoSuchProduct { index: 0, len: 0 });

        let state = fixture.handle.snapshot().await.unwrap();
        assert!(matches!(state.notice, Some(Notice::Rejected(_))));
    }

    #[tokio::test]
    async fn test_pricing_confirms_with_notice() {
        let chain = SimulatedChain::with_accounts(2);
        let session = deploy_started(&chain, "Tablet");
        chain
            .seed(
                Address::with_last_byte(2),
                Transaction::Register {
                    fullname: "user2".to_string(),
                    email: "user2@test.com".to_string(),
                },
            )
            .unwrap();
        chain.switch_account(Address::with_last_byte(2));
        let fixture = start(chain);
        fixture.handle.bootstrap().await.unwrap();
        fixture.handle.select_product(0).await.unwrap();

        fixture
            .handle
            .session_action(SessionCall::Pricing(U256::from(424)))
            .await
            .unwrap();

        let state = fixture.handle.snapshot().await.unwrap();
        assert_eq!(
            state.notice,
            Some(Notice::Success("Price submitted for Tablet".to_string()))
        );
        assert_eq!(fixture.chain.submitted_transactions(), 1);
        assert_eq!(
            fixture.chain.session_figures(session, Address::with_last_byte(2)).await.unwrap().proposed_price,
            U256::from(424)
        );
    }

    #[tokio::test]
    async fn test_close_stands_when_refresh_fails() {
        let chain = SimulatedChain::with_accounts(2);
        let session = deploy_started(&chain, "Tablet");
        let fixture = start(FaultyChain::new(chain).fail_reads_after_submit());
        fixture.handle.bootstrap().await.unwrap();
        fixture.handle.select_product(0).await.unwrap();

        let outcome = fixture
            .handle
            .session_action(SessionCall::Close(U256::from(500)))
            .await;
        assert!(outcome.is_ok());

        let inner = &fixture.chain.inner;
        assert_eq!(inner.submitted_transactions(), 1);
        assert_eq!(inner.session_status(session).await.unwrap(), SessionStatus::Closed);

        let state = fixture.handle.snapshot().await.unwrap();
        match state.notice {
            Some(Notice::Success(message)) => assert!(message.contains("out of date"), "{}", message),
            other => panic!("expected a success notice, got {:?}", other),
        }
        // Lists keep their pre-close contents.
        assert_eq!(state.products[0].status, SessionStatus::Pricing);
    }

    #[tokio::test]
    async fn test_registration_stands_when_reload_fails() {
        let chain = SimulatedChain::with_accounts(2);
        chain.switch_account(Address::with_last_byte(2));
        let fixture = start(FaultyChain::new(chain).fail_reads_after_submit());
        fixture.handle.bootstrap().await.unwrap();
        fixture
            .handle
            .edit_profile(ProfileField::Fullname, "user2")
            .await
            .unwrap();

        fixture.handle.register().await.unwrap();

        let state = fixture.handle.snapshot().await.unwrap();
        assert!(matches!(
            state.notice,
            Some(Notice::Success(ref m)) if m.starts_with("Registered as user2 (view may be out of date")
        ));
        assert_eq!(fixture.chain.inner.participant_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_navigation_survives_account_change() {
        let fixture = start(SimulatedChain::with_accounts(2));
        fixture.handle.bootstrap().await.unwrap();
        fixture.handle.navigate(Route::Participants).await.unwrap();

        fixture.chain.switch_account(Address::with_last_byte(2));
        fixture.handle.accounts_changed().await.unwrap();

        let state = fixture.handle.snapshot().await.unwrap();
        assert_eq!(state.route, Route::Participants);
        assert_eq!(state.account, Some(Address::with_last_byte(2)));
        assert!(!state.is_admin);
    }

    #[tokio::test]
    async fn test_shutdown_stops_controller() {
        let chain = Arc::new(SimulatedChain::with_accounts(1));
        let (shutdown, receiver) = broadcast::channel(1);
        let (handle, _state, task) = Controller::spawn(
            chain,
            ControllerSettings {
                max_concurrent_reads: 1,
            },
            receiver,
        );

        shutdown.send(()).unwrap();
        task.await.unwrap();
        assert_eq!(handle.bootstrap().await, Err(AppError::Disconnected));
    }
}
