//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the signing setup and RPC client from configuration
//! - Load the Session creation code for product deployment
//! - Spawn the controller, and the account watcher on request

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::blockchain::artifact;
use crate::blockchain::{ChainClient, ChainError, ChainResult, ContractGateway, PricingContracts, Wallet};
use crate::config::AppConfig;
use crate::controller::{AccountWatcher, Controller, ControllerHandle, ControllerSettings};
use crate::lifecycle::shutdown::Shutdown;
use crate::state::AppState;

/// A running controller over some gateway.
pub struct App<G> {
    gateway: Arc<G>,
    handle: ControllerHandle,
    state: watch::Receiver<AppState>,
    shutdown: Shutdown,
    controller: JoinHandle<()>,
    account_poll: Duration,
}

impl<G: ContractGateway> App<G> {
    /// Spawn the controller over `gateway`.
    pub fn start(gateway: Arc<G>, config: &AppConfig) -> Self {
        let shutdown = Shutdown::new();
        let (handle, state, controller) = Controller::spawn(
            Arc::clone(&gateway),
            ControllerSettings::from(&config.listing),
            shutdown.subscribe(),
        );

        Self {
            gateway,
            handle,
            state,
            shutdown,
            controller,
            account_poll: Duration::from_secs(config.provider.account_poll_secs),
        }
    }

    pub fn handle(&self) -> &ControllerHandle {
        &self.handle
    }

    /// A fresh receiver of published states.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.clone()
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Start polling for account changes until shutdown.
    pub fn watch_accounts(&self) -> JoinHandle<()> {
        let watcher = AccountWatcher::new(
            Arc::clone(&self.gateway),
            self.handle.clone(),
            self.state.clone(),
            self.account_poll,
        );
        tokio::spawn(watcher.run(self.shutdown.subscribe()))
    }

    /// Trigger shutdown and wait for the controller to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.controller.await {
            tracing::error!(error = %e, "Controller task failed");
        }
        tracing::info!("Shutdown complete");
    }
}

/// Connect to the configured node and start the controller.
pub async fn launch(config: &AppConfig) -> ChainResult<App<PricingContracts>> {
    let wallet = Wallet::from_env(config.provider.chain_id)?;
    let client = ChainClient::new(config.provider.clone(), wallet).await?;

    let main_address: Address = config
        .contracts
        .main_address
        .parse()
        .map_err(|_| ChainError::InvalidAddress(config.contracts.main_address.clone()))?;

    let session_bytecode = match artifact::load_bytecode(Path::new(&config.contracts.session_artifact)) {
        Ok(bytecode) => Some(bytecode),
        Err(e) => {
            tracing::warn!(
                artifact = %config.contracts.session_artifact,
                error = %e,
                "Session artifact unavailable, product creation disabled"
            );
            None
        }
    };

    tracing::info!(main = %main_address, rpc_url = %config.provider.rpc_url, "Contracts configured");
    let contracts = PricingContracts::new(client, main_address, session_bytecode);
    Ok(App::start(Arc::new(contracts), config))
}
