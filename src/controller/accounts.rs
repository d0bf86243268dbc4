//! Account change detection.
//!
//! # Responsibilities
//! - Periodically read the provider's account list
//! - Compare the primary account with the one in state
//! - Ask the controller for a full reload when they differ

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time;

use crate::blockchain::ContractGateway;
use crate::controller::error::AppResult;
use crate::controller::handle::ControllerHandle;
use crate::state::AppState;

pub struct AccountWatcher<G> {
    gateway: Arc<G>,
    controller: ControllerHandle,
    state: watch::Receiver<AppState>,
    interval: Duration,
}

impl<G: ContractGateway> AccountWatcher<G> {
    pub fn new(
        gateway: Arc<G>,
        controller: ControllerHandle,
        state: watch::Receiver<AppState>,
        interval: Duration,
    ) -> Self {
        Self {
            gateway,
            controller,
            state,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Account watcher starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!(error = %e, "Reload after account change failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Account watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Check the account list once; returns whether a reload was issued.
    pub async fn poll_once(&self) -> AppResult<bool> {
        let primary = match self.gateway.accounts().await {
            Ok(accounts) => accounts.first().copied(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read accounts");
                return Ok(false);
            }
        };

        let current = self.state.borrow().account;
        match primary {
            Some(account) if Some(account) != current => {
                tracing::info!(%account, previous = ?current, "Primary account changed");
                self.controller.accounts_changed().await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
