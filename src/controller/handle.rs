use alloy::primitives::Address;
use tokio::sync::{mpsc, oneshot};

use crate::blockchain::{SessionCall, TxOutcome};
use crate::controller::command::Command;
use crate::controller::error::{AppError, AppResult};
use crate::state::{AppState, ProductField, ProfileField, Route};

/// Cheap, cloneable sender side of the controller's command queue.
#[derive(Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<Command>,
}

impl ControllerHandle {
    pub fn new(sender: mpsc::Sender<Command>) -> Self {
        Self { sender }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<AppResult<T>>) -> Command) -> AppResult<T> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| AppError::Disconnected)?;
        receiver.await.map_err(|_| AppError::Disconnected)?
    }

    pub async fn bootstrap(&self) -> AppResult<()> {
        self.request(|respond_to| Command::Bootstrap { respond_to }).await
    }

    pub async fn refresh_participants(&self) -> AppResult<()> {
        self.request(|respond_to| Command::RefreshParticipants { respond_to }).await
    }

    pub async fn refresh_products(&self) -> AppResult<()> {
        self.request(|respond_to| Command::RefreshProducts { respond_to }).await
    }

    pub async fn edit_profile(&self, field: ProfileField, value: impl Into<String>) -> AppResult<()> {
        let value = value.into();
        self.request(|respond_to| Command::EditProfile {
            field,
            value,
            respond_to,
        })
        .await
    }

    pub async fn edit_new_product(&self, field: ProductField, value: impl Into<String>) -> AppResult<()> {
        let value = value.into();
        self.request(|respond_to| Command::EditNewProduct {
            field,
            value,
            respond_to,
        })
        .await
    }

    pub async fn select_product(&self, index: usize) -> AppResult<()> {
        self.request(|respond_to| Command::SelectProduct { index, respond_to })
            .await
    }

    pub async fn navigate(&self, route: Route) -> AppResult<()> {
        self.request(|respond_to| Command::Navigate { route, respond_to }).await
    }

    pub async fn register(&self) -> AppResult<TxOutcome> {
        self.request(|respond_to| Command::Register { respond_to }).await
    }

    pub async fn create_product(&self) -> AppResult<Address> {
        self.request(|respond_to| Command::CreateProduct { respond_to }).await
    }

    pub async fn session_action(&self, call: SessionCall) -> AppResult<TxOutcome> {
        self.request(|respond_to| Command::Session { call, respond_to }).await
    }

    pub async fn accounts_changed(&self) -> AppResult<()> {
        self.request(|respond_to| Command::AccountsChanged { respond_to }).await
    }

    pub async fn snapshot(&self) -> AppResult<AppState> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(Command::Snapshot { respond_to })
            .await
            .map_err(|_| AppError::Disconnected)?;
        receiver.await.map_err(|_| AppError::Disconnected)
    }
}
