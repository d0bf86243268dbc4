use alloy::primitives::Address;
use tokio::sync::oneshot;

use crate::blockchain::{SessionCall, TxOutcome};
use crate::controller::error::AppResult;
use crate::state::{AppState, ProductField, ProfileField, Route};

pub type Reply<T> = oneshot::Sender<AppResult<T>>;

/// Requests processed one at a time by the controller.
pub enum Command {
    /// Load the account, then participants and products.
    Bootstrap { respond_to: Reply<()> },
    RefreshParticipants { respond_to: Reply<()> },
    RefreshProducts { respond_to: Reply<()> },
    EditProfile {
        field: ProfileField,
        value: String,
        respond_to: Reply<()>,
    },
    EditNewProduct {
        field: ProductField,
        value: String,
        respond_to: Reply<()>,
    },
    SelectProduct { index: usize, respond_to: Reply<()> },
    Navigate { route: Route, respond_to: Reply<()> },
    /// Register the profile draft on chain.
    Register { respond_to: Reply<TxOutcome> },
    /// Deploy a session from the new-product form; replies with its address.
    CreateProduct { respond_to: Reply<Address> },
    /// Drive the selected product's session.
    Session {
        call: SessionCall,
        respond_to: Reply<TxOutcome>,
    },
    /// The primary account changed: drop everything and reload.
    AccountsChanged { respond_to: Reply<()> },
    Snapshot { respond_to: oneshot::Sender<AppState> },
}

impl Command {
    /// Name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bootstrap { .. } => "bootstrap",
            Self::RefreshParticipants { .. } => "refresh_participants",
            Self::RefreshProducts { .. } => "refresh_products",
            Self::EditProfile { .. } => "edit_profile",
            Self::EditNewProduct { .. } => "edit_new_product",
            Self::SelectProduct { .. } => "select_product",
            Self::Navigate { .. } => "navigate",
            Self::Register { .. } => "register",
            Self::CreateProduct { .. } => "create_product",
            Self::Session { .. } => "session",
            Self::AccountsChanged { .. } => "accounts_changed",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}
