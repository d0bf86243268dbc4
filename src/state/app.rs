use std::str::FromStr;

use alloy::primitives::{Address, U256};

use crate::blockchain::{Participant, SessionFigures, SessionMeta, SessionStatus};

/// The two routed views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Products,
    Participants,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Products => "/products",
            Self::Participants => "/participants",
        }
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/') {
            "products" => Ok(Self::Products),
            "participants" => Ok(Self::Participants),
            other => Err(format!("unknown route '{}'", other)),
        }
    }
}

/// Feedback from the last user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    /// The contract (or input validation) refused the action.
    Rejected(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Rejected(m) => m,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Fullname,
    Email,
}

/// Fields of the new-product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Image,
}

/// A session as listed in the products view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Session contract address.
    pub address: Address,
    pub meta: SessionMeta,
    pub status: SessionStatus,
    pub figures: SessionFigures,
}

/// Everything the views need, rebuilt from chain reads on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub route: Route,
    /// Primary account; `None` until the account workflow has run.
    pub account: Option<Address>,
    /// Balance in wei.
    pub balance: U256,
    pub is_admin: bool,
    /// Own participant record, or the registration draft while unregistered.
    pub profile: Option<Participant>,
    pub participants: Vec<Participant>,
    pub products: Vec<Product>,
    pub current_product: usize,
    pub new_product: SessionMeta,
    pub notice: Option<Notice>,
}

impl AppState {
    /// The selected product in the most recently fetched list.
    pub fn current_product(&self) -> Option<&Product> {
        self.products.get(self.current_product)
    }

    /// Whether the primary account has a registration on chain.
    pub fn is_registered(&self) -> bool {
        self.profile.as_ref().is_some_and(Participant::is_registered)
    }
}
