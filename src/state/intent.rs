use alloy::primitives::{Address, U256};

use crate::blockchain::Participant;
use crate::state::app::{Notice, Product, ProductField, ProfileField, Route};

/// Pure state updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Edit one field of the profile draft.
    InputProfile { field: ProfileField, value: String },
    /// Edit one field of the new-product form.
    InputNewProduct { field: ProductField, value: String },
    SelectProduct(usize),
    Navigate(Route),
    SetAccount {
        account: Address,
        balance: U256,
        is_admin: bool,
        profile: Participant,
    },
    SetProfile(Participant),
    SetParticipants(Vec<Participant>),
    SetProducts(Vec<Product>),
    Notify(Notice),
    ClearNotice,
    /// Drop everything derived from the chain; the route survives.
    Reset,
}
