use crate::state::app::{AppState, ProductField, ProfileField};
use crate::state::intent::Intent;

/// The only place state transitions happen.
pub struct AppReducer;

impl AppReducer {
    pub fn reduce(state: AppState, intent: Intent) -> AppState {
        match intent {
            Intent::InputProfile { field, value } => {
                let mut profile = state.profile.unwrap_or_default();
                match field {
                    ProfileField::Fullname => profile.fullname = value,
                    ProfileField::Email => profile.email = value,
                }
                AppState {
                    profile: Some(profile),
                    ..state
                }
            }
            Intent::InputNewProduct { field, value } => {
                let mut new_product = state.new_product;
                match field {
                    ProductField::Name => new_product.name = value,
                    ProductField::Description => new_product.description = value,
                    ProductField::Image => new_product.image = value,
                }
                AppState {
                    new_product,
                    ..state
                }
            }
            Intent::SelectProduct(index) => AppState {
                current_product: index,
                ..state
            },
            Intent::Navigate(route) => AppState { route, ..state },
            Intent::SetAccount {
                account,
                balance,
                is_admin,
                profile,
            } => AppState {
                account: Some(account),
                balance,
                is_admin,
                profile: Some(profile),
                ..state
            },
            Intent::SetProfile(profile) => AppState {
                profile: Some(profile),
                ..state
            },
            Intent::SetParticipants(participants) => AppState {
                participants,
                ..state
            },
            Intent::SetProducts(products) => AppState { products, ..state },
            Intent::Notify(notice) => AppState {
                notice: Some(notice),
                ..state
            },
            Intent::ClearNotice => AppState {
                notice: None,
                ..state
            },
            Intent::Reset => AppState {
                route: state.route,
                ..AppState::default()
            },
        }
    }
}
