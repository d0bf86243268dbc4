//! Client for the pricing-session marketplace contracts.

pub mod blockchain;
pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod observability;
pub mod session;
pub mod state;
pub mod view;

pub use config::AppConfig;
pub use controller::{AppError, ControllerHandle};
pub use lifecycle::{launch, App, Shutdown};
pub use state::AppState;
