//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (PRICING_PRIVATE_KEY, optional)
//!     → wallet.rs (injected signer) or node-managed accounts
//!     → client.rs (RPC connection with timeouts and failover)
//!     → contracts.rs (Main/Session bindings, preflight + send)
//!     → gateway.rs (ContractGateway, consumed by the controller)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod artifact;
pub mod client;
pub mod contracts;
#[cfg(test)]
pub mod faulty;
pub mod gateway;
pub mod simulated;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use contracts::PricingContracts;
pub use gateway::ContractGateway;
pub use simulated::SimulatedChain;
pub use types::{
    ChainError, ChainResult, Participant, SessionCall, SessionFigures, SessionMeta, SessionStatus,
    Transaction, TxOutcome,
};
pub use wallet::Wallet;
