//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → wallet → RPC client → contracts → controller (+ account watcher)
//!
//! Shutdown (shutdown.rs):
//!     Trigger → controller and watcher loops exit → tasks joined
//!
//! Signals (signals.rs):
//!     Ctrl-C → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: a bad key or RPC URL fails before any task starts
//! - A missing Session artifact only disables product creation

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{launch, App};
