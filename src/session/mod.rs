//! Session transition dispatch.
//!
//! # Data Flow
//! ```text
//! action name + price
//!     → action.rs (parse into SessionCall, decide follow-up refreshes)
//!     → dispatch.rs (read status, preflight with eth_call, send)
//!     → controller applies follow-ups and notices
//! ```
//!
//! # Design Decisions
//! - The contract is the only rule book: a transaction is dry-run first and
//!   its revert reason is surfaced as `ChainError::Reverted`
//! - A rejected preflight never sends a transaction

pub mod action;
pub mod dispatch;

pub use action::{parse_action, FollowUp};
pub use dispatch::{dispatch_session, submit_checked, Dispatched};
