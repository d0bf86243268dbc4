//! The single writer of application state.
//!
//! # Data Flow
//! ```text
//! CLI / account watcher
//!     → handle.rs (ControllerHandle, mpsc + oneshot reply)
//!     → server.rs (one command at a time: workflows, reducer, publish)
//!     → listing.rs (bounded concurrent reads, visibility filters)
//!     → watch channel → view::render_*
//! ```
//!
//! # Design Decisions
//! - One task owns `AppState`; everyone else sends commands
//! - Every new state is published on a `watch` channel
//! - A failed user action leaves a rejection notice in state

pub mod accounts;
pub mod command;
pub mod error;
pub mod handle;
pub mod listing;
pub mod server;

pub use accounts::AccountWatcher;
pub use error::{AppError, AppResult};
pub use handle::ControllerHandle;
pub use listing::Viewer;
pub use server::{Controller, ControllerSettings};
