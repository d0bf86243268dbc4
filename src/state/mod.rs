//! Application state and its pure transitions.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ AppReducer ──→ AppState ──→ view::render_*
//!    ↑                                        │
//!    └──────────── controller ◀───────────────┘
//! ```
//!
//! - **AppState**: the single snapshot every view reads
//! - **Intent**: a pure update, possibly carrying results of contract reads
//! - **AppReducer**: `(AppState, Intent) -> AppState`, no side effects
//!
//! Only the controller applies intents, so there is exactly one writer.

mod app;
mod intent;
mod reducer;

pub use app::{AppState, Notice, Product, ProductField, ProfileField, Route};
pub use intent::Intent;
pub use reducer::AppReducer;
