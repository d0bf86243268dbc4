//! Plain-text renderings of [`AppState`].
//!
//! Every renderer is a pure `&AppState -> String`; the CLI prints them and
//! `dashboard --watch` re-renders on each published state.

mod format;
mod participants;
mod products;
mod sidebar;

pub use format::{accuracy, avatar_url, eth};
pub use participants::render_participants;
pub use products::render_products;
pub use sidebar::render_sidebar;

use crate::state::{AppState, Notice, Route};

/// Notice banner, if any.
pub fn render_notice(state: &AppState) -> Option<String> {
    state.notice.as_ref().map(|notice| {
        let tag = match notice {
            Notice::Success(_) => "ok",
            Notice::Rejected(_) => "rejected",
        };
        format!("[{}] {}", tag, notice.message())
    })
}

/// The active route's view.
pub fn render_route(state: &AppState) -> String {
    match state.route {
        Route::Products => render_products(state),
        Route::Participants => render_participants(state),
    }
}

/// Sidebar, then the notice banner, then the routed view.
pub fn render_app(state: &AppState) -> String {
    let mut sections = vec![render_sidebar(state)];
    if let Some(banner) = render_notice(state) {
        sections.push(banner);
    }
    sections.push(render_route(state));
    sections.join("\n\n")
}
