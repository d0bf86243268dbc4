use crate::state::{AppState, Route};
use crate::view::format::{accuracy, avatar_url, eth};

pub fn render_sidebar(state: &AppState) -> String {
    let mut lines = Vec::new();

    if let Some(account) = state.account {
        lines.push(format!("Avatar   {}", avatar_url(account)));
        lines.push(format!("Balance  {} ETH", eth(state.balance)));
        let role = if state.is_admin { "Administrator" } else { "Member" };
        lines.push(format!("Role     {}", role));
        lines.push(format!("Account  {}", account));
        lines.push(String::new());
    }

    // Admins have no profile of their own.
    if !state.is_admin {
        if let Some(profile) = &state.profile {
            if profile.is_registered() {
                lines.push(profile.fullname.clone());
                lines.push(format!("  Email               {}", profile.email));
                lines.push(format!("  Number of sessions  {} session(s)", profile.n_sessions));
                lines.push(format!("  Accuracy            {}", accuracy(profile.deviation)));
            } else {
                lines.push("Register".to_string());
                lines.push(format!("  Fullname  [{}]", profile.fullname));
                lines.push(format!("  Email     [{}]", profile.email));
                lines.push("  (register --fullname <name> --email <email>)".to_string());
            }
            lines.push(String::new());
        }
    }

    lines.push("View all".to_string());
    for route in [Route::Products, Route::Participants] {
        let marker = if route == state.route { ">" } else { " " };
        let label = match route {
            Route::Products => "Products",
            Route::Participants => "Participants",
        };
        lines.push(format!("{} {:<13}{}", marker, label, route.path()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Participant;
    use alloy::primitives::{Address, U256};

    fn member(profile: Participant) -> AppState {
        AppState {
            account: Some(Address::with_last_byte(2)),
            balance: U256::from(2_000_000_000_000_000_000u128),
            is_admin: false,
            profile: Some(profile),
            ..Default::default()
        }
    }

    #[test]
    fn test_registered_member_sees_profile_card() {
        let state = member(Participant {
            account: Address::with_last_byte(2),
            fullname: "user1".to_string(),
            email: "user1@test.com".to_string(),
            n_sessions: 1,
            deviation: 15,
        });
        let sidebar = render_sidebar(&state);

        assert!(sidebar.contains("https://robohash.org/0x0000000000000000000000000000000000000002"));
        assert!(sidebar.contains("Balance  2 ETH"));
        assert!(sidebar.contains("Role     Member"));
        assert!(sidebar.contains("1 session(s)"));
        assert!(sidebar.contains("Accuracy            0.15%"));
        assert!(!sidebar.contains("Register"));
    }

    #[test]
    fn test_unregistered_member_sees_form() {
        let state = member(Participant {
            fullname: "dra".to_string(),
            ..Default::default()
        });
        let sidebar = render_sidebar(&state);
        assert!(sidebar.contains("Register"));
        assert!(sidebar.contains("Fullname  [dra]"));
        assert!(!sidebar.contains("Number of sessions"));
    }

    #[test]
    fn test_admin_has_no_profile_section() {
        let state = AppState {
            account: Some(Address::with_last_byte(1)),
            is_admin: true,
            profile: Some(Participant::default()),
            ..Default::default()
        };
        let sidebar = render_sidebar(&state);
        assert!(sidebar.contains("Role     Administrator"));
        assert!(!sidebar.contains("Register"));
        assert!(!sidebar.contains("Accuracy"));
    }

    #[test]
    fn test_active_route_marked() {
        let state = AppState {
            route: Route::Participants,
            ..Default::default()
        };
        let sidebar = render_sidebar(&state);
        assert!(sidebar.contains("> Participants "));
        assert!(sidebar.contains("  Products "));
        assert!(!sidebar.contains("Avatar"));
    }
}
