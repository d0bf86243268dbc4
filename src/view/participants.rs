use crate::state::AppState;
use crate::view::format::accuracy;

pub fn render_participants(state: &AppState) -> String {
    let mut lines = vec![format!("Participants ({})", state.participants.len())];
    if state.participants.is_empty() {
        return lines.join("\n");
    }

    lines.push(format!(
        "{:<42}  {:<20} {:<28} {:>8} {:>9}",
        "Address", "Name", "Email", "Sessions", "Accuracy"
    ));
    for participant in &state.participants {
        lines.push(format!(
            "{:<42}  {:<20} {:<28} {:>8} {:>9}",
            participant.account.to_string(),
            participant.fullname,
            participant.email,
            participant.n_sessions,
            accuracy(participant.deviation)
        ));
    }
    lines.join("\n")
}
