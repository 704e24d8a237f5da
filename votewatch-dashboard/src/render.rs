//! Plain-text rendering of the poll state.

use std::fmt::Write;

use crate::ranking::RankedCandidate;
use crate::state::PollState;

pub fn render(state: &PollState) -> String {
    match state {
        PollState::Loading => "Loading results...\n".to_string(),
        PollState::Failed(message) => format!("Error: {}\n", message),
        PollState::Ready(snapshot) => {
            let mut out = String::new();
            render_table(&mut out, "Combined", &snapshot.combined);
            render_table(&mut out, "Romania", &snapshot.romania);
            render_table(&mut out, "Diaspora", &snapshot.diaspora);
            out
        }
    }
}

pub fn render_table(out: &mut String, title: &str, rows: &[RankedCandidate]) {
    let _ = writeln!(out, "== {} ==", title);
    if rows.is_empty() {
        let _ = writeln!(out, "(no candidates)");
        out.push('\n');
        return;
    }

    let name_width = rows
        .iter()
        .map(|r| display_name(r).chars().count())
        .max()
        .unwrap_or(0)
        .max("Candidate".len());

    let _ = writeln!(
        out,
        "{:>4}  {:<width$}  {:>12}  {:>12}  {:>7}",
        "#",
        "Candidate",
        "Votes",
        "Gap",
        "Share",
        width = name_width
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4}  {:<width$}  {:>12}  {:>12}  {:>6.2}%",
            row.rank,
            display_name(row),
            row.votes,
            row.gap,
            row.share,
            width = name_width
        );
    }
    out.push('\n');
}

fn display_name(row: &RankedCandidate) -> String {
    match &row.party {
        Some(party) => format!("{} ({})", row.name, party),
        None => row.name.clone(),
    }
}
