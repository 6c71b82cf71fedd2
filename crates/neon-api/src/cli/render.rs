//! Terminal rendering of turns and transcripts.

use console::style;

use neon_types::conversation::{Conversation, MediaRef, Turn, TurnRole};

/// Lines for one turn: a role header, the text, then any media URLs.
/// Video frames are numbered in sequence order.
pub fn turn_lines(turn: &Turn) -> Vec<String> {
    let header = match turn.role {
        TurnRole::User => style("Vous").cyan().bold().to_string(),
        TurnRole::Assistant => style("Neon").magenta().bold().to_string(),
    };
    let time = style(turn.created_at.format("%H:%M").to_string()).dim();

    let mut lines = vec![format!("  {header} {time}")];
    lines.extend(turn.content.lines().map(|line| format!("  {line}")));

    match &turn.media {
        Some(MediaRef::Single { url }) => {
            lines.push(format!("  {} {}", style("image").yellow(), style(url).underlined()));
        }
        Some(MediaRef::Sequence { urls }) => {
            let total = urls.len();
            for (i, url) in urls.iter().enumerate() {
                lines.push(format!(
                    "  {} {}",
                    style(format!("frame {}/{total}", i + 1)).yellow(),
                    style(url).underlined()
                ));
            }
        }
        None => {}
    }
    lines
}

pub fn print_turn(turn: &Turn) {
    for line in turn_lines(turn) {
        println!("{line}");
    }
    println!();
}

pub fn print_header(conversation: &Conversation) {
    println!();
    println!(
        "  {} {}",
        style(&conversation.title).bold(),
        style(format!("({})", conversation.modality.label())).dim()
    );
    println!("  {}", style(conversation.id.to_string()).dim());
    println!();
}
