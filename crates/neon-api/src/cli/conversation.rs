//! Conversation catalog CLI commands: new, list, show, delete.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use uuid::Uuid;

use neon_types::conversation::{Conversation, Modality};

use super::render;
use crate::state::AppState;

/// Create a conversation.
///
/// ```bash
/// neon new search
/// neon new image --title "Renards"
/// ```
pub async fn create_conversation(
    state: &AppState,
    modality: Modality,
    title: Option<String>,
    json: bool,
) -> Result<()> {
    let conversation = state.catalog.create(modality, title).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created '{}' ({})",
        style("✓").green().bold(),
        style(&conversation.title).cyan(),
        modality.label()
    );
    println!("  {}  {}", style("ID:").bold(), style(conversation.id).dim());
    println!();
    println!(
        "  Send a message: {}",
        style(format!("neon send {} <text>", conversation.id)).yellow()
    );
    println!();
    Ok(())
}

pub async fn list_conversations(
    state: &AppState,
    modality: Option<Modality>,
    limit: i64,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(limit > 0, "--limit must be positive");
    let conversations = state.catalog.list(modality, Some(limit)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style(format!(
                "neon new {}",
                modality.unwrap_or(Modality::Assistant)
            ))
            .yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", conversation_table(&conversations));
    println!();
    println!(
        "  {} conversation{}",
        style(conversations.len()).bold(),
        if conversations.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

fn conversation_table(conversations: &[Conversation]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Modality").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for conversation in conversations {
        let preview = if conversation.preview.is_empty() {
            Cell::new("(empty)").fg(Color::DarkGrey)
        } else {
            Cell::new(&conversation.preview).fg(Color::White)
        };
        table.add_row(vec![
            Cell::new(&conversation.title).fg(Color::Cyan),
            Cell::new(conversation.modality.to_string()).fg(modality_color(conversation.modality)),
            preview,
            Cell::new(conversation.updated_at.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::DarkGrey),
            Cell::new(conversation.id.to_string()).fg(Color::DarkGrey),
        ]);
    }
    table
}

fn modality_color(modality: Modality) -> Color {
    match modality {
        Modality::Assistant => Color::Green,
        Modality::Search => Color::Blue,
        Modality::Image => Color::Yellow,
        Modality::Video => Color::Magenta,
    }
}

/// Print the transcript of a conversation, oldest turn first.
pub async fn show_conversation(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    let conversation = state
        .catalog
        .get(&id)
        .await?
        .with_context(|| format!("Conversation '{id}' not found"))?;
    let turns = state.engine.transcript(&id).await?;

    if json {
        let export = serde_json::json!({
            "conversation": conversation,
            "turns": turns,
        });
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    render::print_header(&conversation);
    if turns.is_empty() {
        println!("  {}", style("No messages yet.").dim());
        println!();
    }
    for turn in &turns {
        render::print_turn(turn);
    }
    Ok(())
}

/// Delete a conversation, asking first unless `--force` or `--json`.
pub async fn delete_conversation(
    state: &AppState,
    id: Uuid,
    force: bool,
    json: bool,
) -> Result<()> {
    let conversation = state
        .catalog
        .get(&id)
        .await?
        .with_context(|| format!("Conversation '{id}' not found"))?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete '{}' and all of its messages?",
                conversation.title
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.catalog.delete(&id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "deleted": true, "id": id }))?
        );
    } else {
        println!(
            "  {} Deleted '{}'",
            style("✓").green().bold(),
            style(&conversation.title).cyan()
        );
    }
    Ok(())
}
