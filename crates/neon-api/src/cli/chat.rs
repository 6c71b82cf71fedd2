//! Sending messages: one-shot `neon send` and the interactive `neon chat` loop.

use anyhow::Result;
use console::style;
use dialoguer::Input;
use uuid::Uuid;

use neon_core::engine::EngineError;
use neon_types::conversation::{Conversation, Modality};

use super::{render, spinner};
use crate::state::AppState;

fn waiting_message(modality: Modality) -> &'static str {
    match modality {
        Modality::Assistant => "Réflexion...",
        Modality::Search => "Recherche en cours...",
        Modality::Image => "Génération de l'image...",
        Modality::Video => "Génération des images de la vidéo...",
    }
}

/// Submit `text` and print the assistant turn.
pub async fn send_message(state: &AppState, id: Uuid, text: &str, json: bool) -> Result<()> {
    let modality = state
        .catalog
        .get(&id)
        .await?
        .map(|c| c.modality)
        .ok_or(EngineError::ConversationNotFound(id))?;

    let progress = (!json).then(|| spinner(waiting_message(modality)));
    let result = state.engine.submit(id, text).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    let pair = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pair)?);
    } else {
        println!();
        render::print_turn(&pair.assistant);
    }
    Ok(())
}

/// A line typed at the interactive prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Message(&'a str),
    NewConversation,
    Help,
    Quit,
    Empty,
}

fn parse_input(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Empty,
        "/quit" | "/exit" | "/q" => ChatInput::Quit,
        "/new" => ChatInput::NewConversation,
        "/help" | "/?" => ChatInput::Help,
        text => ChatInput::Message(text),
    }
}

/// Slash commands shown by `/help`.
const COMMANDS: [(&str, &str); 3] = [
    ("/new", "démarrer une nouvelle conversation"),
    ("/help", "afficher cette aide"),
    ("/quit", "quitter"),
];

fn print_help() {
    println!();
    for (command, description) in COMMANDS {
        println!("  {:<6} {description}", style(command).yellow());
    }
    println!();
}

/// Interactive loop over one modality.
///
/// Opens `selected` when it belongs to `modality`, else the most recent
/// conversation of that modality, creating one when there is none.
pub async fn chat_loop(state: &AppState, modality: Modality, selected: Option<Uuid>) -> Result<()> {
    let mut conversation = state.catalog.open(modality, selected).await?;
    show_conversation(state, &conversation).await?;
    println!(
        "  {}",
        style("Écrivez un message, /help pour les commandes, /quit pour quitter.").dim()
    );
    println!();

    loop {
        let line: String = Input::new()
            .with_prompt(style("Vous").cyan().bold().to_string())
            .allow_empty(true)
            .interact_text()?;

        let text = match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Help => {
                print_help();
                continue;
            }
            ChatInput::NewConversation => {
                conversation = state.catalog.create(modality, None).await?;
                show_conversation(state, &conversation).await?;
                continue;
            }
            ChatInput::Message(text) => text,
        };

        let progress = spinner(waiting_message(modality));
        let result = state.engine.submit(conversation.id, text).await;
        progress.finish_and_clear();

        match result {
            Ok(pair) => {
                println!();
                render::print_turn(&pair.assistant);
            }
            Err(e) if e.is_recoverable() => {
                tracing::debug!(conversation_id = %conversation.id, error = %e, "Submission failed");
                println!("  {} {e}", style("!").red().bold());
                if matches!(e, EngineError::Generation { .. }) {
                    println!(
                        "  {}",
                        style("Votre message est conservé ; renvoyez-le pour réessayer.").dim()
                    );
                }
                println!();
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("  {}", style("À bientôt !").dim());
    Ok(())
}

async fn show_conversation(state: &AppState, conversation: &Conversation) -> Result<()> {
    render::print_header(conversation);
    for turn in state.engine.transcript(&conversation.id).await? {
        render::print_turn(&turn);
    }
    Ok(())
}
