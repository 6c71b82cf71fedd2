//! CLI command definitions for the `neon` binary.
//!
//! One set of commands serves every modality; the modality is an argument
//! (`neon chat image`, `neon new search`) rather than a separate page.

pub mod chat;
pub mod conversation;
pub mod hub;
pub mod render;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use neon_types::conversation::Modality;

/// Chat, search, and generate images or videos from one terminal.
#[derive(Parser)]
#[command(name = "neon", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new conversation (assistant, search, image, video).
    New {
        modality: Modality,

        /// Title; defaults to a numbered name such as "Recherche 3".
        #[arg(long, short)]
        title: Option<String>,
    },

    /// List conversations, most recently updated first.
    #[command(alias = "ls")]
    List {
        /// Only conversations of this modality.
        #[arg(long, short)]
        modality: Option<Modality>,

        #[arg(long, short, default_value_t = 20)]
        limit: i64,
    },

    /// Print a conversation transcript.
    Show { id: Uuid },

    /// Send one message to a conversation and print the reply.
    Send {
        id: Uuid,

        /// Message text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Interactive session in one modality.
    ///
    /// Resumes the given conversation, else the most recent one of that
    /// modality, creating one if none exists.
    Chat {
        modality: Modality,

        #[arg(long, short)]
        conversation: Option<Uuid>,
    },

    /// Delete a conversation and all of its turns.
    #[command(alias = "rm")]
    Delete {
        id: Uuid,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },

    /// Conversation counts per modality.
    Hub,

    /// Start the REST API server.
    Serve {
        /// Defaults to `server.host` from config.toml.
        #[arg(long)]
        host: Option<String>,

        /// Defaults to `server.port` from config.toml.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate shell completions.
    Completions { shell: Shell },
}

/// Steady-ticking spinner used while waiting on the engine.
pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
