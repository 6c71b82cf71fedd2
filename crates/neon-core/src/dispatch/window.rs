//! Prompt window builder.
//!
//! Linearizes the most recent `k` turns of a conversation into a single text
//! block followed by the new utterance. Truncation is by whole turns only;
//! an individual turn's content is never shortened.

use neon_types::conversation::{Turn, TurnRole};

/// Wording used to linearize a conversation for one text strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub user_label: &'static str,
    pub assistant_label: &'static str,
    /// Opening used when the conversation has no prior turn.
    /// Empty means the utterance is sent bare.
    pub intro: &'static str,
    /// Heading placed before the rendered history.
    pub history_heading: &'static str,
    /// Separator between the heading and the first rendered turn.
    pub heading_separator: &'static str,
    /// Marker that introduces the new utterance.
    pub question_marker: &'static str,
    /// Cue appended after the utterance to mark where the reply begins.
    pub reply_cue: Option<&'static str>,
}

/// Plain chat with the Neon persona.
pub const CHAT_TEMPLATE: PromptTemplate = PromptTemplate {
    user_label: "Utilisateur",
    assistant_label: "Assistant",
    intro: "Tu es Neon IA, un assistant intelligent et utile. Réponds de manière claire et détaillée.",
    history_heading: "Tu es Neon IA, un assistant intelligent et utile. Voici l'historique de notre conversation:",
    heading_separator: "\n\n",
    question_marker: "Utilisateur: ",
    reply_cue: Some("Assistant:"),
};

/// Internet-augmented search. No persona; the first question goes out bare.
pub const SEARCH_TEMPLATE: PromptTemplate = PromptTemplate {
    user_label: "Utilisateur",
    assistant_label: "IA",
    intro: "",
    history_heading: "Historique de la conversation:",
    heading_separator: "\n",
    question_marker: "Nouvelle question: ",
    reply_cue: None,
};

impl PromptTemplate {
    fn label(&self, role: TurnRole) -> &'static str {
        match role {
            TurnRole::User => self.user_label,
            TurnRole::Assistant => self.assistant_label,
        }
    }

    /// Render the last `k` turns as `"<Label>: <content>"`, oldest first.
    pub fn render_history(&self, history: &[Turn], k: usize) -> Vec<String> {
        recent(history, k)
            .iter()
            .map(|turn| format!("{}: {}", self.label(turn.role), turn.content))
            .collect()
    }

    /// Build the full prompt for `utterance` given the prior turns.
    pub fn build(&self, history: &[Turn], k: usize, utterance: &str) -> String {
        let rendered = self.render_history(history, k);

        let mut prompt = if rendered.is_empty() {
            if self.intro.is_empty() {
                return utterance.to_string();
            }
            format!("{}\n\n{}{}", self.intro, self.question_marker, utterance)
        } else {
            format!(
                "{}{}{}\n\n{}{}",
                self.history_heading,
                self.heading_separator,
                rendered.join("\n"),
                self.question_marker,
                utterance
            )
        };

        if let Some(cue) = self.reply_cue {
            prompt.push_str("\n\n");
            prompt.push_str(cue);
        }
        prompt
    }
}

/// The trailing `k` turns of `history`.
pub fn recent(history: &[Turn], k: usize) -> &[Turn] {
    &history[history.len().saturating_sub(k)..]
}
