//! Conversation, turn, and media reference types for Neon.
//!
//! A conversation is pinned to one modality at creation time and owns an
//! append-only, time-ordered list of turns. Turns produced by the image and
//! video modalities carry a [`MediaRef`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Maximum number of characters kept in a conversation preview.
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Which generation strategy a conversation uses.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (modality IN ('assistant', 'search', 'image', 'video'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Assistant,
    Search,
    Image,
    Video,
}

impl Modality {
    /// Every modality, in hub display order.
    pub const ALL: [Modality; 4] = [
        Modality::Assistant,
        Modality::Image,
        Modality::Video,
        Modality::Search,
    ];

    /// Title given to the `n`-th conversation created in this modality.
    pub fn default_title(&self, n: u64) -> String {
        match self {
            Modality::Assistant => format!("Conversation {n}"),
            Modality::Search => format!("Recherche {n}"),
            Modality::Image => format!("Génération {n}"),
            Modality::Video => format!("Vidéo {n}"),
        }
    }

    /// Human-readable feature name.
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Assistant => "Chat IA",
            Modality::Search => "Recherche IA",
            Modality::Image => "Générateur d'Images",
            Modality::Video => "Générateur de Vidéos",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Assistant => write!(f, "assistant"),
            Modality::Search => write!(f, "search"),
            Modality::Image => write!(f, "image"),
            Modality::Video => write!(f, "video"),
        }
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assistant" | "chat" => Ok(Modality::Assistant),
            "search" => Ok(Modality::Search),
            "image" => Ok(Modality::Image),
            "video" => Ok(Modality::Video),
            other => Err(format!("invalid modality: '{other}'")),
        }
    }
}

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// Generated media attached to an assistant turn.
///
/// A single image is `Single`; a video is an ordered `Sequence` of frame URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaRef {
    Single { url: String },
    Sequence { urls: Vec<String> },
}

impl MediaRef {
    /// All URLs in display order.
    pub fn urls(&self) -> Vec<&str> {
        match self {
            MediaRef::Single { url } => vec![url.as_str()],
            MediaRef::Sequence { urls } => urls.iter().map(String::as_str).collect(),
        }
    }
}

/// A conversation pinned to a single modality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub modality: Modality,
    /// First characters of the most recent user utterance. Derived, never authoritative.
    pub preview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// A fresh conversation with an empty preview.
    pub fn new(title: String, modality: Modality) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title,
            modality,
            preview: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One message exchanged in a conversation.
///
/// Turns are ordered by `created_at` within a conversation and are never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: TurnRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(conversation_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role: TurnRole::User,
            content,
            media: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(conversation_id: Uuid, content: String, media: Option<MediaRef>) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role: TurnRole::Assistant,
            content,
            media,
            created_at: Utc::now(),
        }
    }
}

/// The user turn and the assistant turn produced by one successful dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnPair {
    pub user: Turn,
    pub assistant: Turn,
}

/// Number of conversations held under one modality, as shown on the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityCount {
    pub modality: Modality,
    pub conversations: u64,
}

/// Build a conversation preview from a user utterance.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn preview_of(utterance: &str) -> String {
    utterance.chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_roundtrip() {
        for modality in Modality::ALL {
            let s = modality.to_string();
            let parsed: Modality = s.parse().unwrap();
            assert_eq!(modality, parsed);
        }
    }

    #[test]
    fn test_modality_chat_alias() {
        assert_eq!("chat".parse::<Modality>().unwrap(), Modality::Assistant);
        assert!("audio".parse::<Modality>().is_err());
    }

    #[test]
    fn test_default_titles() {
        assert_eq!(Modality::Assistant.default_title(1), "Conversation 1");
        assert_eq!(Modality::Search.default_title(2), "Recherche 2");
        assert_eq!(Modality::Image.default_title(3), "Génération 3");
        assert_eq!(Modality::Video.default_title(4), "Vidéo 4");
    }

    #[test]
    fn test_media_ref_serde_is_tagged() {
        let single = MediaRef::Single {
            url: "https://img/1.png".to_string(),
        };
        let json = serde_json::to_string(&single).unwrap();
        assert_eq!(json, r#"{"kind":"single","url":"https://img/1.png"}"#);

        let seq = MediaRef::Sequence {
            urls: vec!["a".to_string(), "b".to_string()],
        };
        let json = serde_json::to_string(&seq).unwrap();
        assert!(json.contains("\"kind\":\"sequence\""));
        let parsed: MediaRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.urls(), vec!["a", "b"]);
    }

    #[test]
    fn test_turn_without_media_omits_field() {
        let turn = Turn::user(Uuid::now_v7(), "Bonjour".to_string());
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("media"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_preview_counts_characters() {
        let long = "é".repeat(80);
        let preview = preview_of(&long);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS);
        assert_eq!(preview_of("Bonjour"), "Bonjour");
    }

    #[test]
    fn test_new_conversation_has_empty_preview() {
        let conv = Conversation::new("Vidéo 1".to_string(), Modality::Video);
        assert!(conv.preview.is_empty());
        assert_eq!(conv.created_at, conv.updated_at);
    }
}
