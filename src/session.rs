//! Types exchanged with the hosting session runtime.

use serde::{Deserialize, Serialize};

/// Colour code that marks translated chat lines.
const TRANSLATED_PREFIX: &str = "§d";
/// Colour code that resets styling after the sender tag.
const RESET_COLOR: &str = "§f";

/// An online participant as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    /// Host locale such as "en_US". May be empty when unknown.
    #[serde(default)]
    pub locale: String,
}

/// A chat line typed by `sender`, with the participants online at that moment.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEvent {
    pub sender: Participant,
    pub message: String,
    /// Set when the host's default broadcast is suppressed.
    #[serde(default)]
    pub cancelled: bool,
    pub recipients: Vec<Participant>,
}

impl ChatEvent {
    /// Suppress the host's default broadcast of this message.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinEvent {
    pub participant_id: String,
    #[serde(default)]
    pub locale: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuitEvent {
    pub participant_id: String,
}

/// One outbound chat line for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub recipient_id: String,
    pub text: String,
}

/// Receives the lines produced for each recipient.
pub trait Outbox {
    fn send(&mut self, recipient_id: &str, text: String);
}

impl Outbox for Vec<Delivery> {
    fn send(&mut self, recipient_id: &str, text: String) {
        self.push(Delivery {
            recipient_id: recipient_id.to_string(),
            text,
        });
    }
}

/// `<name> text` with no styling.
pub fn format_plain(sender_name: &str, text: &str) -> String {
    format!("<{}> {}", sender_name, text)
}

/// Translated line, styled so readers can tell it apart from the original.
pub fn format_translated(sender_name: &str, text: &str) -> String {
    format!("{}<{}>{} {}", TRANSLATED_PREFIX, sender_name, RESET_COLOR, text)
}
