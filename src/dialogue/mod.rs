//! Interrogation dialogue: transcript messages and the suspect reply client.

mod client;

pub use client::{DialogueClient, DialogueFailure, DialogueSource};

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::Serialize;
use uuid::Uuid;

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sender {
    /// The player.
    Detective,
    /// The suspect under interrogation.
    Suspect,
}

/// One message in an interrogation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct DialogueMessage {
    id: Uuid,
    sender: Sender,
    text: String,
    timestamp: DateTime<Utc>,
}

impl DialogueMessage {
    /// Creates a message stamped with the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// A message from the detective.
    pub fn detective(text: impl Into<String>) -> Self {
        Self::new(Sender::Detective, text)
    }

    /// A message from the suspect.
    pub fn suspect(text: impl Into<String>) -> Self {
        Self::new(Sender::Suspect, text)
    }
}
