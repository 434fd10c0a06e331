#![warn(missing_docs)]
//! # deepguard-core
//!
//! ## Purpose
//! Defines the pure data model used across the `deepguard` workspace.
//!
//! ## Responsibilities
//! - Represent inbound communications (emails, voicemails, chats).
//! - Hold the static message store fed into the dashboard.
//! - Model the append-only conversation transcript of an analysis session.
//!
//! ## Data flow
//! The dashboard loads an [`Inbox`] once. Selecting a [`Communication`] starts
//! analysis; the resulting session appends [`ConversationTurn`] values into a
//! [`Transcript`].
//!
//! ## Ownership and lifetimes
//! Communications and turns own their strings so they can move freely between
//! async request futures and the state container.
//!
//! ## Error model
//! Store validation failures (blank or duplicate ids, unknown lookups, JSON
//! decode errors) return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use deepguard_core::{Inbox, TurnRole, Transcript};
//!
//! let inbox = Inbox::mock();
//! assert_eq!(inbox.len(), 4);
//!
//! let mut transcript = Transcript::new();
//! transcript.push(TurnRole::User, "why is this risky?");
//! assert_eq!(transcript.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel an inbound communication arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationKind {
    /// Email message.
    Email,
    /// Voicemail with transcription.
    Voice,
    /// Instant message.
    Chat,
}

/// One inbound communication shown in the inbox.
///
/// Created once at load time and never mutated; identity is [`Communication::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    /// Stable identifier.
    pub id: String,
    /// Display name of the sender.
    pub sender: String,
    /// Sender address used for spoofing checks.
    pub sender_email: String,
    /// Subject line.
    pub subject: String,
    /// Message body or voicemail transcription.
    pub content: String,
    /// Display timestamp as received.
    pub timestamp: String,
    /// Arrival channel.
    #[serde(rename = "type")]
    pub kind: CommunicationKind,
    /// Whether the user has opened the item.
    #[serde(rename = "isRead")]
    pub read: bool,
    /// Audio reference for voice messages.
    #[serde(default, rename = "audioUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Static message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox {
    messages: Vec<Communication>,
}

impl Inbox {
    /// Builds a validated store.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyId`] for a blank id and
    /// [`CoreError::DuplicateId`] when two communications share one.
    pub fn new(messages: Vec<Communication>) -> Result<Self, CoreError> {
        for (index, message) in messages.iter().enumerate() {
            if message.id.trim().is_empty() {
                return Err(CoreError::EmptyId);
            }
            if messages[..index].iter().any(|other| other.id == message.id) {
                return Err(CoreError::DuplicateId(message.id.clone()));
            }
        }

        Ok(Self { messages })
    }

    /// Decodes a store from a JSON array of communications.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] for invalid JSON and the validation errors
    /// of [`Inbox::new`].
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let messages: Vec<Communication> = serde_json::from_str(raw).map_err(CoreError::Codec)?;
        Self::new(messages)
    }

    /// Returns the built-in demo inbox.
    pub fn mock() -> Self {
        Self {
            messages: mock_messages(),
        }
    }

    /// Looks up a communication by id.
    pub fn get(&self, id: &str) -> Option<&Communication> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Looks up a communication by id, failing on unknown ids.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownCommunication`] when no item matches.
    pub fn require(&self, id: &str) -> Result<&Communication, CoreError> {
        self.get(id)
            .ok_or_else(|| CoreError::UnknownCommunication(id.to_string()))
    }

    /// Iterates communications in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Communication> {
        self.messages.iter()
    }

    /// Number of communications not yet opened.
    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|message| !message.read).count()
    }

    /// Returns the number of stored communications.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The human analyst.
    User,
    /// The security agent backed by the external model.
    Agent,
}

/// One entry in a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Identifier unique within its transcript.
    pub id: String,
    /// Speaker.
    pub role: TurnRole,
    /// Rendered text.
    pub text: String,
}

/// Append-only ordered turn log scoped to one communication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn and returns it.
    ///
    /// Ids are sequential (`turn-1`, `turn-2`, ...) so ordering is visible in
    /// the id as well as the position.
    pub fn push(&mut self, role: TurnRole, text: impl Into<String>) -> &ConversationTurn {
        let id = format!("turn-{}", self.turns.len() + 1);
        self.turns.push(ConversationTurn {
            id,
            role,
            text: text.into(),
        });
        &self.turns[self.turns.len() - 1]
    }

    /// Returns all turns in append order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Returns the most recent turn.
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` when no turn has been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Error type for store validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Communication id cannot be blank.
    #[error("communication id is empty")]
    EmptyId,
    /// Communication ids must be unique within a store.
    #[error("duplicate communication id: {0}")]
    DuplicateId(String),
    /// Lookup for an id the store does not hold.
    #[error("unknown communication: {0}")]
    UnknownCommunication(String),
    /// JSON decode failure.
    #[error("inbox codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

fn mock_messages() -> Vec<Communication> {
    vec![
        Communication {
            id: "1".to_string(),
            sender: "Amazon Support".to_string(),
            sender_email: "support-security-check@amazon-security-alert-x92.com".to_string(),
            subject: "URGENT: Suspicious activity on your business account".to_string(),
            content: "Dear Customer,\n\n\
                We have detected unusual purchasing activity on your Amazon Business account. \
                To prevent suspension, please verify your payment method immediately by clicking \
                the link below or replying with your credit card details for manual verification.\n\n\
                If you do not respond within 2 hours, your account will be permanently locked.\n\n\
                Sincerely,\nAmazon Security Team"
                .to_string(),
            timestamp: "10:42 AM".to_string(),
            kind: CommunicationKind::Email,
            read: false,
            audio_url: None,
        },
        Communication {
            id: "2".to_string(),
            sender: "CEO - John Smith".to_string(),
            // Misspelled domain is part of the fixture.
            sender_email: "john.smith@compnay-internal.com".to_string(),
            subject: "Wire Transfer Request - Confidential".to_string(),
            content: "Hi,\n\n\
                I'm currently in a meeting with investors and can't talk. I need you to process \
                an urgent wire transfer of $4,500 to a new vendor immediately. It is critical for \
                closing this deal today.\n\n\
                I will forward the invoice shortly. Please confirm once the transfer is initiated. \
                Do not call me as I am occupied.\n\n\
                Best,\nJohn"
                .to_string(),
            timestamp: "09:15 AM".to_string(),
            kind: CommunicationKind::Email,
            read: false,
            audio_url: None,
        },
        Communication {
            id: "3".to_string(),
            sender: "Sarah Jenkins".to_string(),
            sender_email: "sarah.j@legit-vendor.com".to_string(),
            subject: "Q3 Marketing Proposal".to_string(),
            content: "Hi team,\n\n\
                Attached is the proposal for the Q3 marketing campaign we discussed last week. \
                Let me know if you have any feedback before we finalize the budget.\n\n\
                Thanks,\nSarah"
                .to_string(),
            timestamp: "Yesterday".to_string(),
            kind: CommunicationKind::Email,
            read: true,
            audio_url: None,
        },
        Communication {
            id: "4".to_string(),
            sender: "Unknown Caller".to_string(),
            sender_email: "voice-msg@telecom-service.net".to_string(),
            subject: "Voicemail: Urgent Action Required".to_string(),
            content: "Voice message attached. Transcription: \"This is Officer David from the IRS. \
                There is a lawsuit against your company. You must call us back immediately or pay \
                the penalty fine to avoid arrest.\""
                .to_string(),
            timestamp: "Yesterday".to_string(),
            kind: CommunicationKind::Voice,
            read: false,
            audio_url: Some("simulated_audio_path".to_string()),
        },
    ]
}
