//! Conversation Messages
//!
//! Multimodal message format used between the prompt builder and providers.
//! A message is an ordered list of parts; text parts and inline binary
//! attachments (e.g. a chart image) may be mixed.

use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input, including instructions
    User,
    /// Assistant (LLM) response
    Assistant,
}

/// One piece of message content
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text { text: String },

    /// Base64 payload tagged with a mime type. The payload is passed through
    /// untouched; the mime type is asserted by the caller, not verified.
    InlineData { mime_type: String, data: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// PNG-tagged inline image
    pub fn png(data: impl Into<String>) -> Self {
        Self::inline_data("image/png", data)
    }

    pub const fn is_inline_data(&self) -> bool {
        matches!(self, Self::InlineData { .. })
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Ordered content parts
    pub parts: Vec<ContentPart>,
}

impl Message {
    /// Create a new message with a single text part
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ContentPart::text(content)],
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Append a content part
    #[must_use]
    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any part carries inline binary data
    pub fn has_inline_data(&self) -> bool {
        self.parts.iter().any(ContentPart::is_inline_data)
    }
}
