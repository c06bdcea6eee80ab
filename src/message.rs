//! Wire types for the `/chat` endpoint and message authorship.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::message::{ChatReply, ChatResponse};
//!
//! let response: ChatResponse = serde_json::from_str(r#"{"response": "olá"}"#).unwrap();
//! assert_eq!(response.into_reply(), ChatReply::Answer("olá".to_string()));
//! ```

use serde::{Deserialize, Serialize};

/// Author of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Text typed by the person using the widget. Always rendered literally.
    User,
    /// Text returned by the backend. Eligible for markup formatting.
    Bot,
}

impl Role {
    /// CSS class combined with the base `message` class.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// Body sent to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user text.
    pub message: String,
}

impl ChatRequest {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by the chat endpoint.
///
/// Exactly one of the two fields is expected. Use [`ChatResponse::into_reply`]
/// to resolve the anomalous shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Answer text, possibly carrying `**bold**` and `•` bullet tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Application-level failure reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the widget renders for a settled response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Normal answer.
    Answer(String),
    /// Backend reported an error.
    Error(String),
    /// Neither a usable `response` nor a non-empty `error` was present.
    Empty,
}

impl ChatResponse {
    /// Build a successful response body.
    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            error: None,
        }
    }

    /// Build an error response body.
    #[must_use]
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            response: None,
            error: Some(text.into()),
        }
    }

    /// Resolve the response into a single reply.
    ///
    /// A non-empty `error` wins over `response`. An empty `error` string is
    /// treated as absent.
    #[must_use]
    pub fn into_reply(self) -> ChatReply {
        match (self.response, self.error) {
            (response, Some(error)) if !error.is_empty() => {
                if response.is_some() {
                    tracing::warn!(
                        name: "chat.reply.anomaly",
                        kind = "both_present",
                        "Response carried both `response` and `error`; showing the error"
                    );
                }
                ChatReply::Error(error)
            }
            (Some(response), _) => ChatReply::Answer(response),
            (None, _) => {
                tracing::warn!(
                    name: "chat.reply.anomaly",
                    kind = "both_absent",
                    "Response carried neither `response` nor `error`"
                );
                ChatReply::Empty
            }
        }
    }
}
