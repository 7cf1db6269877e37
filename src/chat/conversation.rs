//! Chat transcript state.
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::client::{ChatClient, ChatReply};
use crate::analytics::events::{self, EventKind};
use crate::api::ApiError;

pub const WELCOME: &str = "Welcome to Iron Lady! 🔥 I'm here to help you break through career plateaus, embrace unapologetic ambition, and join our 78,000+ Women Leaders' Ecosystem. Are you ready to WIN? What breakthrough are you seeking - C-suite advancement, business growth, or mindset transformation?";

pub const DEFAULT_CONTACT_PHONE: &str = "+91-6360823123";

/// Suggestion chips offered when the server has none.
pub const DEFAULT_QUICK_QUESTIONS: [&str; 4] = [
    "How can I reach C-suite level?",
    "Tell me about Business War Tactics",
    "I'm stuck in my career, help!",
    "How do I develop a winning mindset?",
];

/// Reply shown in place of a failed answer.
pub fn fallback_message(phone: &str) -> String {
    format!(
        "I'm having trouble connecting right now. Don't let this stop you! Call us directly at {phone} or try again in a moment."
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of offering one line of input to the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or a message is already in flight. Nothing was sent.
    Ignored,
    Replied,
    /// The request failed and the fallback reply was appended.
    Fallback,
}

/// One chat thread: messages in order, the server's conversation id and
/// its latest suggestions.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    conversation_id: Option<String>,
    suggestions: Vec<String>,
    busy: bool,
    contact_phone: String,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_CONTACT_PHONE)
    }
}

impl Conversation {
    /// A fresh thread opened by the welcome message.
    pub fn new(contact_phone: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, WELCOME)],
            conversation_id: None,
            suggestions: Vec::new(),
            busy: false,
            contact_phone: contact_phone.to_string(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Send `input` and append the answer (or the fallback).
    pub fn send(&mut self, client: &ChatClient<'_>, input: &str) -> SendOutcome {
        let Some(message) = self.begin(input) else {
            return SendOutcome::Ignored;
        };
        let reply = client.send_message(&message, self.conversation_id.as_deref());
        self.finish(reply)
    }

    /// Accept `input` as the next user message and mark the thread busy.
    /// Returns the text to send, or `None` when the input is ignored.
    pub fn begin(&mut self, input: &str) -> Option<String> {
        if self.busy || input.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(Role::User, input));
        self.busy = true;
        Some(input.to_string())
    }

    /// Record the outcome of the request started by [`begin`](Self::begin).
    pub fn finish(&mut self, reply: Result<ChatReply, ApiError>) -> SendOutcome {
        self.busy = false;
        match reply {
            Ok(reply) => {
                if let Some(id) = reply.conversation_id.filter(|id| !id.is_empty()) {
                    self.conversation_id = Some(id);
                }
                if let Some(suggestions) = reply.suggestions {
                    self.suggestions = suggestions;
                }
                self.messages.push(ChatMessage::new(Role::Assistant, reply.message));
                SendOutcome::Replied
            }
            Err(e) => {
                events::record(EventKind::ChatFallback, super::client::CHAT, &e.to_string());
                self.messages
                    .push(ChatMessage::new(Role::Assistant, fallback_message(&self.contact_phone)));
                SendOutcome::Fallback
            }
        }
    }
}
