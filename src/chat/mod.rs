//! Coaching chat: HTTP client and conversation transcript.
//!
//! The transcript never surfaces a raw error. A failed request is logged
//! and answered with a canned reply that points at the phone line.
pub mod client;
pub mod conversation;

pub use client::{ChatClient, ChatReply};
pub use conversation::{ChatMessage, Conversation, Role, SendOutcome};
