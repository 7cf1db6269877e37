//! Client for the coaching chat backend.
use serde::Deserialize;
use serde_json::Value;

use crate::analytics::events::{self, EventKind};
use crate::api::{ApiError, ApiRequest, Backend, decode};

pub const CHAT: &str = "/api/chat";
pub const QUICK_QUESTIONS: &str = "/api/quick-questions";
pub const HEALTH: &str = "/api/health";

/// The assistant's answer to one message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuickQuestions {
    #[serde(default)]
    questions: Vec<String>,
}

pub struct ChatClient<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ChatClient<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub fn base_url(&self) -> &str {
        self.backend.base_url()
    }

    /// `POST /api/chat`
    pub fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let mut body = serde_json::json!({ "message": message });
        if let Some(id) = conversation_id {
            body["conversation_id"] = Value::from(id);
        }
        let value = self.backend.send(&ApiRequest::post(CHAT, body))?;
        decode(self.backend, CHAT, value)
    }

    /// `GET /api/quick-questions`. A failure is logged and yields no
    /// questions.
    pub fn quick_questions(&self) -> Vec<String> {
        let result = self
            .backend
            .send(&ApiRequest::get(QUICK_QUESTIONS))
            .and_then(|value| decode::<QuickQuestions>(self.backend, QUICK_QUESTIONS, value));

        match result {
            Ok(reply) => reply.questions,
            Err(e) => {
                events::record(EventKind::QuickQuestionsFailed, QUICK_QUESTIONS, &e.to_string());
                Vec::new()
            }
        }
    }

    /// `GET /api/health` answered with any 2xx.
    pub fn is_healthy(&self) -> bool {
        self.backend.send(&ApiRequest::get(HEALTH)).is_ok()
    }
}
