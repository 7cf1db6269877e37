/// Chat client and conversation tests.
mod common;

use common::{MockBackend, unreachable};
use ironlady::api::Method;
use ironlady::chat::client::{CHAT, QUICK_QUESTIONS};
use ironlady::chat::{ChatClient, Conversation, Role, SendOutcome};
use serde_json::json;

#[test]
fn reply_is_appended_and_conversation_id_reused() {
    let backend = MockBackend::new(|req| {
        assert_eq!(req.path, CHAT);
        Ok(json!({
            "message": "Let's plan your path to the boardroom.",
            "conversation_id": "abc-123",
            "suggestions": ["What is the 100 Board Members program?"]
        }))
    });
    let client = ChatClient::new(&backend);
    let mut convo = Conversation::default();

    assert_eq!(convo.send(&client, "How can I reach C-suite level?"), SendOutcome::Replied);
    assert_eq!(convo.send(&client, "And then?"), SendOutcome::Replied);

    let messages = convo.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(convo.conversation_id(), Some("abc-123"));
    assert_eq!(convo.suggestions().len(), 1);

    let calls = backend.calls();
    let first = calls[0].body.as_ref().unwrap();
    assert_eq!(first["message"], "How can I reach C-suite level?");
    assert!(first.get("conversation_id").is_none());
    let second = calls[1].body.as_ref().unwrap();
    assert_eq!(second["conversation_id"], "abc-123");
}

#[test]
fn failure_appends_fallback_with_phone() {
    let backend = MockBackend::new(|req| Err(unreachable(req)));
    let client = ChatClient::new(&backend);
    let mut convo = Conversation::new("+91-9999999999");

    assert_eq!(convo.send(&client, "Help!"), SendOutcome::Fallback);

    let last = convo.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.contains("+91-9999999999"));
    assert!(!convo.is_busy());
}

#[test]
fn blank_input_sends_nothing() {
    let backend = MockBackend::new(|_| Ok(json!({ "message": "hi" })));
    let client = ChatClient::new(&backend);
    let mut convo = Conversation::default();

    assert_eq!(convo.send(&client, "   "), SendOutcome::Ignored);
    assert_eq!(convo.messages().len(), 1);
    assert!(backend.calls().is_empty());
}

#[test]
fn input_while_busy_is_ignored() {
    let mut convo = Conversation::default();
    assert_eq!(convo.begin("first").as_deref(), Some("first"));
    assert!(convo.is_busy());
    assert!(convo.begin("second").is_none());
    assert_eq!(convo.messages().len(), 2);
}

#[test]
fn quick_questions_are_fetched() {
    let backend = MockBackend::new(|req| {
        assert_eq!((req.method, req.path.as_str()), (Method::Get, QUICK_QUESTIONS));
        Ok(json!({ "questions": ["One?", "Two?"] }))
    });
    let client = ChatClient::new(&backend);
    assert_eq!(client.quick_questions(), vec!["One?", "Two?"]);
}

#[test]
fn quick_questions_failure_yields_none() {
    let backend = MockBackend::new(|req| Err(unreachable(req)));
    let client = ChatClient::new(&backend);
    assert!(client.quick_questions().is_empty());
    assert!(!client.is_healthy());
}
