use shared::domain::{ConversationTurn, Sender};

use crate::{
    dispatcher::{Dispatcher, Reply},
    store::LocationSnapshot,
};

/// One assistant conversation, oldest turn first.
pub struct ChatSession {
    dispatcher: Dispatcher,
    turns: Vec<ConversationTurn>,
}

impl ChatSession {
    pub fn new(dispatcher: Dispatcher, location: &str) -> Self {
        let greeting = format!(
            "Hello! I am your AirGuard assistant. I can tell you about the air quality in {location}."
        );
        Self {
            dispatcher,
            turns: vec![ConversationTurn::new(Sender::Bot, greeting)],
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Appends the user's message and the assistant's answer. Blank input is
    /// ignored and yields `None`.
    pub async fn send(&mut self, text: &str, snapshot: &LocationSnapshot) -> Option<Reply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.turns.push(ConversationTurn::new(Sender::User, text));
        let reply = self.dispatcher.respond(text, snapshot).await;
        self.turns
            .push(ConversationTurn::new(Sender::Bot, reply.text.clone()));
        Some(reply)
    }
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
