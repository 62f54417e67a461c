//! Assistant chat transcript with canned replies.

use serde::{Deserialize, Serialize};

use crate::error::AiError;

pub const GREETING: &str = "Hello! I'm your CharterWise AI assistant. How can I help you with accounting, taxes, or auditing today?";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A question waiting for its assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    question: String,
}

impl PendingReply {
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The canned answer for this question.
    pub fn answer(&self) -> String {
        format!(
            "I understand your question about \"{}\". As your accounting AI assistant, I'd recommend reviewing the relevant section in our app. Would you like more specific guidance?",
            self.question
        )
    }
}

/// Ordered conversation, starting with the assistant greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Record a user question. Blank input is refused and not recorded.
    pub fn submit(&mut self, text: &str) -> Result<PendingReply, AiError> {
        if text.trim().is_empty() {
            return Err(AiError::InvalidInput("message is empty".to_string()));
        }
        self.messages.push(ChatMessage::user(text));
        Ok(PendingReply {
            question: text.to_string(),
        })
    }

    /// Append the assistant answer for a pending question.
    pub fn deliver(&mut self, reply: &PendingReply) -> &ChatMessage {
        self.messages.push(ChatMessage::assistant(reply.answer()));
        &self.messages[self.messages.len() - 1]
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let transcript = ChatTranscript::new();
        assert_eq!(transcript.messages(), &[ChatMessage::assistant(GREETING)]);
    }

    #[test]
    fn question_then_reply() {
        let mut transcript = ChatTranscript::new();
        let pending = transcript.submit("VAT on exports").unwrap();
        assert_eq!(transcript.messages().len(), 2);

        let reply = transcript.deliver(&pending).clone();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.content.starts_with("I understand your question about \"VAT on exports\"."));
        assert_eq!(transcript.messages().len(), 3);
    }

    #[test]
    fn blank_messages_are_ignored() {
        let mut transcript = ChatTranscript::new();
        assert!(matches!(transcript.submit("   "), Err(AiError::InvalidInput(_))));
        assert_eq!(transcript.messages().len(), 1);
    }
}
