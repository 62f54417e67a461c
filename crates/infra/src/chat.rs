//! Assistant chat with a delayed canned reply.

use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use charterwise_ai::{AiError, ChatMessage, ChatTranscript};

#[derive(Debug)]
pub struct ChatResponder {
    delay: Duration,
    transcript: Mutex<ChatTranscript>,
}

impl ChatResponder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            transcript: Mutex::new(ChatTranscript::new()),
        }
    }

    /// Post a question and wait for the answer.
    ///
    /// Blank input returns `Ok(None)` and leaves the transcript alone.
    pub async fn ask(&self, text: &str) -> Result<Option<ChatMessage>, AiError> {
        let pending = {
            let mut transcript = self.lock()?;
            match transcript.submit(text) {
                Ok(pending) => pending,
                Err(AiError::InvalidInput(_)) => return Ok(None),
                Err(other) => return Err(other),
            }
        };

        debug!(chars = pending.question().len(), "chat question received");
        tokio::time::sleep(self.delay).await;

        let mut transcript = self.lock()?;
        Ok(Some(transcript.deliver(&pending).clone()))
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript
            .lock()
            .map(|t| t.messages().to_vec())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ChatTranscript>, AiError> {
        self.transcript
            .lock()
            .map_err(|_| AiError::Unavailable("chat transcript lock poisoned".to_string()))
    }
}
