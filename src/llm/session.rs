//! Per-session chat transcripts.
//!
//! Each caller-supplied session id owns an ordered transcript of turns.
//! A request may supply its own `history`, which re-seeds the transcript
//! before the new turn is appended, so the chat endpoint works both
//! statefully (server keeps the transcript) and statelessly (caller
//! sends the full history each time).

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::core::errors::ApiError;
use crate::llm::gemini::GeminiClient;
use crate::llm::types::ChatMessage;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one chat turn against a session. The lock is held across the
    /// model call so concurrent turns on the same store cannot interleave
    /// their transcript updates.
    pub async fn chat(
        &self,
        gemini: &GeminiClient,
        session_id: &str,
        prompt: &str,
        history: Option<Vec<ChatMessage>>,
    ) -> Result<String, ApiError> {
        let mut sessions = self.sessions.lock().await;
        let transcript = sessions.entry(session_id.to_string()).or_default();

        if let Some(history) = history {
            *transcript = history;
        }
        transcript.push(ChatMessage::user(prompt));

        let reply = gemini.chat(transcript).await?;
        transcript.push(ChatMessage::model(reply.clone()));

        Ok(reply)
    }

    /// Number of turns currently recorded for a session.
    pub async fn transcript_len(&self, session_id: &str) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).map(|t| t.len()).unwrap_or(0)
    }
}
