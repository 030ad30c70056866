use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            content: content.into(),
        }
    }

    /// Gemini knows two conversational roles. Anything a frontend may
    /// send for the reply side ("assistant", "ai", "model") maps to
    /// `model`; everything else is treated as `user`.
    pub fn gemini_role(&self) -> &'static str {
        match self.role.as_str() {
            "model" | "assistant" | "ai" => "model",
            _ => "user",
        }
    }
}
