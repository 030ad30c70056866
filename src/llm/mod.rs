mod gemini;
mod session;
mod types;

pub use gemini::GeminiClient;
pub use session::SessionStore;
pub use types::ChatMessage;
