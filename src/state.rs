use std::sync::Arc;

use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::{GeminiClient, SessionStore};
use crate::rag::{MemoryVectorStore, RagConfig, RagEngine, VectorStore};

/// Global application state shared across all routes.
///
/// Holds the shared HTTP client, the Gemini client, the chat session
/// registry, and the vector store behind the RAG engine.
pub struct AppState {
    pub settings: Settings,
    pub http: reqwest::Client,
    pub gemini: GeminiClient,
    pub sessions: SessionStore,
    pub store: Arc<dyn VectorStore>,
    pub rag: RagEngine,
}

impl AppState {
    pub fn initialize(settings: Settings) -> Result<Arc<Self>, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(ApiError::internal)?;

        let gemini = GeminiClient::new(&settings)?;
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::default());
        let rag = RagEngine::new(store.clone(), RagConfig::default());

        Ok(Arc::new(AppState {
            settings,
            http,
            gemini,
            sessions: SessionStore::new(),
            store,
            rag,
        }))
    }
}
