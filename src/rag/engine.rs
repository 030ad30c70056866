//! RAG engine: indexing, retrieval, and the crawl-to-answer pipeline.

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::crawler::{SiteCrawler, DEFAULT_MAX_PAGES};
use crate::llm::GeminiClient;
use crate::rag::chunker::{chunk_text, DEFAULT_CHUNK_SIZE};
use crate::rag::store::{StoredChunk, VectorStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk size in words.
    pub chunk_size: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
    /// Crawl bound when the caller does not supply one.
    pub max_pages: usize,
    /// Overall deadline for the crawl-index-retrieve-generate pipeline.
    pub deadline_secs: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_k: 3,
            max_pages: DEFAULT_MAX_PAGES,
            deadline_secs: 120,
        }
    }
}

#[derive(Clone)]
pub struct RagEngine {
    store: Arc<dyn VectorStore>,
    config: RagConfig,
}

impl RagEngine {
    pub fn new(store: Arc<dyn VectorStore>, config: RagConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Chunk, embed, and store `text` under `url`. Returns the number of
    /// chunks inserted (duplicates of already-indexed content are skipped).
    pub async fn index_content(
        &self,
        gemini: &GeminiClient,
        url: &str,
        text: &str,
    ) -> Result<usize, ApiError> {
        let chunks = chunk_text(text, self.config.chunk_size);
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = gemini.embed(&chunks).await?;
        let items: Vec<(StoredChunk, Vec<f32>)> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(content, embedding)| (StoredChunk::new(url, content), embedding))
            .collect();

        let inserted = self.store.insert_batch(items).await?;
        tracing::info!("Indexed {} new chunk(s) for {}", inserted, url);
        Ok(inserted)
    }

    /// Embed the question and return the `top_k` most similar chunk texts,
    /// closest first. An empty collection yields an empty vec.
    pub async fn retrieve_context(
        &self,
        gemini: &GeminiClient,
        question: &str,
    ) -> Result<Vec<String>, ApiError> {
        let mut embeddings = gemini.embed(&[question.to_string()]).await?;
        let query = embeddings.pop().ok_or_else(|| {
            ApiError::Internal("Embedding response contained no query vector".to_string())
        })?;

        let results = self.store.search(&query, self.config.top_k).await?;
        Ok(results.into_iter().map(|r| r.chunk.content).collect())
    }

    /// Crawl the site, index what was found under the seed URL, retrieve
    /// context for the question, and generate the final answer. The whole
    /// pipeline runs under one overall deadline on top of the crawler's
    /// per-fetch timeout.
    pub async fn answer_from_site(
        &self,
        gemini: &GeminiClient,
        http: &Client,
        url: &str,
        question: &str,
        max_pages: Option<usize>,
    ) -> Result<String, ApiError> {
        let deadline = std::time::Duration::from_secs(self.config.deadline_secs);
        let pipeline = self.run_pipeline(gemini, http, url, question, max_pages);

        tokio::time::timeout(deadline, pipeline)
            .await
            .map_err(|_| {
                ApiError::Internal(format!(
                    "Scrape-and-answer deadline of {}s exceeded for {}",
                    self.config.deadline_secs, url
                ))
            })?
    }

    async fn run_pipeline(
        &self,
        gemini: &GeminiClient,
        http: &Client,
        url: &str,
        question: &str,
        max_pages: Option<usize>,
    ) -> Result<String, ApiError> {
        let crawler = SiteCrawler::new(http.clone(), max_pages.unwrap_or(self.config.max_pages));
        let outcome = crawler.crawl(url).await?;
        tracing::info!("Crawled {} page(s) from {}", outcome.pages_fetched, url);

        self.index_content(gemini, url, &outcome.text).await?;

        let context_chunks = self.retrieve_context(gemini, question).await?;
        let prompt = build_prompt(url, &context_chunks, question);

        gemini.generate(&prompt).await
    }
}

/// Composite prompt combining the retrieved context with the question.
pub fn build_prompt(url: &str, context_chunks: &[String], question: &str) -> String {
    let context = context_chunks.join("\n");
    format!(
        "Use the following context from {} to answer:\n\n{}\n\nQ: {}",
        url, context, question
    )
}
