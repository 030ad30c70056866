//! RAG (Retrieval-Augmented Generation) module.
//!
//! - `chunker`: splits source text into fixed word-count windows
//! - `store`: vector store trait and the in-memory implementation
//! - `engine`: indexing, retrieval, and the crawl-to-answer pipeline

pub mod chunker;
mod engine;
mod store;

pub use engine::{RagConfig, RagEngine};
pub use store::{ChunkSearchResult, MemoryVectorStore, StoredChunk, VectorStore};
