//! Google Gemini API client.
//!
//! Thin REST client over the generative-language API: text generation,
//! multi-turn chat, vision requests with inline image data, and batch
//! embeddings. Auth is a `?key=` query parameter.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::types::ChatMessage;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TEXT_MODEL: &str = "gemini-2.0-flash";
const VISION_MODEL: &str = "gemini-2.0-flash";
const EMBED_MODEL: &str = "text-embedding-004";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let base_url = settings
            .gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: settings.gemini_api_key.clone(),
        })
    }

    /// Single-shot text generation. Returns the first candidate's text verbatim.
    pub async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let contents = json!([{
            "role": "user",
            "parts": [{"text": prompt}],
        }]);
        self.generate_content(TEXT_MODEL, contents).await
    }

    /// Multi-turn generation over a full transcript.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ApiError> {
        let contents: Vec<Value> = messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.gemini_role(),
                    "parts": [{"text": msg.content}],
                })
            })
            .collect();
        self.generate_content(TEXT_MODEL, Value::Array(contents)).await
    }

    /// Vision request: prompt plus one inline image.
    pub async fn generate_with_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, ApiError> {
        let contents = json!([{
            "role": "user",
            "parts": [
                {"text": prompt},
                {"inline_data": {"mime_type": mime_type, "data": BASE64.encode(image)}},
            ],
        }]);
        self.generate_content(VISION_MODEL, contents).await
    }

    /// Embed a batch of texts. Index and query must share this model so
    /// stored and query vectors live in the same embedding space.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let requests: Vec<Value> = inputs
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{}", EMBED_MODEL),
                    "content": {"parts": [{"text": text}]},
                })
            })
            .collect();

        let url = self.endpoint_url(EMBED_MODEL, "batchEmbedContents");
        let payload = self.post_json(&url, &json!({"requests": requests})).await?;

        let embeddings = payload
            .get("embeddings")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                ApiError::Internal("Missing 'embeddings' array in embedding response".to_string())
            })?;

        let vectors: Vec<Vec<f32>> = embeddings
            .iter()
            .map(|item| {
                item.get("values")
                    .and_then(|v| v.as_array())
                    .map(|vals| {
                        vals.iter()
                            .filter_map(|v| v.as_f64().map(|f| f as f32))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect();

        if vectors.len() != inputs.len() {
            return Err(ApiError::Internal(format!(
                "Embedding count mismatch: requested {}, got {}",
                inputs.len(),
                vectors.len()
            )));
        }

        Ok(vectors)
    }

    async fn generate_content(&self, model: &str, contents: Value) -> Result<String, ApiError> {
        let url = self.endpoint_url(model, "generateContent");
        let payload = self.post_json(&url, &json!({"contents": contents})).await?;
        parse_candidate_text(&payload)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        tracing::debug!(url, "Sending Gemini request");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("Request to Gemini API failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::Internal(format!(
                "HTTP {} from Gemini API: {}",
                status, text
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::Internal(format!("Invalid JSON in Gemini response: {}", e)))
    }

    fn endpoint_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, model, method, self.api_key
        )
    }
}

/// Extract the text of the first candidate, joining multiple text parts.
fn parse_candidate_text(payload: &Value) -> Result<String, ApiError> {
    let candidates = payload
        .get("candidates")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            ApiError::Internal("Missing 'candidates' array in Gemini response".to_string())
        })?;

    let candidate = candidates.first().ok_or_else(|| {
        ApiError::Internal("Empty 'candidates' array in Gemini response".to_string())
    })?;

    let parts = candidate
        .pointer("/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            ApiError::Internal("Missing 'parts' array in Gemini candidate".to_string())
        })?;

    let text: Vec<&str> = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    Ok(text.join(""))
}
