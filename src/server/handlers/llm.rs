//! The combined `/llm` endpoint.
//!
//! Content negotiation: JSON bodies carry a tagged `action` envelope,
//! multipart bodies carry file uploads for the `file_processing` action.
//! Required fields are validated here, before any downstream call.

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::files::{process_files, UploadedFile, DEFAULT_PROMPT};
use crate::llm::ChatMessage;
use crate::search::web_search;
use crate::state::AppState;

const DEFAULT_SESSION: &str = "default";
const DEFAULT_SCRAPE_PAGES: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Generate {
        prompt: Option<String>,
    },
    Chat {
        prompt: Option<String>,
        history: Option<Vec<ChatMessage>>,
        session_id: Option<String>,
    },
    Search {
        query: Option<String>,
    },
    ScrapeSite {
        url: Option<String>,
        question: Option<String>,
        max_pages: Option<usize>,
    },
}

pub async fn llm_router(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        return file_processing(&state, multipart).await;
    }

    if content_type.starts_with("application/json") {
        let Json(envelope) = Json::<Value>::from_request(req, &())
            .await
            .map_err(|_| invalid_action())?;
        let action: Action = serde_json::from_value(envelope).map_err(|_| invalid_action())?;
        return dispatch(&state, action).await;
    }

    Err(invalid_action())
}

async fn dispatch(state: &Arc<AppState>, action: Action) -> Result<Response, ApiError> {
    match action {
        Action::Generate { prompt } => {
            let prompt = require(prompt, "No prompt provided")?;
            let response = state.gemini.generate(&prompt).await?;
            Ok(respond(response))
        }
        Action::Chat {
            prompt,
            history,
            session_id,
        } => {
            let prompt = require(prompt, "No prompt provided")?;
            let session_id = session_id.unwrap_or_else(|| DEFAULT_SESSION.to_string());
            let reply = state
                .sessions
                .chat(&state.gemini, &session_id, &prompt, history)
                .await?;
            Ok(respond(reply))
        }
        Action::Search { query } => {
            let query = require(query, "No search query provided")?;
            let api_key = state
                .settings
                .serpapi_key
                .as_deref()
                .ok_or_else(|| ApiError::Internal("SERPAPI_KEY is not set".to_string()))?;
            let result = web_search(&state.http, api_key, &query).await?;
            Ok(respond(result))
        }
        Action::ScrapeSite {
            url,
            question,
            max_pages,
        } => {
            let (url, question) = match (url, question) {
                (Some(url), Some(question)) if !url.is_empty() && !question.is_empty() => {
                    (url, question)
                }
                _ => return Err(ApiError::BadRequest("Missing URL or question".to_string())),
            };

            let answer = state
                .rag
                .answer_from_site(
                    &state.gemini,
                    &state.http,
                    &url,
                    &question,
                    Some(max_pages.unwrap_or(DEFAULT_SCRAPE_PAGES)),
                )
                .await?;
            Ok(respond(answer))
        }
    }
}

async fn file_processing(
    state: &Arc<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut action: Option<String> = None;
    let mut prompt: Option<String> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "action" => action = Some(read_text_field(field).await?),
            "prompt" => prompt = Some(read_text_field(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file upload: {}", e)))?;
                files.push(UploadedFile {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    if action.as_deref() != Some("file_processing") {
        return Err(invalid_action());
    }
    if files.is_empty() {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    }

    let prompt = prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let result = process_files(&state.gemini, files, &prompt).await;
    Ok(respond(result))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {}", e)))
}

fn require(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::BadRequest(message.to_string())),
    }
}

fn respond(text: String) -> Response {
    Json(json!({ "response": text })).into_response()
}

fn invalid_action() -> ApiError {
    ApiError::BadRequest("Invalid action or unsupported content type".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_deserialize() {
        let action: Action =
            serde_json::from_value(json!({"action": "generate", "prompt": "hi"})).unwrap();
        assert!(matches!(action, Action::Generate { prompt: Some(p) } if p == "hi"));

        let action: Action = serde_json::from_value(json!({
            "action": "scrape_site",
            "url": "http://site.test",
            "question": "what?",
            "max_pages": 2
        }))
        .unwrap();
        assert!(matches!(
            action,
            Action::ScrapeSite {
                max_pages: Some(2),
                ..
            }
        ));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let action: Action = serde_json::from_value(json!({"action": "generate"})).unwrap();
        assert!(matches!(action, Action::Generate { prompt: None }));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<Action, _> = serde_json::from_value(json!({"action": "bogus"}));
        assert!(result.is_err());
    }

    #[test]
    fn require_rejects_missing_and_empty_values() {
        assert!(require(None, "missing").is_err());
        assert!(require(Some(String::new()), "missing").is_err());
        assert_eq!(require(Some("ok".to_string()), "missing").unwrap(), "ok");
    }
}
