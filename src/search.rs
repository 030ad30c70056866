//! Web search via SerpAPI.

use reqwest::Client;
use serde_json::Value;

use crate::core::errors::ApiError;

const SERPAPI_URL: &str = "https://serpapi.com/search";
const RESULT_COUNT: usize = 3;

pub async fn web_search(client: &Client, api_key: &str, query: &str) -> Result<String, ApiError> {
    let url = format!(
        "{}?q={}&api_key={}&engine=google&num={}",
        SERPAPI_URL,
        urlencoding::encode(query),
        urlencoding::encode(api_key),
        RESULT_COUNT
    );

    let response = client.get(url).send().await.map_err(ApiError::internal)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Internal(format!(
            "SerpAPI error: {} {}",
            status, body
        )));
    }

    let payload: Value = response.json().await.map_err(ApiError::internal)?;
    Ok(format_search_results(&payload))
}

fn format_search_results(payload: &Value) -> String {
    let results = payload
        .get("organic_results")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    if results.is_empty() {
        return "No results found.".to_string();
    }

    let lines: Vec<String> = results
        .iter()
        .take(RESULT_COUNT)
        .map(|result| {
            let title = result.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let link = result.get("link").and_then(|v| v.as_str()).unwrap_or("");
            let snippet = result.get("snippet").and_then(|v| v.as_str()).unwrap_or("");
            format!("🔹 {}\n{}\n🔗 {}\n", title, snippet, link)
        })
        .collect();

    lines.join("\n")
}
