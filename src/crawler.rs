//! Bounded same-origin site crawler.
//!
//! Seeds a pending stack with the start URL and pops LIFO, so traversal is
//! depth-first. Each page is fetched with a fixed timeout, paragraph text is
//! extracted, and hyperlinks sharing the seed's network origin are pushed.
//! Per-page failures are logged and skipped; they never abort the crawl.

use std::collections::HashSet;

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::core::errors::ApiError;

pub const DEFAULT_MAX_PAGES: usize = 10;
const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

pub struct SiteCrawler {
    client: Client,
    max_pages: usize,
}

#[derive(Debug)]
pub struct CrawlOutcome {
    /// Page texts concatenated with newlines, in processing order.
    pub text: String,
    /// Number of pages successfully fetched and parsed.
    pub pages_fetched: usize,
}

impl SiteCrawler {
    pub fn new(client: Client, max_pages: usize) -> Self {
        Self {
            client,
            max_pages: max_pages.max(1),
        }
    }

    pub async fn crawl(&self, seed: &str) -> Result<CrawlOutcome, ApiError> {
        let seed_url = Url::parse(seed)
            .map_err(|e| ApiError::BadRequest(format!("Invalid URL '{}': {}", seed, e)))?;

        let mut visited: HashSet<String> = HashSet::new();
        let mut pending: Vec<Url> = vec![seed_url.clone()];
        let mut contents: Vec<String> = Vec::new();
        let mut pages_fetched = 0;

        while visited.len() < self.max_pages {
            let Some(url) = pending.pop() else {
                break;
            };
            // Visited is marked before the fetch so a URL reachable through
            // several pages is attempted at most once per crawl.
            if !visited.insert(url.to_string()) {
                continue;
            }

            let html = match self.fetch_page(&url).await {
                Ok(html) => html,
                Err(err) => {
                    tracing::warn!("Error fetching {}: {}", url, err);
                    continue;
                }
            };

            contents.push(extract_paragraph_text(&html));
            pages_fetched += 1;

            for link in extract_links(&html, &url) {
                if same_origin(&link, &seed_url) && !visited.contains(link.as_str()) {
                    pending.push(link);
                }
            }
        }

        Ok(CrawlOutcome {
            text: contents.join("\n"),
            pages_fetched,
        })
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(ApiError::internal)?;
        response.text().await.map_err(ApiError::internal)
    }
}

/// Text of all `<p>` elements with non-empty trimmed content, one per line.
pub fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let paragraphs = Selector::parse("p").expect("static selector");

    document
        .select(&paragraphs)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// All `a[href]` targets resolved to absolute URLs against the page URL.
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .collect()
}

/// Network-origin comparison: host plus explicit port. The scheme is not
/// part of the origin here, matching host-based crawl scoping.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <p>  First paragraph.  </p>
            <p></p>
            <p>   </p>
            <div><p>Nested <b>bold</b> paragraph.</p></div>
            <a href="/relative">rel</a>
            <a href="http://site.test/absolute">abs</a>
            <a href="https://elsewhere.test/away">ext</a>
            <a id="no-href">skip</a>
        </body></html>
    "#;

    #[test]
    fn paragraph_text_skips_empty_paragraphs() {
        let text = extract_paragraph_text(PAGE);
        assert_eq!(text, "First paragraph.\nNested bold paragraph.");
    }

    #[test]
    fn links_are_resolved_against_the_page_url() {
        let page_url = Url::parse("http://site.test/dir/page").unwrap();
        let links = extract_links(PAGE, &page_url);
        let as_strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();

        assert_eq!(
            as_strings,
            vec![
                "http://site.test/relative".to_string(),
                "http://site.test/absolute".to_string(),
                "https://elsewhere.test/away".to_string(),
            ]
        );
    }

    #[test]
    fn origin_comparison_uses_host_and_port() {
        let seed = Url::parse("http://site.test:8080/").unwrap();

        let same = Url::parse("http://site.test:8080/deep/page").unwrap();
        assert!(same_origin(&same, &seed));

        let other_host = Url::parse("http://other.test:8080/").unwrap();
        assert!(!same_origin(&other_host, &seed));

        let other_port = Url::parse("http://site.test:9090/").unwrap();
        assert!(!same_origin(&other_port, &seed));
    }
}
