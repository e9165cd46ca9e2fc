use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tickwise_models::SearchHit;
use tracing::debug;

use crate::capability::WebSearch;
use crate::error::DataError;

/// Brave Search web API client.
pub struct BraveSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BraveSearch {
    pub fn new(
        base_url: &str,
        api_key: String,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, DataError> {
        if api_key.trim().is_empty() {
            return Err(DataError::Config("Brave Search API key is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl WebSearch for BraveSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, DataError> {
        debug!(query, limit, "Brave web search");
        let count = limit.clamp(1, 20).to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                message: format!("Brave search for '{query}'"),
            });
        }

        let body = resp.text().await?;
        let mut hits = decode_results(&body)?;
        hits.truncate(limit);
        Ok(hits)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

fn decode_results(body: &str) -> Result<Vec<SearchHit>, DataError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("Brave search response: {e}")))?;

    Ok(response
        .web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .filter(|r| !r.url.is_empty())
        .map(|r| SearchHit {
            title: strip_tags(&r.title),
            url: r.url,
            snippet: strip_tags(&r.description),
        })
        .collect())
}

/// Brave highlights matches with inline `<strong>` tags.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}
