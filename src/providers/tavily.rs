use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::core::narrative::{NewsProvider, NewsSnippet};

/// Client for the Tavily web search API, used to gather recent company news.
pub struct TavilyProvider {
    base_url: String,
    api_key: String,
}

impl TavilyProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        TavilyProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    title: String,
    url: String,
    content: String,
}

#[async_trait]
impl NewsProvider for TavilyProvider {
    #[instrument(name = "NewsSearch", skip(self), fields(query = %query))]
    async fn search_news(&self, query: &str, limit: usize) -> Result<Vec<NewsSnippet>> {
        let url = format!("{}/search", self.base_url);
        debug!("Requesting news search from {}", url);

        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "topic": "news",
            "max_results": limit,
        });

        let client = reqwest::Client::builder().user_agent("omaha/1.0").build()?;
        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for query: {}", e, query))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for query: {}",
                response.status(),
                query
            ));
        }

        let data = response.json::<SearchResponse>().await?;
        Ok(data
            .results
            .into_iter()
            .map(|r| NewsSnippet {
                title: r.title,
                url: r.url,
                content: r.content,
            })
            .collect())
    }
}
