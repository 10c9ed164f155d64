use super::types::*;
use super::ItemFeed;
use crate::config::{FeedConfig, SortOrder};
use crate::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Permalinks in the listing are site-relative.
const PERMALINK_BASE: &str = "https://www.reddit.com";

pub struct RedditFeed {
    client: Client,
    base_url: String,
    sort: SortOrder,
    limit: u32,
}

impl RedditFeed {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WatchError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sort: config.sort,
            limit: config.limit,
        })
    }

    fn build_url(&self, source: &str) -> String {
        format!(
            "{}/r/{}/{}.json?limit={}",
            self.base_url,
            source,
            self.sort.as_str(),
            self.limit
        )
    }
}

#[async_trait]
impl ItemFeed for RedditFeed {
    async fn fetch_items(&mut self, source: &str) -> Result<Vec<Item>> {
        let url = self.build_url(source);
        tracing::debug!(url = %url, "fetching listing");

        let resp = self.client.get(&url).send().await.map_err(|e| WatchError::Fetch {
            subreddit: source.to_string(),
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WatchError::Fetch {
                subreddit: source.to_string(),
                status: Some(status.as_u16()),
                message: truncate(&body, 200),
            });
        }

        let body = resp.text().await.map_err(|e| WatchError::Fetch {
            subreddit: source.to_string(),
            status: Some(status.as_u16()),
            message: format!("failed to read body: {}", e),
        })?;

        parse_listing(&body).map_err(|e| WatchError::Parse {
            subreddit: source.to_string(),
            message: e.to_string(),
        })
    }
}

/// Flatten a listing body into items, preserving feed order.
pub fn parse_listing(json: &str) -> serde_json::Result<Vec<Item>> {
    let listing: Listing = serde_json::from_str(json)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let p = child.data;
            Item {
                permalink: absolute_permalink(&p.permalink),
                id: p.id,
                title: p.title,
                url: p.url,
                domain: p.domain,
            }
        })
        .collect())
}

fn absolute_permalink(permalink: &str) -> String {
    if permalink.starts_with("http://") || permalink.starts_with("https://") {
        permalink.to_string()
    } else {
        format!("{}{}", PERMALINK_BASE, permalink)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
