//! Crypto news feed client.

use contenthub_shared::{CryptoNewsItem, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{ApiClient, FailureKind, read_json};

#[derive(Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    news: Vec<CryptoNewsItem>,
}

/// Client for the `/crypto-news` collection.
#[derive(Debug, Clone)]
pub struct CryptoNewsClient {
    api: ApiClient,
}

impl CryptoNewsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Headlines cached by the backend from the last crawl.
    pub async fn cached(&self) -> Result<Vec<CryptoNewsItem>> {
        let url = self.api.endpoint(&["crypto-news"]);
        let response = self
            .api
            .send(self.api.request(Method::GET, &url), &url, FailureKind::Crud)
            .await?;
        read_json(response, &url).await
    }

    /// Crawl fresh headlines now.
    #[instrument(skip_all)]
    pub async fn crawl(&self) -> Result<Vec<CryptoNewsItem>> {
        let url = self.api.endpoint(&["crypto-news", "crawl"]);
        let response = self
            .api
            .send(self.api.request(Method::GET, &url), &url, FailureKind::Generation)
            .await?;
        let crawled: CrawlResponse = read_json(response, &url).await?;
        info!(count = crawled.news.len(), "crawled crypto news");
        Ok(crawled.news)
    }

    /// Delete one headline; already-deleted counts as success.
    #[instrument(skip_all, fields(news_id = id))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.api.endpoint(&["crypto-news", id]);
        match self
            .api
            .send(self.api.request(Method::DELETE, &url), &url, FailureKind::Crud)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("news item already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
