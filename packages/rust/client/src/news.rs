//! News Distributor client: RSS articles and day-batch vocabulary extraction.

use contenthub_shared::{Article, Result, VocabularyEntry};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{ApiClient, FailureKind, read_json};

/// Outcome of an RSS refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    #[serde(default)]
    pub articles_saved: u64,
    #[serde(default)]
    pub articles_updated: u64,
    #[serde(default)]
    pub total_articles: u64,
}

/// Outcome of a vocabulary extraction over one day's articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub processed_articles: u64,
    #[serde(default)]
    pub total_vocab_extracted: u64,
    #[serde(default)]
    pub new_vocab_count: u64,
    #[serde(default)]
    pub total_vocab_count: u64,
    /// Ready-to-publish vocabulary post.
    #[serde(default)]
    pub output_content: String,
}

#[derive(Deserialize)]
struct ArticleList {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct DateList {
    #[serde(default)]
    dates: Vec<String>,
}

#[derive(Deserialize)]
struct VocabularyList {
    #[serde(default)]
    vocabulary: Vec<VocabularyEntry>,
}

#[derive(Deserialize)]
struct VocabularyCount {
    #[serde(default)]
    total_vocabulary: u64,
}

#[derive(Deserialize)]
struct ResetReport {
    #[serde(default)]
    deleted_count: u64,
}

/// Client for the `/news-distributor` collection.
#[derive(Debug, Clone)]
pub struct NewsDistributorClient {
    api: ApiClient,
}

impl NewsDistributorClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, segment: &str) -> Result<T> {
        let url = self.api.endpoint(&["news-distributor", segment]);
        let response = self
            .api
            .send(self.api.request(Method::GET, &url), &url, FailureKind::Crud)
            .await?;
        read_json(response, &url).await
    }

    /// All stored articles.
    pub async fn articles(&self) -> Result<Vec<Article>> {
        let list: ArticleList = self.get("articles").await?;
        Ok(list.articles)
    }

    /// Days (`YYYY-MM-DD`) that have at least one article.
    pub async fn available_dates(&self) -> Result<Vec<String>> {
        let list: DateList = self.get("available-dates").await?;
        Ok(list.dates)
    }

    /// The whole vocabulary store.
    pub async fn vocabulary(&self) -> Result<Vec<VocabularyEntry>> {
        let list: VocabularyList = self.get("vocabulary").await?;
        Ok(list.vocabulary)
    }

    pub async fn vocabulary_count(&self) -> Result<u64> {
        let count: VocabularyCount = self.get("vocabulary-count").await?;
        Ok(count.total_vocabulary)
    }

    /// Ask the backend to poll the RSS feed now.
    #[instrument(skip_all)]
    pub async fn refresh_rss(&self) -> Result<RefreshReport> {
        let url = self.api.endpoint(&["news-distributor", "refresh-rss"]);
        let response = self
            .api
            .send(self.api.request(Method::POST, &url), &url, FailureKind::Generation)
            .await?;
        let report: RefreshReport = read_json(response, &url).await?;
        info!(
            saved = report.articles_saved,
            updated = report.articles_updated,
            total = report.total_articles,
            "RSS feed refreshed"
        );
        Ok(report)
    }

    /// Extract vocabulary from every article of `selected_date`
    /// (`YYYY-MM-DD`), or from all articles when `None`.
    #[instrument(skip_all, fields(date = selected_date.unwrap_or("all")))]
    pub async fn auto_extract(&self, selected_date: Option<&str>) -> Result<ExtractionReport> {
        let mut url = self.api.endpoint(&["news-distributor", "auto-extract"]);
        if let Some(date) = selected_date {
            url.query_pairs_mut().append_pair("selected_date", date);
        }

        let response = self
            .api
            .send(self.api.request(Method::POST, &url), &url, FailureKind::Generation)
            .await?;
        let report: ExtractionReport = read_json(response, &url).await?;
        info!(
            articles = report.total_articles,
            extracted = report.total_vocab_extracted,
            new = report.new_vocab_count,
            "vocabulary extracted"
        );
        Ok(report)
    }

    /// Wipe the vocabulary store. Returns how many entries were deleted.
    #[instrument(skip_all)]
    pub async fn reset_vocabulary(&self) -> Result<u64> {
        let url = self.api.endpoint(&["news-distributor", "reset-vocabulary"]);
        let response = self
            .api
            .send(self.api.request(Method::DELETE, &url), &url, FailureKind::Crud)
            .await?;
        let report: ResetReport = read_json(response, &url).await?;
        info!(deleted = report.deleted_count, "vocabulary reset");
        Ok(report.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::client_for;
    use contenthub_shared::ContentHubError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn extract_passes_selected_date() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news-distributor/auto-extract"))
            .and(query_param("selected_date", "2025-10-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_articles": 4,
                "processed_articles": 4,
                "total_vocab_extracted": 18,
                "new_vocab_count": 11,
                "total_vocab_count": 240,
                "output_content": "1. staking: đặt cược"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsDistributorClient::new(client_for(&server));
        let report = client.auto_extract(Some("2025-10-01")).await.unwrap();
        assert_eq!(report.new_vocab_count, 11);
        assert_eq!(report.total_vocab_count, 240);
        assert!(report.output_content.starts_with("1. staking"));
    }

    #[tokio::test]
    async fn extract_failure_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news-distributor/auto-extract"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({ "detail": "Failed to auto-extract vocabulary" }),
            ))
            .mount(&server)
            .await;

        let client = NewsDistributorClient::new(client_for(&server));
        let err = client.auto_extract(None).await.unwrap_err();
        assert!(matches!(err, ContentHubError::Generation(_)));
    }

    #[tokio::test]
    async fn list_endpoints_unwrap_envelopes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news-distributor/available-dates"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "dates": ["2025-10-02", "2025-10-01"] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/news-distributor/vocabulary-count"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "total_vocabulary": 7 })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/news-distributor/vocabulary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "vocabulary": [
                    {
                        "original_word": "Staking",
                        "vietnamese_definition": "đặt cược",
                        "source_article_title": "ETH update"
                    }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/news-distributor/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "articles": [
                    {
                        "id": "a1",
                        "title": "ETH update",
                        "description": "",
                        "link": "https://news.example.com/eth",
                        "published_date": "2025-10-02T07:00:00+00:00"
                    }
                ],
                "total": 1
            })))
            .mount(&server)
            .await;

        let client = NewsDistributorClient::new(client_for(&server));
        assert_eq!(client.available_dates().await.unwrap().len(), 2);
        assert_eq!(client.vocabulary_count().await.unwrap(), 7);
        assert_eq!(client.vocabulary().await.unwrap()[0].original_word, "Staking");
        assert_eq!(client.articles().await.unwrap()[0].id, "a1");
    }

    #[tokio::test]
    async fn refresh_and_reset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news-distributor/refresh-rss"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "articles_saved": 3, "articles_updated": 1, "total_articles": 42
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/news-distributor/reset-vocabulary"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "deleted_count": 240 })),
            )
            .mount(&server)
            .await;

        let client = NewsDistributorClient::new(client_for(&server));
        let report = client.refresh_rss().await.unwrap();
        assert_eq!(report.total_articles, 42);
        assert_eq!(client.reset_vocabulary().await.unwrap(), 240);
    }
}
