//! Core domain types for ContentHub projects and news collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ContentHubError, Result};

// ---------------------------------------------------------------------------
// ProjectId
// ---------------------------------------------------------------------------

/// Opaque backend-assigned project identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// ProjectOrigin
// ---------------------------------------------------------------------------

/// Where a project's content was ingested from. Serializes to the create
/// request body: `{"source_url": ...}` or `{"raw_text": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProjectOrigin {
    /// Scraped by the backend from a web page.
    #[serde(rename = "source_url")]
    Url(String),
    /// Pasted text, stored as-is.
    #[serde(rename = "raw_text")]
    Text(String),
}

impl ProjectOrigin {
    /// Build an origin from optional form inputs. Exactly one must be
    /// non-blank; a URL must be absolute http(s).
    pub fn from_inputs(source_url: Option<&str>, raw_text: Option<&str>) -> Result<Self> {
        let url = source_url.map(str::trim).filter(|s| !s.is_empty());
        let text = raw_text.filter(|s| !s.trim().is_empty());

        let origin = match (url, text) {
            (Some(_), Some(_)) => {
                return Err(ContentHubError::validation(
                    "provide either source_url or raw_text, not both",
                ));
            }
            (None, None) => {
                return Err(ContentHubError::validation(
                    "either source_url or raw_text must be provided",
                ));
            }
            (Some(url), None) => Self::Url(url.to_string()),
            (None, Some(text)) => Self::Text(text.to_string()),
        };
        origin.validate()?;
        Ok(origin)
    }

    /// Check that the payload is usable for ingestion: non-blank, and an
    /// absolute http(s) URL for the `Url` variant.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Text(text) if text.trim().is_empty() => Err(ContentHubError::validation(
                "either source_url or raw_text must be provided",
            )),
            Self::Text(_) => Ok(()),
            Self::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(ContentHubError::validation(
                        "either source_url or raw_text must be provided",
                    ));
                }
                let parsed = Url::parse(url).map_err(|e| {
                    ContentHubError::validation(format!("invalid source URL '{url}': {e}"))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ContentHubError::validation(format!(
                        "source URL must use http or https: {url}"
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

// ---------------------------------------------------------------------------
// SocialContent
// ---------------------------------------------------------------------------

/// Generated social-media copy for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<String>,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A unit of content work: one ingested source plus its derived artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Backend-assigned identifier.
    pub id: ProjectId,
    /// Display title (scraped page title or a placeholder for text).
    #[serde(default)]
    pub title: String,
    /// Set when the project was scraped from a URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Set when the project was created from pasted text and the backend echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Ingested HTML or text.
    #[serde(default)]
    pub original_content: String,
    /// Latest successful translation or saved edit.
    #[serde(default)]
    pub translated_content: Option<String>,
    /// Latest successful social generation.
    #[serde(default)]
    pub social_content: Option<SocialContent>,
    /// Local paths of images the backend downloaded while scraping.
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// The single ingestion origin of this project.
    pub fn origin(&self) -> ProjectOrigin {
        match &self.source_url {
            Some(url) => ProjectOrigin::Url(url.clone()),
            None => ProjectOrigin::Text(
                self.raw_text
                    .clone()
                    .unwrap_or_else(|| self.original_content.clone()),
            ),
        }
    }

    /// Translated content if present, otherwise the original.
    pub fn current_text(&self) -> &str {
        self.translated_content
            .as_deref()
            .unwrap_or(&self.original_content)
    }

    /// The Facebook post, if social content has been generated.
    pub fn facebook_post(&self) -> Option<&str> {
        self.social_content
            .as_ref()
            .and_then(|s| s.facebook.as_deref())
    }
}

/// Partial update sent with `PUT /projects/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_content: Option<String>,
}

impl ProjectPatch {
    pub fn translated_content(text: impl Into<String>) -> Self {
        Self {
            translated_content: Some(text.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.translated_content.is_none()
    }
}

// ---------------------------------------------------------------------------
// News Distributor / Crypto news
// ---------------------------------------------------------------------------

/// An RSS article held by the News Distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    /// Publication date as served by the feed (RFC 3339 or RFC 2822).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// A vocabulary word extracted from an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub original_word: String,
    #[serde(default)]
    pub vietnamese_definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_article_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A headline from the crypto news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoNewsItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    /// Vote count; the feed serves either a number or a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<serde_json::Value>,
}

impl CryptoNewsItem {
    pub fn votes_display(&self) -> Option<String> {
        match self.votes.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_project() -> Project {
        Project {
            id: "p-1".into(),
            title: "Untitled Project".into(),
            source_url: None,
            raw_text: None,
            original_content: "Hello world".into(),
            translated_content: None,
            social_content: None,
            images: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn origin_requires_exactly_one_input() {
        let err = ProjectOrigin::from_inputs(None, None).unwrap_err();
        assert!(matches!(err, ContentHubError::Validation { .. }));

        let err = ProjectOrigin::from_inputs(Some("   "), Some("")).unwrap_err();
        assert!(matches!(err, ContentHubError::Validation { .. }));

        let err =
            ProjectOrigin::from_inputs(Some("https://example.com/a"), Some("text")).unwrap_err();
        assert!(err.to_string().contains("not both"));

        let origin = ProjectOrigin::from_inputs(None, Some("Hello world")).unwrap();
        assert_eq!(origin, ProjectOrigin::Text("Hello world".into()));

        let origin = ProjectOrigin::from_inputs(Some(" https://example.com/a "), None).unwrap();
        assert_eq!(origin, ProjectOrigin::Url("https://example.com/a".into()));
    }

    #[test]
    fn origin_rejects_non_http_urls() {
        assert!(ProjectOrigin::from_inputs(Some("example.com/a"), None).is_err());
        assert!(ProjectOrigin::from_inputs(Some("file:///etc/passwd"), None).is_err());
    }

    #[test]
    fn directly_built_origins_are_validated() {
        assert!(ProjectOrigin::Text(String::new()).validate().is_err());
        assert!(ProjectOrigin::Text("  \n".into()).validate().is_err());
        assert!(ProjectOrigin::Url("not a url".into()).validate().is_err());
        assert!(ProjectOrigin::Url("ftp://example.com/a".into()).validate().is_err());
        assert!(ProjectOrigin::Text("Hello".into()).validate().is_ok());
        assert!(ProjectOrigin::Url("https://example.com/a".into()).validate().is_ok());
    }

    #[test]
    fn origin_serializes_as_create_body() {
        let body = serde_json::to_value(ProjectOrigin::Text("Hello".into())).unwrap();
        assert_eq!(body, serde_json::json!({ "raw_text": "Hello" }));

        let body = serde_json::to_value(ProjectOrigin::Url("https://x.io".into())).unwrap();
        assert_eq!(body, serde_json::json!({ "source_url": "https://x.io" }));
    }

    #[test]
    fn project_origin_and_current_text() {
        let mut project = text_project();
        assert_eq!(project.origin(), ProjectOrigin::Text("Hello world".into()));
        assert_eq!(project.current_text(), "Hello world");

        project.translated_content = Some("Xin chào thế giới".into());
        assert_eq!(project.current_text(), "Xin chào thế giới");

        project.source_url = Some("https://example.com/post".into());
        assert!(project.origin().is_url());
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        assert!(ProjectPatch::default().is_empty());
        let json = serde_json::to_value(ProjectPatch::translated_content("edited")).unwrap();
        assert_eq!(json, serde_json::json!({ "translated_content": "edited" }));
    }

    #[test]
    fn votes_display_handles_numbers_and_strings() {
        let mut item = CryptoNewsItem {
            id: "n1".into(),
            title: "BTC".into(),
            url: "https://news.example.com/btc".into(),
            source: None,
            published_time: None,
            votes: Some(serde_json::json!(12)),
        };
        assert_eq!(item.votes_display().as_deref(), Some("12"));
        item.votes = Some(serde_json::json!("7"));
        assert_eq!(item.votes_display().as_deref(), Some("7"));
        item.votes = None;
        assert_eq!(item.votes_display(), None);
    }

    #[test]
    fn project_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/project.fixture.json")
            .expect("read fixture");
        let parsed: Project = serde_json::from_str(&fixture).expect("deserialize fixture project");
        assert_eq!(parsed.id.as_str(), "5f0c8a8e-0d8f-4a57-9a43-6b1f0a3c9e21");
        assert!(parsed.origin().is_url());
        assert_eq!(parsed.images.len(), 2);
        assert_eq!(
            parsed.facebook_post(),
            Some("Lightning Network đang thay đổi cách thanh toán.")
        );
        // Unknown social fields are ignored.
        assert_eq!(
            parsed.social_content.as_ref().and_then(|s| s.hashtags.as_deref()),
            Some("#Bitcoin #Lightning")
        );
    }

    #[test]
    fn project_list_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/projects.fixture.json")
            .expect("read fixture");
        let parsed: Vec<Project> = serde_json::from_str(&fixture).expect("deserialize list");
        assert_eq!(parsed.len(), 2);
        assert!(parsed[1].translated_content.is_none());
        assert!(parsed[1].social_content.is_none());
    }
}
