//! HTTP clients for the ContentHub backend.
//!
//! Every client borrows an [`ApiClient`], an explicitly constructed handle
//! holding the backend API root and a shared `reqwest` connection pool.
//! Non-success responses are folded into [`ContentHubError`] according to the
//! kind of endpoint that produced them (plain CRUD vs. AI generation).

mod crypto;
mod news;
mod projects;
mod stages;

use std::time::Duration;

use contenthub_shared::{AppConfig, ContentHubError, Result, resolve_api_root};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

pub use crypto::CryptoNewsClient;
pub use news::{ExtractionReport, NewsDistributorClient, RefreshReport};
pub use projects::ProjectStore;
pub use stages::{Stage, StageExecutor, StageOutput};

/// User-Agent string for backend requests.
const USER_AGENT: &str = concat!("ContentHub/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Handle to the backend JSON API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    root: Url,
    http: Client,
}

impl ApiClient {
    /// Build a client for an API root such as `http://localhost:8001/api/`.
    ///
    /// `timeout` of `None` lets requests wait indefinitely.
    pub fn new(root: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ContentHubError::Network(format!("failed to build HTTP client: {e}")))?;

        if root.cannot_be_a_base() {
            return Err(ContentHubError::config(format!(
                "backend URL cannot be used as a base: {root}"
            )));
        }

        Ok(Self { root, http })
    }

    /// Build a client from loaded config plus an optional `--backend-url` flag.
    pub fn from_config(config: &AppConfig, backend_url: Option<&str>) -> Result<Self> {
        let root = resolve_api_root(config, backend_url)?;
        let timeout = config.backend.timeout_secs.map(Duration::from_secs);
        Self::new(root, timeout)
    }

    /// The API root all endpoints are resolved against.
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Probe `GET /` and return the backend's greeting message.
    #[instrument(skip_all, fields(root = %self.root))]
    pub async fn health(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct Health {
            #[serde(default)]
            message: String,
        }

        let url = self.root.clone();
        let response = self
            .send(self.request(Method::GET, &url), &url, FailureKind::Crud)
            .await?;
        let health: Health = read_json(response, &url).await?;
        Ok(health.message)
    }

    /// Resolve path segments under the API root, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.http.request(method, url.clone())
    }

    /// Send a request and turn any non-success status into a typed error.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        url: &Url,
        failure: FailureKind,
    ) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ContentHubError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        debug!(%url, %status, "backend responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);
        Err(failure.classify(status, detail))
    }
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

/// What kind of endpoint a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// Plain create/read/update/delete.
    Crud,
    /// Ingestion, AI generation, vocabulary extraction or crawling.
    Generation,
}

impl FailureKind {
    fn classify(self, status: StatusCode, detail: String) -> ContentHubError {
        if status == StatusCode::NOT_FOUND {
            return ContentHubError::NotFound(detail);
        }
        match self {
            Self::Generation => ContentHubError::Generation(detail),
            Self::Crud
                if status == StatusCode::BAD_REQUEST
                    || status == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                ContentHubError::validation(detail)
            }
            Self::Crud => ContentHubError::Backend {
                status: status.as_u16(),
                detail,
            },
        }
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Prefers a JSON `detail` field, then the raw body, then the status reason.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        match map.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// Read and decode a JSON response body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ContentHubError::Network(format!("{url}: failed to read body: {e}")))?;

    serde_json::from_str(&body)
        .map_err(|e| ContentHubError::parse(format!("{url}: unexpected response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn client_for(server: &wiremock::MockServer) -> ApiClient {
        let root = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        ApiClient::new(root, None).unwrap()
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client =
            ApiClient::new(Url::parse("http://localhost:8001/api/").unwrap(), None).unwrap();
        assert_eq!(
            client.endpoint(&["projects", "abc", "translate"]).as_str(),
            "http://localhost:8001/api/projects/abc/translate"
        );
        assert_eq!(
            client.endpoint(&["projects", "a b/c"]).as_str(),
            "http://localhost:8001/api/projects/a%20b%2Fc"
        );
    }

    #[test]
    fn detail_prefers_json_field() {
        let detail = error_detail(StatusCode::BAD_REQUEST, r#"{"detail":"Failed to scrape URL"}"#);
        assert_eq!(detail, "Failed to scrape URL");

        let detail = error_detail(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(detail, "upstream down");

        let detail = error_detail(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(detail, "Service Unavailable");
    }

    #[test]
    fn classification_by_endpoint_kind() {
        let err = FailureKind::Crud.classify(StatusCode::NOT_FOUND, "Project not found".into());
        assert!(matches!(err, ContentHubError::NotFound(ref d) if d == "Project not found"));

        let err = FailureKind::Generation.classify(StatusCode::NOT_FOUND, "gone".into());
        assert!(err.is_not_found());

        let err =
            FailureKind::Generation.classify(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert!(matches!(err, ContentHubError::Generation(_)));

        let err = FailureKind::Crud.classify(StatusCode::UNPROCESSABLE_ENTITY, "bad".into());
        assert!(matches!(err, ContentHubError::Validation { .. }));

        let err = FailureKind::Crud.classify(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert!(matches!(err, ContentHubError::Backend { status: 500, .. }));
    }

    #[tokio::test]
    async fn health_reads_message() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "Partner Content Hub API" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.health().await.unwrap(), "Partner Content Hub API");
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = ApiClient::new(Url::parse("http://127.0.0.1:9/api/").unwrap(), None).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ContentHubError::Network(_)));
    }
}
