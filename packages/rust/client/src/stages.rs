//! Stage Executor: runs one named backend transformation against a project.
//!
//! The executor only talks to the backend. Folding a result into local state
//! is left to the caller, which must do so only after `Ok`.

use std::fmt;

use contenthub_shared::{ContentHubError, ProjectId, Result, SocialContent};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{ApiClient, FailureKind, read_json};

/// A named backend transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Translate,
    GenerateSocial,
}

impl Stage {
    /// Last path segment of the stage endpoint.
    fn path_segment(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::GenerateSocial => "social",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate => write!(f, "translate"),
            Self::GenerateSocial => write!(f, "generate_social"),
        }
    }
}

/// The fragment a stage produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    Translated(String),
    Social(SocialContent),
}

#[derive(Serialize)]
struct StageRequest<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_preset: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_content: String,
}

/// Invokes translate / social-generation stages. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct StageExecutor {
    api: ApiClient,
}

impl StageExecutor {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Run `stage` over `content`, which the caller picks (original,
    /// translated, or an unsaved edit).
    ///
    /// `custom_preset` is appended server-side to the stage's fixed default
    /// instructions; `None` omits the field entirely.
    #[instrument(skip_all, fields(stage = %stage, project_id = %project_id))]
    pub async fn run(
        &self,
        stage: Stage,
        project_id: &ProjectId,
        content: &str,
        custom_preset: Option<&str>,
    ) -> Result<StageOutput> {
        if content.trim().is_empty() {
            return Err(ContentHubError::validation(format!(
                "{stage}: content must not be empty"
            )));
        }

        let url = self
            .api
            .endpoint(&["projects", project_id.as_str(), stage.path_segment()]);
        let body = StageRequest {
            content,
            custom_preset,
        };
        let request = self.api.request(Method::POST, &url).json(&body);

        info!(content_len = content.len(), "running stage");
        let response = self.api.send(request, &url, FailureKind::Generation).await?;

        let output = match stage {
            Stage::Translate => {
                let parsed: TranslateResponse = read_json(response, &url).await?;
                StageOutput::Translated(parsed.translated_content)
            }
            Stage::GenerateSocial => StageOutput::Social(read_json(response, &url).await?),
        };

        info!("stage completed");
        Ok(output)
    }

    /// Translate and restructure `content`; returns the new translated content.
    pub async fn translate(
        &self,
        project_id: &ProjectId,
        content: &str,
        custom_preset: Option<&str>,
    ) -> Result<String> {
        match self
            .run(Stage::Translate, project_id, content, custom_preset)
            .await?
        {
            StageOutput::Translated(text) => Ok(text),
            StageOutput::Social(_) => Err(ContentHubError::parse(
                "translate stage returned social content",
            )),
        }
    }

    /// Generate social copy from `content`.
    pub async fn generate_social(
        &self,
        project_id: &ProjectId,
        content: &str,
        custom_preset: Option<&str>,
    ) -> Result<SocialContent> {
        match self
            .run(Stage::GenerateSocial, project_id, content, custom_preset)
            .await?
        {
            StageOutput::Social(social) => Ok(social),
            StageOutput::Translated(_) => Err(ContentHubError::parse(
                "social stage returned translated content",
            )),
        }
    }
}
