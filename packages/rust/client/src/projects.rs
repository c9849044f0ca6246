//! Project Store client: CRUD access to persisted projects.

use contenthub_shared::{ContentHubError, Project, ProjectId, ProjectOrigin, ProjectPatch, Result};
use reqwest::Method;
use tracing::{info, instrument, warn};

use crate::{ApiClient, FailureKind, read_json};

/// Single point of access to persisted projects. Holds no cache.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    api: ApiClient,
}

impl ProjectStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create a project; the backend scrapes the URL or stores the text.
    ///
    /// A blank origin or a non-http(s) URL is rejected with
    /// [`ContentHubError::Validation`] before any request. Ingestion failures
    /// (unreachable page, bad input the backend rejects) surface as
    /// [`ContentHubError::Generation`].
    #[instrument(skip_all, fields(from_url = origin.is_url()))]
    pub async fn create(&self, origin: &ProjectOrigin) -> Result<Project> {
        origin.validate()?;

        let url = self.api.endpoint(&["projects"]);
        let request = self.api.request(Method::POST, &url).json(origin);
        let response = self.api.send(request, &url, FailureKind::Generation).await?;
        let project: Project = read_json(response, &url).await?;

        info!(project_id = %project.id, title = %project.title, "project created");
        Ok(project)
    }

    /// Fetch the current persisted project.
    #[instrument(skip_all, fields(project_id = %id))]
    pub async fn get(&self, id: &ProjectId) -> Result<Project> {
        let url = self.api.endpoint(&["projects", id.as_str()]);
        let response = self
            .api
            .send(self.api.request(Method::GET, &url), &url, FailureKind::Crud)
            .await?;
        read_json(response, &url).await
    }

    /// List all projects (newest first as served by the backend).
    #[instrument(skip_all)]
    pub async fn list(&self) -> Result<Vec<Project>> {
        let url = self.api.endpoint(&["projects"]);
        let response = self
            .api
            .send(self.api.request(Method::GET, &url), &url, FailureKind::Crud)
            .await?;
        read_json(response, &url).await
    }

    /// Apply a partial update and return the updated project.
    #[instrument(skip_all, fields(project_id = %id))]
    pub async fn update(&self, id: &ProjectId, patch: &ProjectPatch) -> Result<Project> {
        if patch.is_empty() {
            return Err(ContentHubError::validation("update patch has no fields set"));
        }

        let url = self.api.endpoint(&["projects", id.as_str()]);
        let request = self.api.request(Method::PUT, &url).json(patch);
        let response = self.api.send(request, &url, FailureKind::Crud).await?;
        let project: Project = read_json(response, &url).await?;

        info!("project updated");
        Ok(project)
    }

    /// Delete a project. A second delete of the same id fails with
    /// [`ContentHubError::NotFound`].
    #[instrument(skip_all, fields(project_id = %id))]
    pub async fn delete(&self, id: &ProjectId) -> Result<()> {
        let url = self.api.endpoint(&["projects", id.as_str()]);
        self.api
            .send(self.api.request(Method::DELETE, &url), &url, FailureKind::Crud)
            .await?;
        info!("project deleted");
        Ok(())
    }

    /// Delete, treating "already gone" as success.
    ///
    /// Returns `true` if the project still existed.
    pub async fn delete_idempotent(&self, id: &ProjectId) -> Result<bool> {
        match self.delete(id).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => {
                warn!(project_id = %id, "project already deleted");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
