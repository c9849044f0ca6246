//! Project overview: one row per project with progress badges.

use chrono::{DateTime, Utc};
use contenthub_client::ProjectStore;
use contenthub_shared::{Project, ProjectId, Result};
use tracing::{debug, instrument};

/// Label shown instead of a URL for projects created from pasted text.
pub const MANUAL_ENTRY: &str = "Manual Entry";

/// Which stages have produced output for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Badges {
    pub translated: bool,
    pub social_ready: bool,
}

pub fn badges(project: &Project) -> Badges {
    Badges {
        translated: project.translated_content.is_some(),
        social_ready: project.facebook_post().is_some(),
    }
}

/// A dashboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEntry {
    pub id: ProjectId,
    pub title: String,
    pub origin_label: String,
    pub badges: Badges,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for DashboardEntry {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            title: project.title.clone(),
            origin_label: project
                .source_url
                .clone()
                .unwrap_or_else(|| MANUAL_ENTRY.to_string()),
            badges: badges(project),
            created_at: project.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardLister {
    store: ProjectStore,
}

impl DashboardLister {
    pub fn new(store: ProjectStore) -> Self {
        Self { store }
    }

    /// Fetch all projects, newest first as served by the backend.
    #[instrument(skip_all)]
    pub async fn load(&self) -> Result<Vec<DashboardEntry>> {
        let projects = self.store.list().await?;
        debug!(count = projects.len(), "dashboard loaded");
        Ok(projects.iter().map(DashboardEntry::from).collect())
    }
}
