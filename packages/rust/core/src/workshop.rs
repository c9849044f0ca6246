//! Project lifecycle controller for one open workshop view.
//!
//! A [`Workshop`] loads a project, runs stages against it, and folds confirmed
//! results into its [`Reconciler`]. All methods take `&self`, so a translate
//! and a social generation can be awaited concurrently; a second trigger of
//! the same stage while one is in flight returns
//! [`StageOutcome::AlreadyRunning`] without touching the network.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contenthub_client::{ProjectStore, Stage, StageExecutor, StageOutput};
use contenthub_shared::{
    ContentHubError, Project, ProjectId, ProjectOrigin, ProjectPatch, Result, SocialContent,
};
use tracing::{info, instrument};

use crate::content;
use crate::reconciler::{ApplyOutcome, Reconciler, ViewState};

// ---------------------------------------------------------------------------
// Activity reporting
// ---------------------------------------------------------------------------

/// A user-triggered action whose outcome is surfaced as a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Create,
    Load,
    Translate,
    GenerateSocial,
    Save,
    Delete,
}

impl From<Stage> for Activity {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Translate => Self::Translate,
            Stage::GenerateSocial => Self::GenerateSocial,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Creating project"),
            Self::Load => write!(f, "Loading project"),
            Self::Translate => write!(f, "Translating"),
            Self::GenerateSocial => write!(f, "Generating social content"),
            Self::Save => write!(f, "Saving"),
            Self::Delete => write!(f, "Deleting project"),
        }
    }
}

/// Receives transient, non-blocking notices about workshop actions.
pub trait ActivityReporter: Send + Sync {
    /// An action was sent; show an in-progress indicator.
    fn started(&self, activity: Activity);
    /// The action was confirmed by the backend.
    fn succeeded(&self, activity: Activity, message: &str);
    /// The action failed; local state is unchanged.
    fn failed(&self, activity: Activity, error: &ContentHubError);
}

/// No-op reporter for headless/test usage.
pub struct SilentReporter;

impl ActivityReporter for SilentReporter {
    fn started(&self, _activity: Activity) {}
    fn succeeded(&self, _activity: Activity, _message: &str) {}
    fn failed(&self, _activity: Activity, _error: &ContentHubError) {}
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of triggering a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The result is now in both the authoritative and working copy.
    Applied,
    /// The translation was stored, but an unsaved edit still occupies the
    /// working copy.
    EditPreserved,
    /// The same stage was already in flight; nothing was sent.
    AlreadyRunning,
}

/// Result of an explicit save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NothingToSave,
}

// ---------------------------------------------------------------------------
// Workshop
// ---------------------------------------------------------------------------

/// One open project view.
pub struct Workshop {
    id: ProjectId,
    store: ProjectStore,
    executor: StageExecutor,
    state: Mutex<Reconciler>,
    reporter: Arc<dyn ActivityReporter>,
}

impl Workshop {
    /// Create a project from `origin` and open it.
    #[instrument(skip_all, fields(from_url = origin.is_url()))]
    pub async fn create(
        store: ProjectStore,
        executor: StageExecutor,
        origin: &ProjectOrigin,
        reporter: Arc<dyn ActivityReporter>,
    ) -> Result<Self> {
        reporter.started(Activity::Create);
        match store.create(origin).await {
            Ok(project) => {
                reporter.succeeded(Activity::Create, "Project created successfully");
                Ok(Self::from_project(store, executor, project, reporter))
            }
            Err(e) => {
                reporter.failed(Activity::Create, &e);
                Err(e)
            }
        }
    }

    /// Load an existing project.
    #[instrument(skip_all, fields(project_id = %id))]
    pub async fn open(
        store: ProjectStore,
        executor: StageExecutor,
        id: &ProjectId,
        reporter: Arc<dyn ActivityReporter>,
    ) -> Result<Self> {
        reporter.started(Activity::Load);
        match store.get(id).await {
            Ok(project) => {
                reporter.succeeded(Activity::Load, &project.title);
                Ok(Self::from_project(store, executor, project, reporter))
            }
            Err(e) => {
                reporter.failed(Activity::Load, &e);
                Err(e)
            }
        }
    }

    fn from_project(
        store: ProjectStore,
        executor: StageExecutor,
        project: Project,
        reporter: Arc<dyn ActivityReporter>,
    ) -> Self {
        Self {
            id: project.id.clone(),
            store,
            executor,
            state: Mutex::new(Reconciler::new(project)),
            reporter,
        }
    }

    fn state(&self) -> MutexGuard<'_, Reconciler> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- read access --------------------------------------------------------

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    /// A copy of the full view state.
    pub fn snapshot(&self) -> Reconciler {
        self.state().clone()
    }

    pub fn view_state(&self) -> ViewState {
        self.state().view_state()
    }

    pub fn is_running(&self, stage: Stage) -> bool {
        self.state().is_running(stage)
    }

    pub fn working_text(&self) -> String {
        self.state().working().text.clone()
    }

    pub fn working_social(&self) -> Option<SocialContent> {
        self.state().working().social.clone()
    }

    /// Last server-confirmed project.
    pub fn authoritative(&self) -> Project {
        self.state().authoritative().clone()
    }

    /// Working text with markup stripped, ready for the clipboard.
    pub fn plain_text(&self) -> String {
        content::to_plain_text(&self.working_text())
    }

    // -- stages -------------------------------------------------------------

    /// Translate `content` (the caller picks original, translated or edited text).
    pub async fn translate(
        &self,
        content: &str,
        custom_preset: Option<&str>,
    ) -> Result<StageOutcome> {
        self.run_stage(Stage::Translate, content, custom_preset).await
    }

    /// Generate social copy from `content`.
    pub async fn generate_social(
        &self,
        content: &str,
        custom_preset: Option<&str>,
    ) -> Result<StageOutcome> {
        self.run_stage(Stage::GenerateSocial, content, custom_preset)
            .await
    }

    #[instrument(skip_all, fields(project_id = %self.id, stage = %stage))]
    async fn run_stage(
        &self,
        stage: Stage,
        content: &str,
        custom_preset: Option<&str>,
    ) -> Result<StageOutcome> {
        if !self.state().begin_stage(stage) {
            return Ok(StageOutcome::AlreadyRunning);
        }
        let _slot = StageSlot {
            workshop: self,
            stage,
        };

        let activity = Activity::from(stage);
        self.reporter.started(activity);

        let output = match self
            .executor
            .run(stage, &self.id, content, custom_preset)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                self.reporter.failed(activity, &e);
                return Err(e);
            }
        };

        let outcome = match output {
            StageOutput::Translated(text) => match self.state().apply_translation(text) {
                ApplyOutcome::Applied => StageOutcome::Applied,
                ApplyOutcome::EditPreserved => StageOutcome::EditPreserved,
            },
            StageOutput::Social(social) => {
                self.state().apply_social(social);
                StageOutcome::Applied
            }
        };

        let message = match (stage, outcome) {
            (Stage::Translate, StageOutcome::EditPreserved) => {
                "Translation completed; your unsaved edit was kept"
            }
            (Stage::Translate, _) => "Translation completed!",
            (Stage::GenerateSocial, _) => "Social content generated!",
        };
        info!(?outcome, "stage folded into view");
        self.reporter.succeeded(activity, message);
        Ok(outcome)
    }

    // -- editing ------------------------------------------------------------

    /// Replace the working text without saving.
    pub fn edit(&self, text: impl Into<String>) -> Result<()> {
        self.state().edit(text.into())
    }

    pub fn discard_edits(&self) -> Result<()> {
        self.state().discard_edits()
    }

    /// Persist the edited working text as the project's translated content.
    #[instrument(skip_all, fields(project_id = %self.id))]
    pub async fn save(&self) -> Result<SaveOutcome> {
        let text = self.state().begin_save();
        let Some(text) = text else {
            return Ok(SaveOutcome::NothingToSave);
        };
        let _pending = PendingSave { workshop: self };

        self.reporter.started(Activity::Save);
        match self
            .store
            .update(&self.id, &ProjectPatch::translated_content(text))
            .await
        {
            Ok(project) => {
                self.state().finish_save(project);
                self.reporter.succeeded(Activity::Save, "Changes saved");
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                self.reporter.failed(Activity::Save, &e);
                Err(e)
            }
        }
    }

    /// Re-fetch the project; an unsaved edit stays in the working copy.
    #[instrument(skip_all, fields(project_id = %self.id))]
    pub async fn reload(&self) -> Result<()> {
        self.reporter.started(Activity::Load);
        match self.store.get(&self.id).await {
            Ok(project) => {
                self.reporter.succeeded(Activity::Load, &project.title);
                self.state().refresh(project);
                Ok(())
            }
            Err(e) => {
                self.reporter.failed(Activity::Load, &e);
                Err(e)
            }
        }
    }

    /// Delete the project and close the view. "Already gone" counts as
    /// success; returns whether the backend still had it.
    #[instrument(skip_all, fields(project_id = %self.id))]
    pub async fn delete(self) -> Result<bool> {
        self.reporter.started(Activity::Delete);
        match self.store.delete_idempotent(&self.id).await {
            Ok(existed) => {
                self.reporter.succeeded(Activity::Delete, "Project deleted");
                Ok(existed)
            }
            Err(e) => {
                self.reporter.failed(Activity::Delete, &e);
                Err(e)
            }
        }
    }
}

/// Releases a stage slot when the request resolves or the caller stops waiting.
struct StageSlot<'a> {
    workshop: &'a Workshop,
    stage: Stage,
}

impl Drop for StageSlot<'_> {
    fn drop(&mut self) {
        self.workshop.state().end_stage(self.stage);
    }
}

/// Returns an abandoned or failed save to `Editing`. No-op after success.
struct PendingSave<'a> {
    workshop: &'a Workshop,
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        self.workshop.state().fail_save();
    }
}
