//! Preview/edit reconciliation for one open project view.
//!
//! The [`Reconciler`] keeps the user's working copy apart from the last
//! server-confirmed project and makes every transition explicit:
//!
//! ```text
//!            edit                 begin_save
//!  Viewing ────────▶ Editing ─────────────────▶ Saving
//!     ▲   ◀──────────   ▲  ◀──── fail_save ───────┘
//!     │  discard_edits  │                          │
//!     └──────────────── finish_save ◀──────────────┘
//! ```
//!
//! Stage slots (translate / social) are orthogonal to the draft state: a
//! stage may run while the user edits, but the same stage never runs twice
//! at once.

use contenthub_client::Stage;
use contenthub_shared::{ContentHubError, Project, Result, SocialContent};
use tracing::{debug, warn};

/// Whether the working text diverges from the authoritative copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// Working text equals the authoritative current text.
    Clean,
    /// The user changed the working text.
    Dirty,
    /// An explicit save of the working text is in flight.
    Saving,
}

/// What a view should show, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Viewing,
    StageRunning,
    Editing,
    Saving,
}

/// How a stage result was folded into the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Working copy now shows the result.
    Applied,
    /// The result reached the authoritative copy only; the user's unsaved
    /// edit is still in the working copy.
    EditPreserved,
}

/// The client-held, possibly unsaved content shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    pub text: String,
    pub social: Option<SocialContent>,
}

impl WorkingCopy {
    fn from_project(project: &Project) -> Self {
        Self {
            text: project.current_text().to_string(),
            social: project.social_content.clone(),
        }
    }
}

/// State machine for one project view.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciler {
    authoritative: Project,
    working: WorkingCopy,
    draft: DraftState,
    translate_running: bool,
    social_running: bool,
}

impl Reconciler {
    pub fn new(project: Project) -> Self {
        Self {
            working: WorkingCopy::from_project(&project),
            authoritative: project,
            draft: DraftState::Clean,
            translate_running: false,
            social_running: false,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Last server-confirmed project.
    pub fn authoritative(&self) -> &Project {
        &self.authoritative
    }

    pub fn working(&self) -> &WorkingCopy {
        &self.working
    }

    pub fn draft(&self) -> DraftState {
        self.draft
    }

    pub fn is_running(&self, stage: Stage) -> bool {
        match stage {
            Stage::Translate => self.translate_running,
            Stage::GenerateSocial => self.social_running,
        }
    }

    pub fn view_state(&self) -> ViewState {
        if self.draft == DraftState::Saving {
            ViewState::Saving
        } else if self.translate_running || self.social_running {
            ViewState::StageRunning
        } else if self.draft == DraftState::Dirty {
            ViewState::Editing
        } else {
            ViewState::Viewing
        }
    }

    // -- stage slots --------------------------------------------------------

    /// Claim the slot for `stage`. Returns `false` if it is already taken.
    pub fn begin_stage(&mut self, stage: Stage) -> bool {
        let slot = self.slot_mut(stage);
        if *slot {
            debug!(%stage, "stage already in flight");
            return false;
        }
        *slot = true;
        true
    }

    pub fn end_stage(&mut self, stage: Stage) {
        *self.slot_mut(stage) = false;
    }

    fn slot_mut(&mut self, stage: Stage) -> &mut bool {
        match stage {
            Stage::Translate => &mut self.translate_running,
            Stage::GenerateSocial => &mut self.social_running,
        }
    }

    // -- confirmed results --------------------------------------------------

    /// Fold a confirmed translation in. Never overwrites an unsaved edit.
    pub fn apply_translation(&mut self, text: String) -> ApplyOutcome {
        self.authoritative.translated_content = Some(text.clone());
        match self.draft {
            DraftState::Clean => {
                self.working.text = text;
                ApplyOutcome::Applied
            }
            DraftState::Dirty if self.working.text == text => {
                self.draft = DraftState::Clean;
                ApplyOutcome::Applied
            }
            DraftState::Dirty | DraftState::Saving => {
                warn!(
                    project_id = %self.authoritative.id,
                    "translation stored, keeping unsaved edit in working copy"
                );
                ApplyOutcome::EditPreserved
            }
        }
    }

    /// Fold confirmed social content in. The working text is untouched.
    pub fn apply_social(&mut self, social: SocialContent) {
        self.authoritative.social_content = Some(social.clone());
        self.working.social = Some(social);
    }

    // -- editing ------------------------------------------------------------

    /// Replace the working text.
    pub fn edit(&mut self, text: String) -> Result<()> {
        if self.draft == DraftState::Saving {
            return Err(ContentHubError::validation(
                "cannot edit while a save is in progress",
            ));
        }
        self.draft = if text == self.authoritative.current_text() {
            DraftState::Clean
        } else {
            DraftState::Dirty
        };
        self.working.text = text;
        Ok(())
    }

    /// Throw the edit away and show the authoritative text again.
    pub fn discard_edits(&mut self) -> Result<()> {
        if self.draft == DraftState::Saving {
            return Err(ContentHubError::validation(
                "cannot discard edits while a save is in progress",
            ));
        }
        self.working.text = self.authoritative.current_text().to_string();
        self.draft = DraftState::Clean;
        Ok(())
    }

    /// Move a dirty draft into `Saving` and hand back the text to persist.
    /// Returns `None` when there is nothing to save.
    pub fn begin_save(&mut self) -> Option<String> {
        match self.draft {
            DraftState::Dirty => {
                self.draft = DraftState::Saving;
                Some(self.working.text.clone())
            }
            DraftState::Clean | DraftState::Saving => None,
        }
    }

    /// The store confirmed the save and returned the updated project.
    pub fn finish_save(&mut self, project: Project) {
        self.working = WorkingCopy::from_project(&project);
        self.authoritative = project;
        self.draft = DraftState::Clean;
    }

    /// The save failed; keep the edit.
    pub fn fail_save(&mut self) {
        if self.draft == DraftState::Saving {
            self.draft = DraftState::Dirty;
        }
    }

    /// Adopt a freshly fetched project without losing an unsaved edit.
    pub fn refresh(&mut self, project: Project) {
        self.working.social = project.social_content.clone();
        if self.draft == DraftState::Clean {
            self.working.text = project.current_text().to_string();
        }
        self.authoritative = project;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project() -> Project {
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

    fn social(text: &str) -> SocialContent {
        SocialContent {
            facebook: Some(text.into()),
            ..Default::default()
        }
    }

    #[test]
    fn opens_in_viewing_with_current_text() {
        let mut p = project();
        p.translated_content = Some("Xin chào".into());
        let r = Reconciler::new(p);
        assert_eq!(r.view_state(), ViewState::Viewing);
        assert_eq!(r.working().text, "Xin chào");
    }

    #[test]
    fn stage_slots_are_per_stage() {
        let mut r = Reconciler::new(project());
        assert!(r.begin_stage(Stage::Translate));
        assert!(!r.begin_stage(Stage::Translate));
        assert!(r.begin_stage(Stage::GenerateSocial));
        assert_eq!(r.view_state(), ViewState::StageRunning);

        r.end_stage(Stage::Translate);
        assert!(!r.is_running(Stage::Translate));
        assert!(r.is_running(Stage::GenerateSocial));
        r.end_stage(Stage::GenerateSocial);
        assert_eq!(r.view_state(), ViewState::Viewing);
    }

    #[test]
    fn translation_applies_to_clean_view() {
        let mut r = Reconciler::new(project());
        r.apply_social(social("post"));

        let outcome = r.apply_translation("Xin chào thế giới".into());
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(r.working().text, "Xin chào thế giới");
        assert_eq!(
            r.authoritative().translated_content.as_deref(),
            Some("Xin chào thế giới")
        );
        // social untouched by translate
        assert_eq!(r.authoritative().facebook_post(), Some("post"));
    }

    #[test]
    fn translation_never_clobbers_unsaved_edit() {
        let mut r = Reconciler::new(project());
        r.edit("my edit".into()).unwrap();

        let outcome = r.apply_translation("fresh translation".into());
        assert_eq!(outcome, ApplyOutcome::EditPreserved);
        assert_eq!(r.working().text, "my edit");
        assert_eq!(r.draft(), DraftState::Dirty);
        assert_eq!(
            r.authoritative().translated_content.as_deref(),
            Some("fresh translation")
        );
    }

    #[test]
    fn translation_matching_edit_cleans_draft() {
        let mut r = Reconciler::new(project());
        r.edit("Xin chào thế giới".into()).unwrap();
        assert_eq!(r.draft(), DraftState::Dirty);

        let outcome = r.apply_translation("Xin chào thế giới".into());
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(r.draft(), DraftState::Clean);
        assert_eq!(r.view_state(), ViewState::Viewing);
        assert_eq!(r.begin_save(), None);
    }

    #[test]
    fn social_leaves_text_alone() {
        let mut r = Reconciler::new(project());
        r.apply_translation("Xin chào thế giới".into());
        r.edit("Xin chào, thế giới!".into()).unwrap();

        r.apply_social(social("Bài đăng"));
        assert_eq!(r.working().text, "Xin chào, thế giới!");
        assert_eq!(r.working().social, Some(social("Bài đăng")));
        assert_eq!(
            r.authoritative().translated_content.as_deref(),
            Some("Xin chào thế giới")
        );
        assert_eq!(r.view_state(), ViewState::Editing);
    }

    #[test]
    fn editing_back_to_authoritative_is_clean() {
        let mut r = Reconciler::new(project());
        r.edit("changed".into()).unwrap();
        assert_eq!(r.draft(), DraftState::Dirty);
        r.edit("Hello world".into()).unwrap();
        assert_eq!(r.draft(), DraftState::Clean);
    }

    #[test]
    fn save_cycle_success() {
        let mut r = Reconciler::new(project());
        assert_eq!(r.begin_save(), None);

        r.edit("edited".into()).unwrap();
        assert_eq!(r.begin_save().as_deref(), Some("edited"));
        assert_eq!(r.view_state(), ViewState::Saving);
        assert_eq!(r.begin_save(), None);
        assert!(r.edit("more".into()).is_err());
        assert!(r.discard_edits().is_err());

        let mut saved = project();
        saved.translated_content = Some("edited".into());
        r.finish_save(saved);
        assert_eq!(r.view_state(), ViewState::Viewing);
        assert_eq!(r.working().text, "edited");
        assert_eq!(r.authoritative().current_text(), "edited");
    }

    #[test]
    fn save_failure_keeps_edit() {
        let mut r = Reconciler::new(project());
        r.edit("edited".into()).unwrap();
        r.begin_save();
        r.fail_save();
        assert_eq!(r.view_state(), ViewState::Editing);
        assert_eq!(r.working().text, "edited");
        assert!(r.authoritative().translated_content.is_none());
    }

    #[test]
    fn discard_restores_authoritative_text() {
        let mut r = Reconciler::new(project());
        r.edit("edited".into()).unwrap();
        r.apply_translation("server text".into());
        r.discard_edits().unwrap();
        assert_eq!(r.working().text, "server text");
        assert_eq!(r.view_state(), ViewState::Viewing);
    }

    #[test]
    fn refresh_respects_dirty_draft() {
        let mut r = Reconciler::new(project());
        r.edit("edited".into()).unwrap();

        let mut fetched = project();
        fetched.translated_content = Some("remote".into());
        fetched.social_content = Some(social("remote post"));
        r.refresh(fetched.clone());
        assert_eq!(r.working().text, "edited");
        assert_eq!(r.working().social, Some(social("remote post")));

        r.discard_edits().unwrap();
        fetched.translated_content = Some("remote v2".into());
        r.refresh(fetched);
        assert_eq!(r.working().text, "remote v2");
    }

    #[test]
    fn saving_shadows_running_stages() {
        let mut r = Reconciler::new(project());
        r.edit("edited".into()).unwrap();
        r.begin_stage(Stage::GenerateSocial);
        assert_eq!(r.view_state(), ViewState::StageRunning);
        r.begin_save();
        assert_eq!(r.view_state(), ViewState::Saving);
    }
}
