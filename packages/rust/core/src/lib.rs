//! Workshop logic for ContentHub.
//!
//! This crate sits on top of the HTTP clients: it reconciles stage results
//! with unsaved edits, drives one project view end to end, and derives the
//! dashboard and News Distributor views.

pub mod content;
pub mod dashboard;
pub mod reconciler;
pub mod vocabulary;
pub mod workshop;

pub use dashboard::{Badges, DashboardEntry, DashboardLister, badges};
pub use reconciler::{ApplyOutcome, DraftState, Reconciler, ViewState, WorkingCopy};
pub use workshop::{
    Activity, ActivityReporter, SaveOutcome, SilentReporter, StageOutcome, Workshop,
};
