//! Shared types, error model, and configuration for ContentHub.
//!
//! This crate is the foundation depended on by all other ContentHub crates.
//! It provides:
//! - [`ContentHubError`] — the unified error type
//! - Domain types ([`Project`], [`ProjectOrigin`], [`SocialContent`], news entities)
//! - Configuration ([`AppConfig`], [`BackendConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BackendConfig, WorkshopConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_root,
};
pub use error::{ContentHubError, Result};
pub use types::{
    Article, CryptoNewsItem, Project, ProjectId, ProjectOrigin, ProjectPatch, SocialContent,
    VocabularyEntry,
};
