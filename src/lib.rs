//! Core library for `shutter_move`.
//!
//! Relocates media-library assets to canonical, template-derived paths:
//! a storage template is compiled once, each asset's metadata renders a
//! deterministic target path, and a journaled move protocol guarantees the
//! file survives crashes, cross-filesystem moves, and naming collisions.
//! Re-running a relocation is always safe; the steady state is a no-op.

pub mod config;
pub mod errors;
pub mod output;
pub mod relocate;
pub mod shutdown;
pub mod store;
pub mod template;

pub use config::{
    default_config_path, default_db_path, default_log_path, path_has_symlink_ancestor, LogLevel,
    Settings,
};
pub use errors::{IntegrityError, TemplateError};
pub use relocate::{
    ConfigSnapshot, FailureReason, MigrationSummary, Outcome, RelocationEngine, SkipReason,
};
pub use store::{Asset, AssetKind, MoveRecord, PathKind, Store};
pub use template::{compile, CompiledTemplate, TemplateContext, Token};
