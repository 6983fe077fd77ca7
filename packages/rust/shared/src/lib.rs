//! Shared types, error model, and configuration for brdgen.
//!
//! This crate is the foundation depended on by all other brdgen crates.
//! It provides:
//! - [`BrdError`] — the unified error type
//! - The input model ([`BrdRequest`], [`Template`], [`OutputSection`])
//! - Configuration ([`AppConfig`], [`GenerationConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GenerationConfig, config_dir, config_file_path, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{BrdError, Result};
pub use types::{
    AttachmentPaths, BrdRequest, OutputKind, OutputSection, OverviewField, Template,
    form_value_text,
};
