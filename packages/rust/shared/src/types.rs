//! Input model for BRD generation requests.
//!
//! The top-level request document is JSON with camelCase keys; three of its
//! fields (`template`, `formData`, `outputs`) are themselves JSON-encoded
//! strings. Decoding all of them is part of the fatal parse tier: a request
//! that fails here never produces a document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{BrdError, Result};

// ---------------------------------------------------------------------------
// Raw envelope (wire shape)
// ---------------------------------------------------------------------------

/// The request document exactly as it arrives on disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    /// JSON-encoded [`Template`].
    template: String,
    /// JSON-encoded flat mapping from field key to value.
    form_data: String,
    business_use_case: String,
    business_logic: String,
    /// JSON-encoded sequence of `{name, types}` entries.
    outputs: String,
    #[serde(default)]
    files: AttachmentPaths,
    #[serde(default)]
    api_key: Option<String>,
}

/// One output entry as encoded on the wire.
#[derive(Debug, Deserialize)]
struct RawOutput {
    name: String,
    #[serde(default)]
    types: Vec<String>,
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Caller-supplied schema describing which overview fields to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Human-readable template name, used in the document title.
    pub template_name: String,
    /// Ordered field definitions for the overview table.
    pub overview: Vec<OverviewField>,
}

/// A single overview field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewField {
    /// Lookup key into the form data.
    pub key: String,
    /// Display label for the table row.
    pub label: String,
}

// ---------------------------------------------------------------------------
// Output sections
// ---------------------------------------------------------------------------

/// Content kinds a caller can request for an output section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Content,
    Table,
    Image,
}

impl OutputKind {
    /// Parse a wire-format kind string. Returns `None` for unknown kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "content" => Some(Self::Content),
            "table" => Some(Self::Table),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Content => "content",
            Self::Table => "table",
            Self::Image => "image",
        };
        write!(f, "{s}")
    }
}

/// A named output section and the content kinds requested for it.
#[derive(Debug, Clone)]
pub struct OutputSection {
    pub name: String,
    pub kinds: Vec<OutputKind>,
}

impl OutputSection {
    /// Whether the caller requested the given content kind.
    pub fn wants(&self, kind: OutputKind) -> bool {
        self.kinds.contains(&kind)
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Optional file attachments. Paths are read-only; existence is checked at
/// the point of use, never up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentPaths {
    #[serde(default)]
    pub csv: Option<PathBuf>,
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub doc: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Decoded request
// ---------------------------------------------------------------------------

/// A fully decoded BRD generation request.
#[derive(Debug, Clone)]
pub struct BrdRequest {
    pub template: Template,
    /// Flat mapping from field key to scalar or sequence value.
    pub form_data: HashMap<String, Value>,
    pub business_use_case: String,
    pub business_logic: String,
    pub outputs: Vec<OutputSection>,
    pub files: AttachmentPaths,
    /// Bearer credential for the generation endpoint, if supplied inline.
    pub api_key: Option<String>,
}

impl BrdRequest {
    /// Decode a request from its JSON text, including the three
    /// double-encoded sub-documents. All failures here are fatal.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawRequest = serde_json::from_str(text)
            .map_err(|e| BrdError::input(format!("malformed request document: {e}")))?;

        let template: Template = serde_json::from_str(&raw.template)
            .map_err(|e| BrdError::input(format!("invalid template JSON: {e}")))?;

        let form_data: HashMap<String, Value> = serde_json::from_str(&raw.form_data)
            .map_err(|e| BrdError::input(format!("invalid formData JSON: {e}")))?;

        let raw_outputs: Vec<RawOutput> = serde_json::from_str(&raw.outputs)
            .map_err(|e| BrdError::input(format!("invalid outputs JSON: {e}")))?;

        let outputs = raw_outputs
            .into_iter()
            .map(|entry| {
                let kinds = entry
                    .types
                    .iter()
                    .filter_map(|t| {
                        let kind = OutputKind::parse(t);
                        if kind.is_none() {
                            warn!(section = %entry.name, kind = %t, "ignoring unrecognized output kind");
                        }
                        kind
                    })
                    .collect();
                OutputSection {
                    name: entry.name,
                    kinds,
                }
            })
            .collect();

        Ok(Self {
            template,
            form_data,
            business_use_case: raw.business_use_case,
            business_logic: raw.business_logic,
            outputs,
            files: raw.files,
            api_key: raw.api_key,
        })
    }

    /// Load and decode a request from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BrdError::io(path, e))?;
        Self::from_json(&text)
    }
}

/// Render a form value as cell text: sequences are joined with `", "`,
/// strings pass through, other scalars are stringified, null is empty.
pub fn form_value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(form_value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
