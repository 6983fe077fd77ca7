//! End-to-end BRD pipeline: input JSON → assembled document → HTML file.

use std::path::PathBuf;
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use brdgen_shared::{AppConfig, BrdError, BrdRequest, OutputKind, Result, resolve_api_key};

use crate::assembler::{self, AssembleOptions};
use crate::generation::{HttpGenerator, SectionGenerator};

/// Configuration for one `generate_brd` run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Path to the request JSON.
    pub input_path: PathBuf,
    /// Path the rendered document is written to.
    pub output_path: PathBuf,
    /// Application config (generation endpoint, model, key env var).
    pub app: AppConfig,
}

/// Result of a completed `generate_brd` run.
#[derive(Debug)]
pub struct GenerateResult {
    /// Where the document was written.
    pub output_path: PathBuf,
    /// Number of requested output sections.
    pub section_count: usize,
    /// Number of sections that requested generated content.
    pub generated_count: usize,
    /// Size of the rendered document.
    pub bytes_written: usize,
    /// SHA-256 of the rendered document.
    pub sha256: String,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Per-section progress while assembling output sections.
    fn section_progress(&self, current: usize, total: usize, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn section_progress(&self, _current: usize, _total: usize, _name: &str) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Run the full pipeline with the production HTTP generator.
#[instrument(skip_all, fields(input = %config.input_path.display()))]
pub async fn generate_brd(
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let generator = HttpGenerator::new(&config.app.generation)?;
    generate_with(config, &generator, progress).await
}

/// Run the pipeline with an explicit generator (the seam used by tests).
///
/// 1. Load and decode the input document (fatal on failure)
/// 2. Resolve the API key
/// 3. Assemble the document (attachment/generation failures are inline)
/// 4. Render to HTML and persist in one shot
pub async fn generate_with(
    config: &GenerateConfig,
    generator: &dyn SectionGenerator,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();

    progress.phase("Parsing input");
    let request = BrdRequest::load(&config.input_path)?;

    let api_key = resolve_api_key(&config.app, request.api_key.as_deref());

    let opts = AssembleOptions {
        generated_on: chrono::Utc::now().date_naive(),
        api_key,
    };

    let doc = assembler::assemble(&request, generator, &opts, progress).await;

    progress.phase("Rendering document");
    let html = brdgen_document::render_html(&doc);

    std::fs::write(&config.output_path, &html)
        .map_err(|e| BrdError::io(&config.output_path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let generated_count = request
        .outputs
        .iter()
        .filter(|o| o.wants(OutputKind::Content))
        .count();

    let result = GenerateResult {
        output_path: config.output_path.clone(),
        section_count: request.outputs.len(),
        generated_count,
        bytes_written: html.len(),
        sha256: digest,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        path = %result.output_path.display(),
        sections = result.section_count,
        generated = result.generated_count,
        bytes = result.bytes_written,
        elapsed_ms = result.elapsed.as_millis(),
        "BRD generation complete"
    );

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
