//! BRD document assembler.
//!
//! Takes a decoded request, a section generator, and assembly options, and
//! produces the append-only [`Document`] in fixed section order. Assembly
//! itself cannot fail: attachment and generation problems are rendered as
//! visible text inside the document (the recoverable error tier).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{instrument, warn};

use brdgen_document::{Document, ImageBlock, ParagraphStyle, TableBlock};
use brdgen_shared::{AttachmentPaths, BrdError, BrdRequest, OutputKind, Result, form_value_text};

use crate::generation::{FALLBACK_CONTENT, SectionGenerator, section_prompt};
use crate::pipeline::ProgressReporter;
use crate::tables;

/// Placeholder written when a `table` kind is requested without a CSV.
const TABLE_PLACEHOLDER: &str = "Table data would be included here based on requirements.";

/// Placeholder written for an `image` kind (no image synthesis).
const IMAGE_PLACEHOLDER: &str = "Visual representation would be included here based on requirements.";

/// Options for one assembly run.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Generation date for the header line; injected so identical inputs
    /// produce identical documents.
    pub generated_on: NaiveDate,
    /// Resolved bearer credential, passed through to every generator call.
    pub api_key: String,
}

/// Assemble the full document for a request.
///
/// Section order is fixed: title/date, overview, technical information,
/// use case, logic, then one numbered subsection per requested output.
#[instrument(skip_all, fields(template = %request.template.template_name, outputs = request.outputs.len()))]
pub async fn assemble(
    request: &BrdRequest,
    generator: &dyn SectionGenerator,
    opts: &AssembleOptions,
    progress: &dyn ProgressReporter,
) -> Document {
    let mut doc = Document::new(
        format!(
            "Business Requirements Document: {}",
            request.template.template_name
        ),
        opts.generated_on,
    );

    progress.phase("Building overview");
    doc.heading(1, "1. Overview");
    doc.table(overview_table(request));

    progress.phase("Processing attachments");
    doc.heading(1, "2. Technical Information");
    push_attachments(&mut doc, &request.files);

    doc.heading(1, "3. Business Use Case");
    doc.paragraph(&request.business_use_case);

    doc.heading(1, "4. Business Logic");
    doc.paragraph(&request.business_logic);

    doc.heading(1, "5. Outputs");
    let total = request.outputs.len();
    for (index, section) in request.outputs.iter().enumerate() {
        progress.section_progress(index + 1, total, &section.name);
        doc.heading(2, format!("5.{} {}", index + 1, section.name));

        if section.wants(OutputKind::Content) {
            let prompt = section_prompt(
                &section.name,
                &request.business_use_case,
                &request.business_logic,
            );
            match generator.generate(&prompt, &opts.api_key).await {
                Ok(markdown) => doc.extend(brdgen_markdown::to_blocks(&markdown)),
                Err(e) => {
                    warn!(section = %section.name, error = %e, "content generation failed, substituting fallback");
                    doc.paragraph(FALLBACK_CONTENT);
                }
            }
        }

        if section.wants(OutputKind::Table) {
            match existing(&request.files.csv) {
                Some(csv_path) => {
                    doc.styled_paragraph(
                        format!("{} Table Data", section.name),
                        ParagraphStyle::Bold,
                    );
                    push_csv_table(&mut doc, csv_path);
                }
                None => doc.paragraph(TABLE_PLACEHOLDER),
            }
        }

        if section.wants(OutputKind::Image) {
            doc.paragraph(IMAGE_PLACEHOLDER);
        }
    }

    doc
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Two-column Field/Value table: one row per template field, in template
/// order. Missing form values render as empty cells; sequences are joined
/// with `", "`.
fn overview_table(request: &BrdRequest) -> TableBlock {
    let rows = request
        .template
        .overview
        .iter()
        .map(|field| {
            let value = request
                .form_data
                .get(&field.key)
                .map(form_value_text)
                .unwrap_or_default();
            vec![field.label.clone(), value]
        })
        .collect();

    TableBlock {
        headers: vec!["Field".into(), "Value".into()],
        rows,
        caption: None,
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Write the technical-information subsections for whichever attachments
/// exist. Failures become inline error paragraphs, never aborts.
fn push_attachments(doc: &mut Document, files: &AttachmentPaths) {
    if let Some(csv_path) = existing(&files.csv) {
        doc.heading(2, "2.1 Data Table");
        push_csv_table(doc, csv_path);
    }

    if let Some(image_path) = existing(&files.image) {
        doc.heading(2, "2.2 System Diagram");
        match load_image(image_path) {
            Ok(image) => doc.image(image),
            Err(e) => doc.error_paragraph(format!("Error processing image file: {e}")),
        }
    }

    if let Some(doc_path) = existing(&files.doc) {
        doc.heading(2, "2.3 Reference Document");
        doc.paragraph(format!("Reference document: {}", file_name(doc_path)));
    }
}

/// Append the CSV as a table, or a visible error paragraph on failure.
fn push_csv_table(doc: &mut Document, path: &Path) {
    match tables::table_from_csv(path) {
        Ok(table) => doc.table(table),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "CSV conversion failed");
            doc.error_paragraph(format!("Error creating table from CSV: {e}"));
        }
    }
}

/// Read an image attachment for embedding at the fixed document width.
fn load_image(path: &Path) -> Result<ImageBlock> {
    let data = std::fs::read(path).map_err(|e| BrdError::io(path, e))?;
    Ok(ImageBlock {
        data,
        mime: mime_for_extension(path),
        caption: "Figure: System Diagram".into(),
    })
}

/// MIME type from the file extension; content is not validated.
fn mime_for_extension(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// An attachment path that is present and exists on disk.
fn existing(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| p.exists())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{FailingGenerator, FixedGenerator};
    use crate::pipeline::SilentProgress;
    use brdgen_document::Block;
    use brdgen_shared::{OutputSection, OverviewField, Template};
    use std::collections::HashMap;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("brdgen-assembler-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_opts() -> AssembleOptions {
        AssembleOptions {
            generated_on: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            api_key: "sk-test".into(),
        }
    }

    fn make_request(outputs: Vec<OutputSection>) -> BrdRequest {
        let mut form_data = HashMap::new();
        form_data.insert("projectName".to_string(), serde_json::json!("Atlas"));
        form_data.insert(
            "stakeholders".to_string(),
            serde_json::json!(["Finance", "Ops"]),
        );

        BrdRequest {
            template: Template {
                template_name: "Payment Gateway".into(),
                overview: vec![
                    OverviewField {
                        key: "projectName".into(),
                        label: "Project Name".into(),
                    },
                    OverviewField {
                        key: "stakeholders".into(),
                        label: "Stakeholders".into(),
                    },
                    OverviewField {
                        key: "deadline".into(),
                        label: "Deadline".into(),
                    },
                ],
            },
            form_data,
            business_use_case: "Accept card payments for invoices.".into(),
            business_logic: "Retry failed captures once.".into(),
            outputs,
            files: AttachmentPaths::default(),
            api_key: None,
        }
    }

    fn headings(doc: &Document) -> Vec<(u8, String)> {
        doc.blocks()
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, text } => Some((*level, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn zero_outputs_yields_overview_and_narrative_only() {
        let request = make_request(vec![]);
        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        let heads = headings(&doc);
        assert_eq!(
            heads,
            vec![
                (1, "1. Overview".to_string()),
                (1, "2. Technical Information".to_string()),
                (1, "3. Business Use Case".to_string()),
                (1, "4. Business Logic".to_string()),
                (1, "5. Outputs".to_string()),
            ]
        );

        // Exactly one table (the overview), the two narrative paragraphs,
        // and no output subsections.
        let tables: Vec<_> = doc
            .blocks()
            .iter()
            .filter(|b| matches!(b, Block::Table(_)))
            .collect();
        assert_eq!(tables.len(), 1);
        assert!(doc.body_text().contains("Accept card payments"));
        assert!(doc.body_text().contains("Retry failed captures"));
        assert!(!doc.body_text().contains("5.1"));
    }

    #[tokio::test]
    async fn overview_rows_follow_template_order() {
        let request = make_request(vec![]);
        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        let table = doc
            .blocks()
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .expect("overview table");

        assert_eq!(table.headers, vec!["Field", "Value"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["Project Name", "Atlas"]);
        assert_eq!(table.rows[1], vec!["Stakeholders", "Finance, Ops"]);
        // Missing form key renders as an empty cell.
        assert_eq!(table.rows[2], vec!["Deadline", ""]);
    }

    #[tokio::test]
    async fn content_section_converts_generated_markdown() {
        let request = make_request(vec![OutputSection {
            name: "Functional Requirements".into(),
            kinds: vec![OutputKind::Content],
        }]);
        let generated = "## Scope\n\nThe system shall capture payments.\n\n- audited\n- idempotent";
        let doc = assemble(
            &request,
            &FixedGenerator(generated.into()),
            &test_opts(),
            &SilentProgress,
        )
        .await;

        let heads = headings(&doc);
        assert!(heads.contains(&(2, "5.1 Functional Requirements".to_string())));
        assert!(heads.contains(&(4, "Scope".to_string())));
        assert!(doc.body_text().contains("The system shall capture payments."));
        assert!(
            doc.blocks()
                .iter()
                .any(|b| matches!(b, Block::Bullet { text } if text == "audited"))
        );
    }

    #[tokio::test]
    async fn failed_generation_substitutes_fallback_sentence() {
        let request = make_request(vec![OutputSection {
            name: "Risks".into(),
            kinds: vec![OutputKind::Content],
        }]);
        let doc = assemble(&request, &FailingGenerator, &test_opts(), &SilentProgress).await;

        assert!(doc.body_text().contains(FALLBACK_CONTENT));
        // The run still completes with all structural sections present.
        assert!(doc.body_text().contains("5.1 Risks"));
    }

    #[tokio::test]
    async fn table_kind_without_csv_writes_placeholder() {
        let request = make_request(vec![OutputSection {
            name: "Data".into(),
            kinds: vec![OutputKind::Table],
        }]);
        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(doc.body_text().contains(TABLE_PLACEHOLDER));
    }

    #[tokio::test]
    async fn table_kind_with_csv_rerenders_under_bold_caption() {
        let dir = temp_dir();
        let csv_path = dir.join("data.csv");
        std::fs::write(&csv_path, "metric,value\nlatency,12ms\n").unwrap();

        let mut request = make_request(vec![OutputSection {
            name: "Data".into(),
            kinds: vec![OutputKind::Table],
        }]);
        request.files.csv = Some(csv_path);

        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(
            doc.blocks().iter().any(|b| matches!(
                b,
                Block::Paragraph { text, style: ParagraphStyle::Bold } if text == "Data Table Data"
            ))
        );
        // CSV renders twice: once in 2.1, once in the output section.
        let tables: Vec<_> = doc
            .blocks()
            .iter()
            .filter(|b| matches!(b, Block::Table(_)))
            .collect();
        assert_eq!(tables.len(), 3); // overview + 2.1 + section-local

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn image_kind_writes_placeholder() {
        let request = make_request(vec![OutputSection {
            name: "Diagrams".into(),
            kinds: vec![OutputKind::Image],
        }]);
        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(doc.body_text().contains(IMAGE_PLACEHOLDER));
    }

    #[tokio::test]
    async fn malformed_csv_attachment_becomes_error_paragraph() {
        let dir = temp_dir();
        // A directory at the CSV path forces a read failure.
        let csv_path = dir.join("data.csv");
        std::fs::create_dir_all(&csv_path).unwrap();

        let mut request = make_request(vec![]);
        request.files.csv = Some(csv_path);

        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(doc.body_text().contains("Error creating table from CSV"));
        assert!(doc.body_text().contains("3. Business Use Case"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn image_attachment_embeds_fixture() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/img/diagram.fixture.png");

        let mut request = make_request(vec![]);
        request.files.image = Some(fixture);

        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        let image = doc
            .blocks()
            .iter()
            .find_map(|b| match b {
                Block::Image(img) => Some(img),
                _ => None,
            })
            .expect("embedded image");
        assert_eq!(image.mime, "image/png");
        assert!(!image.data.is_empty());
        assert!(doc.body_text().contains("2.2 System Diagram"));
    }

    #[tokio::test]
    async fn unreadable_image_becomes_error_paragraph() {
        let dir = temp_dir();
        // A directory at the image path exists but cannot be read as a file.
        let image_path = dir.join("diagram.png");
        std::fs::create_dir_all(&image_path).unwrap();

        let mut request = make_request(vec![]);
        request.files.image = Some(image_path);

        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(doc.body_text().contains("Error processing image file"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn nonexistent_attachments_are_skipped_silently() {
        let mut request = make_request(vec![]);
        request.files.csv = Some(PathBuf::from("/nonexistent/brdgen/data.csv"));
        request.files.doc = Some(PathBuf::from("/nonexistent/brdgen/notes.pdf"));

        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(!doc.body_text().contains("2.1 Data Table"));
        assert!(!doc.body_text().contains("2.3 Reference Document"));
    }

    #[tokio::test]
    async fn reference_document_names_the_file() {
        let dir = temp_dir();
        let doc_path = dir.join("interface-spec.pdf");
        std::fs::write(&doc_path, b"%PDF-").unwrap();

        let mut request = make_request(vec![]);
        request.files.doc = Some(doc_path);

        let doc = assemble(&request, &FixedGenerator("x".into()), &test_opts(), &SilentProgress).await;

        assert!(
            doc.body_text()
                .contains("Reference document: interface-spec.pdf")
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mime_detection_by_extension() {
        assert_eq!(mime_for_extension(Path::new("a.png")), "image/png");
        assert_eq!(mime_for_extension(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_extension(Path::new("a.webp")), "image/webp");
        assert_eq!(
            mime_for_extension(Path::new("a.bin")),
            "application/octet-stream"
        );
    }
}
