//! Constrained markdown-to-block conversion.
//!
//! Generated prose comes back from the collaborator as markdown. This crate
//! parses a deliberately small subset — ATX headings, unordered and ordered
//! list items, plain paragraphs — into typed [`Block`]s for the document.
//! Anything outside the grammar is treated as paragraph text; blank
//! segments are skipped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use brdgen_document::{Block, MAX_HEADING_DEPTH, ParagraphStyle};

/// Offset applied to markdown heading levels: generated content sits two
/// levels below the section structure that contains it.
const HEADING_OFFSET: u8 = 2;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid regex"));

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+(.+)$").expect("valid regex"));

static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+(.+)$").expect("valid regex"));

/// Convert markdown text into a sequence of typed document blocks.
///
/// Heading mapping: markdown level + 2, clamped to the document's maximum
/// heading depth. Consecutive non-blank, non-heading, non-list lines are
/// joined into one paragraph.
pub fn to_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let md_level = caps[1].len() as u8;
            let level = (md_level + HEADING_OFFSET).min(MAX_HEADING_DEPTH);
            blocks.push(Block::Heading {
                level,
                text: strip_inline_markup(caps[2].trim()),
            });
        } else if let Some(caps) = BULLET_RE.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Bullet {
                text: strip_inline_markup(&caps[1]),
            });
        } else if let Some(caps) = ORDERED_RE.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Bullet {
                text: strip_inline_markup(&caps[1]),
            });
        } else {
            paragraph.push(strip_inline_markup(trimmed));
        }
    }

    flush_paragraph(&mut paragraph, &mut blocks);

    debug!(blocks = blocks.len(), "markdown converted to blocks");
    blocks
}

/// Emit the accumulated paragraph lines as one paragraph block.
fn flush_paragraph(paragraph: &mut Vec<String>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join(" ");
    paragraph.clear();
    if !text.trim().is_empty() {
        blocks.push(Block::Paragraph {
            text,
            style: ParagraphStyle::Normal,
        });
    }
}

// ---------------------------------------------------------------------------
// Inline markup stripping
// ---------------------------------------------------------------------------

/// Strip inline emphasis, code, and link markup, keeping the text content.
fn strip_inline_markup(text: &str) -> String {
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").expect("valid regex"));
    static EMPHASIS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
    static CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

    let result = LINK_RE.replace_all(text, "$1");
    let result = BOLD_RE.replace_all(&result, "$1$2");
    let result = EMPHASIS_RE.replace_all(&result, "$1");
    let result = CODE_RE.replace_all(&result, "$1");
    result.into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
