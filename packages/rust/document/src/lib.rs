//! Typed document model for generated BRDs.
//!
//! A [`Document`] is an append-only sequence of typed [`Block`]s plus a
//! title and generation date. Blocks are appended in order by the assembler
//! and never mutated afterwards; rendering happens once, at the end.

mod render;

pub use render::render_html;

use chrono::NaiveDate;

/// Maximum heading depth below the document title.
///
/// The title renders one level above heading 1, so level 5 is the deepest
/// heading the output format can express.
pub const MAX_HEADING_DEPTH: u8 = 5;

/// Fixed body font size in points.
pub const BODY_FONT_PT: u8 = 11;

/// Fixed width for embedded images, in pixels.
pub const IMAGE_WIDTH_PX: u32 = 576;

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Visual treatment of a paragraph block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Plain body text.
    Normal,
    /// Centered italic metadata line (the generation date).
    Meta,
    /// Centered caption under a table or figure.
    Caption,
    /// Bold lead-in line (section-local table captions).
    Bold,
    /// Visible inline error text substituted for a failed attachment.
    Error,
}

/// A two-dimensional table with a bold-rendered header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Optional caption rendered with the table.
    pub caption: Option<String>,
}

/// An embedded raster image, carried as raw bytes until render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub data: Vec<u8>,
    /// MIME type used in the data URI (e.g. `image/png`).
    pub mime: String,
    pub caption: String,
}

/// One typed element of the generated document.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading at a level 1..=[`MAX_HEADING_DEPTH`] below the title.
    Heading { level: u8, text: String },
    Paragraph { text: String, style: ParagraphStyle },
    /// A single bullet item; consecutive items render as one list.
    Bullet { text: String },
    Table(TableBlock),
    Image(ImageBlock),
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An append-only generated document.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    generated_on: NaiveDate,
    blocks: Vec<Block>,
}

impl Document {
    /// Create an empty document with the given title and generation date.
    ///
    /// The date is injected rather than sampled so that two runs over
    /// identical inputs produce identical output.
    pub fn new(title: impl Into<String>, generated_on: NaiveDate) -> Self {
        Self {
            title: title.into(),
            generated_on,
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn generated_on(&self) -> NaiveDate {
        self.generated_on
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append a heading, clamping the level into 1..=[`MAX_HEADING_DEPTH`].
    pub fn heading(&mut self, level: u8, text: impl Into<String>) {
        let level = level.clamp(1, MAX_HEADING_DEPTH);
        self.blocks.push(Block::Heading {
            level,
            text: text.into(),
        });
    }

    /// Append a plain paragraph.
    pub fn paragraph(&mut self, text: impl Into<String>) {
        self.styled_paragraph(text, ParagraphStyle::Normal);
    }

    /// Append a paragraph with an explicit style.
    pub fn styled_paragraph(&mut self, text: impl Into<String>, style: ParagraphStyle) {
        self.blocks.push(Block::Paragraph {
            text: text.into(),
            style,
        });
    }

    /// Append a bullet item.
    pub fn bullet(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Bullet { text: text.into() });
    }

    /// Append a visible error paragraph in place of failed content.
    pub fn error_paragraph(&mut self, text: impl Into<String>) {
        self.styled_paragraph(text, ParagraphStyle::Error);
    }

    pub fn table(&mut self, table: TableBlock) {
        self.blocks.push(Block::Table(table));
    }

    pub fn image(&mut self, image: ImageBlock) {
        self.blocks.push(Block::Image(image));
    }

    /// Append a pre-built block (used by the markdown converter's output).
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append a sequence of pre-built blocks.
    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.extend(blocks);
    }

    /// Concatenated text content of every block, for content assertions.
    /// Headings, cells, and captions are included; image bytes are not.
    pub fn body_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading { text, .. } | Block::Bullet { text } => {
                    out.push_str(text);
                    out.push('\n');
                }
                Block::Paragraph { text, .. } => {
                    out.push_str(text);
                    out.push('\n');
                }
                Block::Table(table) => {
                    out.push_str(&table.headers.join(" "));
                    out.push('\n');
                    for row in &table.rows {
                        out.push_str(&row.join(" "));
                        out.push('\n');
                    }
                    if let Some(caption) = &table.caption {
                        out.push_str(caption);
                        out.push('\n');
                    }
                }
                Block::Image(image) => {
                    out.push_str(&image.caption);
                    out.push('\n');
                }
            }
        }
        out
    }
}
