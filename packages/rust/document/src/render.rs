//! Self-contained HTML rendering for the document model.
//!
//! One document renders to one HTML file with an inline stylesheet and
//! base64 data-URI images, so the artifact has no external references.
//! All interpolated text is escaped; block content is never trusted.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::{BODY_FONT_PT, Block, Document, IMAGE_WIDTH_PX, ParagraphStyle};

/// Inline stylesheet carrying the fixed formatting policy: body font,
/// bordered tables with bold headers, centered captions and metadata.
const STYLESHEET: &str = "\
body { font-family: Calibri, 'Segoe UI', sans-serif; font-size: FONTpt; \
max-width: 52rem; margin: 2rem auto; padding: 0 1rem; color: #1a1a1a; }
h1 { text-align: center; }
table { border-collapse: collapse; width: 100%; margin: 0.75rem 0; }
th, td { border: 1px solid #808080; padding: 0.3rem 0.55rem; text-align: left; }
th { font-weight: bold; background: #f2f2f2; }
caption { caption-side: bottom; font-style: italic; padding-top: 0.3rem; }
figure { text-align: center; margin: 0.75rem 0; }
figcaption { font-style: italic; }
p.meta { text-align: center; font-style: italic; }
p.caption { text-align: center; font-style: italic; }
p.bold { font-weight: bold; }
p.error { color: #8a1f1f; }
";

/// Render a document to a complete HTML page.
pub fn render_html(doc: &Document) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(doc.title())));
    html.push_str("<style>\n");
    html.push_str(&STYLESHEET.replace("FONT", &BODY_FONT_PT.to_string()));
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>{}</h1>\n", escape_html(doc.title())));
    html.push_str(&format!(
        "<p class=\"meta\">Generated on {}</p>\n",
        doc.generated_on().format("%B %d, %Y")
    ));

    render_blocks(&mut html, doc.blocks());

    html.push_str("</body>\n</html>\n");

    debug!(blocks = doc.blocks().len(), bytes = html.len(), "document rendered");
    html
}

/// Render the block sequence, grouping consecutive bullets into one list.
fn render_blocks(html: &mut String, blocks: &[Block]) {
    let mut in_list = false;

    for block in blocks {
        if in_list && !matches!(block, Block::Bullet { .. }) {
            html.push_str("</ul>\n");
            in_list = false;
        }

        match block {
            Block::Heading { level, text } => {
                // The title occupies <h1>, so heading level n renders as <h(n+1)>.
                let tag = level + 1;
                html.push_str(&format!("<h{tag}>{}</h{tag}>\n", escape_html(text)));
            }
            Block::Paragraph { text, style } => {
                html.push_str(&render_paragraph(text, *style));
            }
            Block::Bullet { text } => {
                if !in_list {
                    html.push_str("<ul>\n");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>\n", escape_html(text)));
            }
            Block::Table(table) => {
                render_table(html, table);
            }
            Block::Image(image) => {
                let encoded = BASE64.encode(&image.data);
                html.push_str(&format!(
                    "<figure><img src=\"data:{};base64,{}\" width=\"{}\" alt=\"{}\">\
                     <figcaption>{}</figcaption></figure>\n",
                    escape_html(&image.mime),
                    encoded,
                    IMAGE_WIDTH_PX,
                    escape_html(&image.caption),
                    escape_html(&image.caption),
                ));
            }
        }
    }

    if in_list {
        html.push_str("</ul>\n");
    }
}

fn render_paragraph(text: &str, style: ParagraphStyle) -> String {
    let escaped = escape_html(text);
    match style {
        ParagraphStyle::Normal => format!("<p>{escaped}</p>\n"),
        ParagraphStyle::Meta => format!("<p class=\"meta\">{escaped}</p>\n"),
        ParagraphStyle::Caption => format!("<p class=\"caption\">{escaped}</p>\n"),
        ParagraphStyle::Bold => format!("<p class=\"bold\">{escaped}</p>\n"),
        ParagraphStyle::Error => format!("<p class=\"error\">{escaped}</p>\n"),
    }
}

fn render_table(html: &mut String, table: &crate::TableBlock) {
    html.push_str("<table>\n");
    if let Some(caption) = &table.caption {
        html.push_str(&format!("<caption>{}</caption>\n", escape_html(caption)));
    }
    html.push_str("<thead><tr>");
    for header in &table.headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
}

/// Escape text for interpolation into HTML element content or attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
