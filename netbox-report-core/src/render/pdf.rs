//! PDF output using printpdf's builtin Helvetica faces.
//!
//! Layout is deliberately simple: blocks are stacked top to bottom on US
//! letter pages, paragraphs wrap on word boundaries using an average glyph
//! width, and table cells that do not fit their column are truncated.

use printpdf::{BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem};
use tracing::{debug, info};

use crate::layout::{Block, Column, Document};

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 54.0;
const LINE_SPACING: f32 = 1.3;
const BULLET_INDENT: f32 = 18.0;
const CELL_PADDING: f32 = 4.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const SUBHEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn font(self) -> BuiltinFont {
        match self {
            Face::Regular => BuiltinFont::Helvetica,
            Face::Bold => BuiltinFont::HelveticaBold,
        }
    }

    /// Average advance width as a fraction of the font size.
    fn average_width(self) -> f32 {
        match self {
            Face::Regular => 0.5,
            Face::Bold => 0.55,
        }
    }
}

fn text_width(text: &str, face: Face, size: f32) -> f32 {
    text.chars().count() as f32 * size * face.average_width()
}

fn line_height(size: f32) -> f32 {
    size * LINE_SPACING
}

/// Greedy word wrap against an estimated width. Words longer than a line are
/// left on their own line rather than split.
fn wrap(text: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && text_width(&candidate, face, size) > max_width {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate(text: &str, face: Face, size: f32, max_width: f32) -> String {
    if text_width(text, face, size) <= max_width {
        return text.to_string();
    }
    let max_chars = (max_width / (size * face.average_width())).floor() as usize;
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// Accumulates drawing operations and cuts pages when the cursor reaches the
/// bottom margin. Coordinates are points from the bottom-left corner.
struct PageWriter {
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn usable_width() -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.pages
            .push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Starts a new page unless `height` still fits above the bottom margin.
    /// Returns whether a break happened.
    fn ensure(&mut self, height: f32) -> bool {
        if self.y - height < MARGIN && !self.ops.is_empty() {
            self.break_page();
            return true;
        }
        false
    }

    fn text_at(&mut self, x: f32, baseline: f32, text: &str, face: Face, size: f32) {
        if text.is_empty() {
            return;
        }
        self.ops.extend([
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point {
                    x: Pt(x),
                    y: Pt(baseline),
                },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(size),
                font: face.font(),
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font: face.font(),
            },
            Op::EndTextSection,
        ]);
    }

    /// Writes one line at the cursor and advances it.
    fn line(&mut self, x: f32, text: &str, face: Face, size: f32) {
        let height = line_height(size);
        self.ensure(height);
        self.y -= height;
        self.text_at(x, self.y + (height - size), text, face, size);
    }

    fn wrapped(&mut self, x: f32, text: &str, face: Face, size: f32) {
        let width = PAGE_WIDTH - MARGIN - x;
        for line in wrap(text, face, size, width) {
            self.line(x, &line, face, size);
        }
    }

    fn gap(&mut self, points: f32) {
        if self.y - points < MARGIN {
            self.break_page();
        } else {
            self.y -= points;
        }
    }

    fn table(&mut self, columns: &[Column], rows: &[Vec<String>]) {
        let total_share: f32 = columns.iter().map(|c| c.width).sum::<f32>().max(1.0);
        let widths: Vec<f32> = columns
            .iter()
            .map(|c| Self::usable_width() * c.width / total_share)
            .collect();
        let header: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        let row_height = line_height(TABLE_SIZE);

        // Keep the header together with at least the first row.
        self.ensure(row_height * 2.0);
        self.table_row(&widths, &header, Face::Bold);
        for row in rows {
            if self.ensure(row_height) {
                self.table_row(&widths, &header, Face::Bold);
            }
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            self.table_row(&widths, &cells, Face::Regular);
        }
    }

    fn table_row(&mut self, widths: &[f32], cells: &[&str], face: Face) {
        let height = line_height(TABLE_SIZE);
        self.y -= height;
        let baseline = self.y + (height - TABLE_SIZE);
        let mut x = MARGIN;
        for (width, cell) in widths.iter().zip(cells) {
            let text = truncate(cell, face, TABLE_SIZE, width - CELL_PADDING);
            self.text_at(x, baseline, &text, face, TABLE_SIZE);
            x += width;
        }
    }

    fn finish(mut self) -> Vec<PdfPage> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

/// Lays out `document` and returns the encoded PDF.
pub fn render_pdf(document: &Document) -> Vec<u8> {
    let mut writer = PageWriter::new();

    for block in &document.blocks {
        match block {
            Block::Title(text) => writer.wrapped(MARGIN, text, Face::Bold, TITLE_SIZE),
            Block::Heading(text) => {
                writer.ensure(line_height(HEADING_SIZE) + line_height(BODY_SIZE) * 2.0);
                writer.gap(4.0);
                writer.wrapped(MARGIN, text, Face::Bold, HEADING_SIZE);
            }
            Block::Subheading(text) => {
                writer.ensure(line_height(SUBHEADING_SIZE) + line_height(BODY_SIZE) * 2.0);
                writer.wrapped(MARGIN, text, Face::Bold, SUBHEADING_SIZE);
            }
            Block::Paragraph(text) => writer.wrapped(MARGIN, text, Face::Regular, BODY_SIZE),
            Block::Strong(text) => writer.wrapped(MARGIN, text, Face::Bold, BODY_SIZE),
            Block::Bullets(items) => {
                for item in items {
                    let height = line_height(BODY_SIZE);
                    writer.ensure(height);
                    let baseline = writer.y - height + (height - BODY_SIZE);
                    writer.text_at(MARGIN + BULLET_INDENT / 2.0, baseline, "-", Face::Regular, BODY_SIZE);
                    writer.wrapped(MARGIN + BULLET_INDENT, item, Face::Regular, BODY_SIZE);
                }
            }
            Block::Table { columns, rows } => writer.table(columns, rows),
            Block::Spacer(points) => writer.gap(*points),
        }
    }

    let pages = writer.finish();
    let page_count = pages.len();

    let mut doc = PdfDocument::new(&document.title);
    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);

    if !warnings.is_empty() {
        debug!(warnings = warnings.len(), "printpdf reported warnings while saving");
    }
    info!(pages = page_count, bytes = bytes.len(), "Rendered PDF");
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_words_within_width() {
        let lines = wrap("alpha beta gamma delta", Face::Regular, 10.0, 60.0);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
        assert_eq!(wrap("", Face::Regular, 10.0, 60.0), vec![String::new()]);
    }

    #[test]
    fn truncate_marks_overflowing_cells() {
        assert_eq!(truncate("short", Face::Regular, 10.0, 100.0), "short");
        let cut = truncate("a-very-long-hostname-value", Face::Regular, 10.0, 50.0);
        assert_eq!(cut, "a-very-...");
    }
}
