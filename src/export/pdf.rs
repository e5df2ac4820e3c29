//! Local PDF rendering via `printpdf`, used when no HTML→PDF render service is
//! configured. Produces a plain tabular document: one block per section, date
//! columns split across blocks when they do not fit the page width.

use std::collections::BTreeSet;
use std::io::BufWriter;

use printpdf::*;

use super::html::SectionLayout;
use super::ExportError;
use crate::comparison::{CanonicalTest, ComparisonMatrix};
use crate::models::TestStatus;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 14.0;
const TOP: f32 = PAGE_HEIGHT - MARGIN;
const BOTTOM: f32 = 16.0;
const ROW_HEIGHT: f32 = 4.6;

const NAME_WIDTH: f32 = 62.0;
const UNIT_WIDTH: f32 = 22.0;
const RANGE_WIDTH: f32 = 32.0;
const DATE_WIDTH: f32 = 27.0;
const MAX_DATE_COLUMNS: usize = 6;

/// Built-in PDF fonts only cover WinAnsi; keep the output printable ASCII.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '↑' => '^',
            '↓' => 'v',
            '—' | '–' => '-',
            'µ' | 'μ' => 'u',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

/// Truncate to roughly fit a column of `max_chars` characters.
fn fit(text: &str, max_chars: usize) -> String {
    let safe = pdf_safe(text);
    if safe.chars().count() <= max_chars {
        return safe;
    }
    let mut cut: String = safe.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

fn cell_text(matrix: &ComparisonMatrix, test: &CanonicalTest, col: usize) -> String {
    match matrix.lookup(&test.canonical_name, col) {
        None => "-".to_string(),
        Some(obs) => {
            let flag = match obs.status {
                TestStatus::High => " (H)",
                TestStatus::Low => " (L)",
                TestStatus::Normal => "",
            };
            format!("{}{}", obs.value.display(), flag)
        }
    }
}

struct Cursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
    pages: usize,
}

impl Cursor {
    fn ensure_room(&mut self, needed: f32) {
        if self.y.0 - needed < BOTTOM {
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Page {}", self.pages),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = Mm(TOP);
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), self.y, font);
    }
}

/// Render the comparison as a landscape A4 PDF.
pub fn render_matrix_pdf(
    matrix: &ComparisonMatrix,
    selected: &BTreeSet<String>,
    layout: &SectionLayout,
) -> Result<Vec<u8>, ExportError> {
    let title = "Blood Test Comparison";
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;
    let mono = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ExportError::Pdf(format!("font error: {e}")))?;

    let tests = matrix.filter_categories(selected);
    let labels: Vec<&str> = matrix.columns().iter().map(|c| c.display_label()).collect();
    let column_indices: Vec<usize> = (0..labels.len()).collect();

    let mut cur = Cursor {
        doc,
        layer,
        y: Mm(TOP),
        pages: 1,
    };

    cur.text(title, 14.0, MARGIN, &bold);
    cur.y -= Mm(6.0);
    cur.text(
        &format!("{} tests, {} dates", tests.len(), labels.len()),
        9.0,
        MARGIN,
        &font,
    );
    cur.y -= Mm(8.0);

    if tests.is_empty() {
        cur.text("No test results to compare.", 10.0, MARGIN, &font);
    }

    for (section, section_tests) in layout.partition(&tests) {
        // An empty matrix still prints names, so chunk over at least one pass.
        let chunks: Vec<&[usize]> = if column_indices.is_empty() {
            vec![column_indices.as_slice()]
        } else {
            column_indices.chunks(MAX_DATE_COLUMNS).collect()
        };

        for chunk in chunks {
            cur.ensure_room(ROW_HEIGHT * 4.0);
            cur.text(&pdf_safe(&section.to_uppercase()), 11.0, MARGIN, &bold);
            cur.y -= Mm(6.0);
            write_header(&mut cur, &labels, chunk, &bold);

            for test in &section_tests {
                if cur.y.0 - ROW_HEIGHT < BOTTOM {
                    cur.ensure_room(ROW_HEIGHT * 2.0);
                    write_header(&mut cur, &labels, chunk, &bold);
                }
                let mut x = MARGIN;
                cur.text(&fit(&test.canonical_name, 34), 8.0, x, &font);
                x += NAME_WIDTH;
                cur.text(&fit(&test.unit, 11), 8.0, x, &font);
                x += UNIT_WIDTH;
                cur.text(&fit(&test.reference_range, 16), 8.0, x, &font);
                x += RANGE_WIDTH;
                for &col in chunk {
                    cur.text(&fit(&cell_text(matrix, test, col), 14), 8.0, x, &mono);
                    x += DATE_WIDTH;
                }
                cur.y -= Mm(ROW_HEIGHT);
            }
            cur.y -= Mm(4.0);
        }
    }

    let Cursor { doc, .. } = cur;
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer error: {e}")))
}

fn write_header(cur: &mut Cursor, labels: &[&str], chunk: &[usize], bold: &IndirectFontRef) {
    let mut x = MARGIN;
    cur.text("Test", 8.0, x, bold);
    x += NAME_WIDTH;
    cur.text("Unit", 8.0, x, bold);
    x += UNIT_WIDTH;
    cur.text("Reference", 8.0, x, bold);
    x += RANGE_WIDTH;
    for &col in chunk {
        let label = labels.get(col).copied().unwrap_or_default();
        cur.text(&fit(label, 14), 8.0, x, bold);
        x += DATE_WIDTH;
    }
    cur.y -= Mm(ROW_HEIGHT + 1.0);
}
