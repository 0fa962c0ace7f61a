//! A small top-down page writer over `printpdf`.
//!
//! Keeps a y cursor in millimetres and opens a new page whenever the next
//! element would cross the bottom margin. Text is drawn with the builtin
//! Helvetica faces, which only cover Latin-1 reliably; accented letters
//! are folded to ASCII before drawing.

use std::io::BufWriter;

use printpdf::*;

use super::ReportError;

/// US Letter.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_LEFT;

const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.0;
/// Approximate Helvetica advance at 1pt, in mm per character.
const CHAR_WIDTH_PER_PT: f32 = 0.19;

pub struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PdfWriter {
    pub fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page1, layer1) =
            PdfDocument::new(fold_to_ascii(title), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: PAGE_HEIGHT - MARGIN_TOP,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed >= MARGIN_BOTTOM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn text_at(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.font };
        self.layer
            .use_text(fold_to_ascii(text), size, Mm(x), Mm(self.y), font);
    }

    fn text_centered(&self, text: &str, size: f32, bold: bool) {
        let width = text.chars().count() as f32 * size * CHAR_WIDTH_PER_PT;
        let x = (PAGE_WIDTH - width).max(2.0 * MARGIN_LEFT) / 2.0;
        self.text_at(text, size, x, bold);
    }

    pub fn title(&mut self, text: &str) {
        self.ensure_space(12.0);
        self.text_centered(text, 16.0, true);
        self.y -= 12.0;
    }

    /// A centred, small line, used for the letterhead.
    pub fn centered_line(&mut self, text: &str) {
        self.ensure_space(LINE_HEIGHT);
        self.text_centered(text, 9.0, false);
        self.y -= 4.5;
    }

    /// Section heading with a rule underneath.
    pub fn heading(&mut self, text: &str) {
        self.ensure_space(12.0);
        self.y -= 2.0;
        self.text_at(text, 12.0, MARGIN_LEFT, true);
        self.y -= 2.0;
        self.rule(0.5);
        self.y -= 5.0;
    }

    /// `Label: value` on one line, the label in bold.
    pub fn field(&mut self, label: &str, value: &str) {
        let label = format!("{label}:");
        let offset = (label.chars().count() as f32 + 1.0) * BODY_SIZE * CHAR_WIDTH_PER_PT * 1.1;
        let max_chars = chars_for_width(CONTENT_WIDTH - offset, BODY_SIZE);
        let lines = wrap_text(value, max_chars);
        self.ensure_space(LINE_HEIGHT * lines.len() as f32);
        self.text_at(&label, BODY_SIZE, MARGIN_LEFT, true);
        for line in lines {
            self.ensure_space(LINE_HEIGHT);
            self.text_at(&line, BODY_SIZE, MARGIN_LEFT + offset, false);
            self.y -= LINE_HEIGHT;
        }
    }

    pub fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, chars_for_width(CONTENT_WIDTH, BODY_SIZE)) {
            self.ensure_space(LINE_HEIGHT);
            self.text_at(&line, BODY_SIZE, MARGIN_LEFT, false);
            self.y -= LINE_HEIGHT;
        }
    }

    pub fn bold_line(&mut self, text: &str) {
        self.ensure_space(LINE_HEIGHT);
        self.text_at(text, BODY_SIZE, MARGIN_LEFT, true);
        self.y -= LINE_HEIGHT;
    }

    /// A bulleted item; `level` 0 uses a dot, deeper levels a dash.
    pub fn bullet(&mut self, text: &str, level: usize) {
        let indent = MARGIN_LEFT + 4.0 + 6.0 * level as f32;
        let marker = if level == 0 { "\u{2022}" } else { "-" };
        let max_chars = chars_for_width(PAGE_WIDTH - MARGIN_LEFT - indent - 4.0, BODY_SIZE);
        for (i, line) in wrap_text(text, max_chars).iter().enumerate() {
            self.ensure_space(LINE_HEIGHT);
            if i == 0 {
                self.text_at(marker, BODY_SIZE, indent, false);
            }
            self.text_at(line, BODY_SIZE, indent + 4.0, false);
            self.y -= LINE_HEIGHT;
        }
    }

    /// A gridded table; the first row is the header.
    ///
    /// `widths` are column widths in millimetres. Cells wrap inside their
    /// column and a row never splits across pages.
    pub fn table(&mut self, widths: &[f32], header: &[&str], rows: &[Vec<String>]) {
        const SIZE: f32 = 9.0;
        const ROW_LINE: f32 = 4.5;

        let mut all: Vec<(bool, Vec<Vec<String>>)> = Vec::with_capacity(rows.len() + 1);
        all.push((
            true,
            header
                .iter()
                .zip(widths)
                .map(|(h, w)| wrap_text(h, chars_for_width(*w - 2.0, SIZE)))
                .collect(),
        ));
        for row in rows {
            all.push((
                false,
                row.iter()
                    .zip(widths)
                    .map(|(cell, w)| wrap_text(cell, chars_for_width(*w - 2.0, SIZE)))
                    .collect(),
            ));
        }

        let total_width: f32 = widths.iter().sum();
        for (is_header, cells) in all {
            let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
            let height = lines as f32 * ROW_LINE + 2.0;
            if self.y - height < MARGIN_BOTTOM {
                self.ensure_space(height);
            }
            let top = self.y;
            self.hline(MARGIN_LEFT, MARGIN_LEFT + total_width, top);

            let mut x = MARGIN_LEFT;
            for (cell, w) in cells.iter().zip(widths) {
                self.vline(x, top, top - height);
                self.y = top - ROW_LINE;
                for line in cell {
                    self.text_at(line, SIZE, x + 1.5, is_header);
                    self.y -= ROW_LINE;
                }
                x += w;
            }
            self.vline(x, top, top - height);
            self.y = top - height;
            self.hline(MARGIN_LEFT, MARGIN_LEFT + total_width, self.y);
        }
        self.y -= 4.0;
    }

    pub fn space(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Full-width horizontal rule at the cursor.
    pub fn rule(&mut self, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.hline(MARGIN_LEFT, PAGE_WIDTH - MARGIN_LEFT, self.y);
    }

    /// Small grey centred footer text.
    pub fn footer(&mut self, text: &str) {
        self.ensure_space(10.0);
        self.y -= 4.0;
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
        self.text_centered(text, 8.0, false);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.y -= LINE_HEIGHT;
    }

    fn hline(&self, x1: f32, x2: f32, y: f32) {
        self.segment((x1, y), (x2, y));
    }

    fn vline(&self, x: f32, y1: f32, y2: f32) {
        self.segment((x, y1), (x, y2));
    }

    fn segment(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }

    pub fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
    }
}

fn chars_for_width(width_mm: f32, size: f32) -> usize {
    ((width_mm / (size * CHAR_WIDTH_PER_PT)).floor() as usize).max(8)
}

/// Greedy word wrap; words longer than a line are hard-split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Replace Spanish accented letters and typographic marks the builtin
/// fonts cannot show; anything else outside ASCII becomes `?`.
pub(crate) fn fold_to_ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'ñ' => 'n',
            'Ñ' => 'N',
            'ç' => 'c',
            'Ç' => 'C',
            '¿' | '¡' => ' ',
            '\u{2022}' => '*',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\t' => ' ',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("uno dos tres cuatro cinco seis", 10);
        assert_eq!(lines, vec!["uno dos", "tres", "cuatro", "cinco seis"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("abcdefghijkl xy", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl xy"]);
    }

    #[test]
    fn wrap_empty_gives_one_blank_line() {
        assert_eq!(wrap_text("   ", 20), vec![String::new()]);
    }

    #[test]
    fn fold_removes_accents() {
        assert_eq!(fold_to_ascii("Diagnóstico Médico: niño"), "Diagnostico Medico: nino");
        assert_eq!(fold_to_ascii("\u{2022} ok"), "* ok");
    }

    #[test]
    fn long_content_spills_onto_new_pages() {
        let mut w = PdfWriter::new("Test").unwrap();
        for i in 0..200 {
            w.bullet(&format!("Linea {i}"), 0);
        }
        assert!(w.page_count() > 1);
        let bytes = w.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn table_rows_render() {
        let mut w = PdfWriter::new("Table").unwrap();
        w.table(
            &[40.0, 80.0],
            &["Field", "Value"],
            &[vec!["Name".into(), "John Doe".into()], vec!["Notes".into(), "x ".repeat(200)]],
        );
        assert_eq!(w.page_count(), 1);
        assert!(w.finish().unwrap().starts_with(b"%PDF"));
    }
}
