//! PDF rendering of print layouts.
//!
//! Pages are A4 portrait with 10 mm margins, set in the standard Helvetica
//! faces. Those faces only cover ASCII, so other characters are dropped from
//! PDF text; a header left blank by that is omitted.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::{PrintLayout, PrintPage};
use crate::error::{Error, Result};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 6.0;
const VALUE_X: f32 = 75.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const LAYER_NAME: &str = "profile";

/// Characters per value line before wrapping.
const WRAP_COLUMNS: usize = 60;

/// Lowest baseline body text may use; below it the footer goes.
const BODY_FLOOR: f32 = MARGIN + 2.0 * LINE_HEIGHT;

fn pdf_error(err: printpdf::Error) -> Error {
    Error::export("pdf document", err)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Writes one printed profile, continuing onto extra sheets when it overflows.
struct Sheet<'a> {
    doc: &'a PdfDocumentReference,
    fonts: &'a Fonts,
    layer: PdfLayerReference,
    footer: String,
    y: f32,
}

impl Sheet<'_> {
    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, lines: f32) {
        self.y -= LINE_HEIGHT * lines;
        if self.y < BODY_FLOOR {
            self.finish();
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT.0 - MARGIN - LINE_HEIGHT;
        }
    }

    fn finish(&self) {
        self.layer.use_text(
            self.footer.as_str(),
            BODY_SIZE,
            Mm(PAGE_WIDTH.0 / 2.0 - 6.0),
            Mm(MARGIN),
            &self.fonts.regular,
        );
    }
}

/// Keep the characters the standard fonts can show.
fn pdf_text(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Split a value into lines of at most [`WRAP_COLUMNS`] characters, breaking
/// on whitespace where possible.
fn wrap(value: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for source in value.lines() {
        let mut current = String::new();
        for word in source.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > WRAP_COLUMNS {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split = word
                    .char_indices()
                    .nth(WRAP_COLUMNS)
                    .map_or(word.len(), |(i, _)| i);
                let rest = word.split_off(split);
                lines.push(word);
                word = rest;
            }
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > WRAP_COLUMNS {
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
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn write_page(sheet: &mut Sheet<'_>, page: &PrintPage) {
    let header = pdf_text(&page.header);
    if !header.trim().is_empty() {
        sheet.text(header.trim(), TITLE_SIZE, MARGIN, true);
        sheet.advance(2.0);
    }

    for row in &page.rows {
        sheet.text(&pdf_text(row.label), BODY_SIZE, MARGIN, true);
        for line in wrap(&row.value) {
            sheet.text(&pdf_text(&line), BODY_SIZE, VALUE_X, false);
            sheet.advance(1.0);
        }
    }
    sheet.finish();
}

/// Render a layout as a PDF document, one sheet per page at minimum.
///
/// # Errors
///
/// Returns [`Error::Export`] if the document cannot be assembled.
pub fn render_pdf(layout: &PrintLayout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Profiles", PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    let mut first = Some((first_page, first_layer));
    for page in &layout.pages {
        let (page_index, layer_index) = first
            .take()
            .unwrap_or_else(|| doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME));
        let mut sheet = Sheet {
            doc: &doc,
            fonts: &fonts,
            layer: doc.get_page(page_index).get_layer(layer_index),
            footer: page.footer(),
            y: PAGE_HEIGHT.0 - MARGIN - LINE_HEIGHT,
        };
        write_page(&mut sheet, page);
    }

    doc.save_to_bytes().map_err(pdf_error)
}
