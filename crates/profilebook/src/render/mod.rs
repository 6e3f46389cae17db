//! Print layouts for profiles.
//!
//! A [`PrintLayout`] is one page per profile: a header title, every field as a
//! label/value row in form order, and a page number footer. Layouts render as:
//!
//! - **Text** for printing from the terminal ([`render_text`]).
//! - **HTML** as a standalone document artifact ([`render_html`]).
//! - **PDF** as an A4 portrait document artifact ([`render_pdf`]).
//!
//! Document artifacts are written through a [`DocumentExporter`].
//!
//! # Example
//!
//! ```
//! use profilebook::render::{render_text, PrintLayout, PrintOptions};
//! use profilebook::{Profile, ProfileFields};
//!
//! let mut fields = ProfileFields::default();
//! fields.regn_number = "REG001".to_string();
//! let profile = Profile {
//!     id: "abc".to_string(),
//!     fields,
//!     created_at: 0,
//!     updated_at: 0,
//! };
//!
//! let layout = PrintLayout::single(&profile, &PrintOptions::default());
//! let text = render_text(&layout);
//! assert!(text.contains("REG001"));
//! assert!(text.contains("Page 1"));
//! ```

mod export;
mod html;
mod pdf;

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::profile::{Profile, ProfileField};

pub use export::{
    export_stem, DocumentExporter, ExportFormat, HtmlExporter, PdfExporter, EXPORT_FALLBACK_NOTICE,
};
pub use html::render_html;
pub use pdf::render_pdf;

/// Default page header.
pub const DEFAULT_HEADER_TITLE: &str = "బ్రహ్మముడి బ్రాహ్మణ కళ్యాణ బంధం";

/// Printed in place of a blank value.
pub const DEFAULT_EMPTY_PLACEHOLDER: &str = "-";

/// Presentation settings shared by every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Title printed at the top of every page.
    pub header_title: String,
    /// Text printed for blank values.
    pub empty_placeholder: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            header_title: DEFAULT_HEADER_TITLE.to_string(),
            empty_placeholder: DEFAULT_EMPTY_PLACEHOLDER.to_string(),
        }
    }
}

/// One label/value line of a printed profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRow {
    pub label: &'static str,
    pub value: String,
}

/// A single printed profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintPage {
    pub header: String,
    pub rows: Vec<PrintRow>,
    /// 1-based page number.
    pub page_number: usize,
}

impl PrintPage {
    fn new(profile: &Profile, page_number: usize, options: &PrintOptions) -> Self {
        let rows = ProfileField::ALL
            .into_iter()
            .map(|field| {
                let value = profile.get(field).trim();
                PrintRow {
                    label: field.label(),
                    value: if value.is_empty() {
                        options.empty_placeholder.clone()
                    } else {
                        value.to_string()
                    },
                }
            })
            .collect();

        Self {
            header: options.header_title.clone(),
            rows,
            page_number,
        }
    }

    /// Footer text, e.g. "Page 3".
    #[must_use]
    pub fn footer(&self) -> String {
        format!("Page {}", self.page_number)
    }
}

/// A paginated print layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintLayout {
    pub pages: Vec<PrintPage>,
}

impl PrintLayout {
    /// Layout for a single profile.
    #[must_use]
    pub fn single(profile: &Profile, options: &PrintOptions) -> Self {
        Self {
            pages: vec![PrintPage::new(profile, 1, options)],
        }
    }

    /// Layout with one page per profile, in the given order.
    #[must_use]
    pub fn all(profiles: &[Profile], options: &PrintOptions) -> Self {
        let pages = profiles
            .iter()
            .enumerate()
            .map(|(i, profile)| PrintPage::new(profile, i + 1, options))
            .collect();
        Self { pages }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Width of the label column in the text rendering.
const LABEL_WIDTH: usize = 28;

/// Render a layout for terminal printing.
///
/// Pages are separated by a form feed so a printer starts each on a new sheet.
#[must_use]
pub fn render_text(layout: &PrintLayout) -> String {
    let mut out = String::new();

    for (i, page) in layout.pages.iter().enumerate() {
        if i > 0 {
            out.push('\u{c}');
            out.push('\n');
        }

        let _ = writeln!(out, "{}", page.header);
        let _ = writeln!(out, "{}", "=".repeat(LABEL_WIDTH + 40));

        for row in &page.rows {
            let mut lines = row.value.lines();
            let first = lines.next().unwrap_or_default();
            let _ = writeln!(out, "{:<LABEL_WIDTH$} | {first}", row.label);
            for line in lines {
                let _ = writeln!(out, "{:<LABEL_WIDTH$} | {line}", "");
            }
        }

        let _ = writeln!(out, "{}", "-".repeat(LABEL_WIDTH + 40));
        let _ = writeln!(out, "{:>width$}", page.footer(), width = LABEL_WIDTH + 40);
    }

    out
}
