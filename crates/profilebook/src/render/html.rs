//! Standalone HTML rendering of print layouts.

use std::fmt::Write as _;

use super::PrintLayout;

const STYLE: &str = "\
@page { size: A4 portrait; margin: 10mm; }
body { font-family: sans-serif; margin: 0; }
.profile-section { page-break-after: always; }
.profile-section:last-child { page-break-after: auto; }
h1 { text-align: center; font-size: 18pt; margin: 0 0 8mm 0; }
table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid #444; padding: 2mm 3mm; vertical-align: top; text-align: left; }
th { width: 35%; background: #f2f2f2; }
td { white-space: pre-wrap; }
.page-number { text-align: right; font-size: 9pt; margin-top: 4mm; }
";

/// Escape text for use in HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a layout as a complete HTML document.
///
/// Each page is a `profile-section` that breaks onto a new A4 sheet when
/// printed.
#[must_use]
pub fn render_html(layout: &PrintLayout) -> String {
    let title = layout
        .pages
        .first()
        .map_or_else(String::new, |page| escape(&page.header));

    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{title}</title>");
    let _ = writeln!(out, "<style>\n{STYLE}</style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");

    for page in &layout.pages {
        let _ = writeln!(out, "<section class=\"profile-section\">");
        let _ = writeln!(out, "<h1>{}</h1>", escape(&page.header));
        let _ = writeln!(out, "<table>");
        for row in &page.rows {
            let _ = writeln!(
                out,
                "<tr><th>{}</th><td>{}</td></tr>",
                escape(row.label),
                escape(&row.value)
            );
        }
        let _ = writeln!(out, "</table>");
        let _ = writeln!(out, "<div class=\"page-number\">{}</div>", page.footer());
        let _ = writeln!(out, "</section>");
    }

    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}
