//! Document export.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{render_html, render_pdf, PrintLayout};
use crate::error::{Error, Result};
use crate::profile::Profile;

/// Shown when a document could not be produced.
pub const EXPORT_FALLBACK_NOTICE: &str =
    "Failed to generate document. Please use the print command instead.";

/// Stem used when a profile has no usable registration number.
const FALLBACK_STEM: &str = "profile";

/// Document formats `export` can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Portable document format.
    #[default]
    Pdf,
    /// Standalone HTML document.
    Html,
}

impl ExportFormat {
    /// File extension of artifacts in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }

    /// The exporter writing this format into `output_dir`.
    #[must_use]
    pub fn exporter(self, output_dir: impl Into<PathBuf>) -> Box<dyn DocumentExporter> {
        match self {
            Self::Pdf => Box::new(PdfExporter::new(output_dir)),
            Self::Html => Box::new(HtmlExporter::new(output_dir)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes a print layout out as a document artifact.
pub trait DocumentExporter: Send + Sync {
    /// The artifact format.
    fn format(&self) -> ExportFormat;

    /// Directory artifacts are written to.
    fn output_dir(&self) -> &Path;

    /// Render `layout` to the bytes of one artifact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the document cannot be produced.
    fn render(&self, layout: &PrintLayout) -> Result<Vec<u8>>;

    /// Write `layout` to `<output_dir>/<file_stem>.<extension>` and return
    /// the artifact path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the layout is empty or the artifact
    /// cannot be rendered or written.
    fn export(&self, layout: &PrintLayout, file_stem: &str) -> Result<PathBuf> {
        let output_dir = self.output_dir();
        let path = output_dir.join(format!("{file_stem}.{}", self.format().extension()));
        if layout.is_empty() {
            return Err(Error::export(path.display().to_string(), "nothing to export"));
        }

        let bytes = self.render(layout)?;
        if !output_dir.exists() {
            debug!(path = %output_dir.display(), "Creating export directory");
            fs::create_dir_all(output_dir)
                .map_err(|e| Error::export(path.display().to_string(), e))?;
        }

        fs::write(&path, bytes).map_err(|e| Error::export(path.display().to_string(), e))?;

        info!(
            path = %path.display(),
            format = %self.format(),
            pages = layout.pages.len(),
            "Exported document"
        );
        Ok(path)
    }
}

/// Exports layouts as PDF documents.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    output_dir: PathBuf,
}

impl PdfExporter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl DocumentExporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn render(&self, layout: &PrintLayout) -> Result<Vec<u8>> {
        render_pdf(layout)
    }
}

/// Exports layouts as standalone HTML documents.
#[derive(Debug, Clone)]
pub struct HtmlExporter {
    output_dir: PathBuf,
}

impl HtmlExporter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl DocumentExporter for HtmlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn render(&self, layout: &PrintLayout) -> Result<Vec<u8>> {
        Ok(render_html(layout).into_bytes())
    }
}

/// File stem for a single-profile export, derived from its registration number.
///
/// Characters that are unsafe in file names become underscores. A blank
/// registration number falls back to `profile`.
#[must_use]
pub fn export_stem(profile: &Profile) -> String {
    let stem: String = profile
        .regn_number()
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}
