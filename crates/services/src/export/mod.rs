//! Document export
//!
//! Renders caller-supplied text into a downloadable PDF, DOCX or RTF file.

mod docx;
mod pdf;
mod rtf;

use config::ExportConfig;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to render document: {0}")]
    Render(String),
}

/// Blank text cannot be exported in any format
pub fn validate_text(text: &str) -> Result<(), ExportError> {
    if text.trim().is_empty() {
        return Err(ExportError::Validation("Text is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Rtf,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Rtf => "rtf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Rtf => "application/rtf",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "rtf" => Ok(DocumentFormat::Rtf),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered file ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub document_title: String,
    pub file_stem: String,
    /// Directory holding the PDF font file
    pub font_dir: String,
    /// Font name; the file is `<family>-Regular.ttf` or `<family>.ttf`
    pub font_family: String,
}

impl From<&ExportConfig> for ExportSettings {
    fn from(config: &ExportConfig) -> Self {
        Self {
            document_title: config.document_title.clone(),
            file_stem: config.file_stem.clone(),
            font_dir: config.font_dir.clone(),
            font_family: config.font_family.clone(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct DocumentExporter {
    settings: ExportSettings,
}

impl DocumentExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Render `text` in the given format
    ///
    /// PDF layout is CPU-bound, so it runs on the blocking pool.
    pub async fn export(
        &self,
        text: String,
        format: DocumentFormat,
    ) -> Result<ExportedDocument, ExportError> {
        validate_text(&text)?;

        let document = match format {
            DocumentFormat::Pdf => {
                let exporter = self.clone();
                tokio::task::spawn_blocking(move || exporter.render(&text, format))
                    .await
                    .map_err(|e| ExportError::Render(format!("PDF task failed: {e}")))??
            }
            _ => self.render(&text, format)?,
        };

        tracing::info!(
            %format,
            size_bytes = document.bytes.len(),
            "Document exported"
        );
        Ok(document)
    }

    fn render(&self, text: &str, format: DocumentFormat) -> Result<ExportedDocument, ExportError> {
        let title = &self.settings.document_title;
        let bytes = match format {
            DocumentFormat::Pdf => pdf::render(&self.settings, text),
            DocumentFormat::Docx => docx::render(title, text),
            DocumentFormat::Rtf => Ok(rtf::render(title, text).into_bytes()),
        }
        .map_err(|e| {
            tracing::error!(error = %e, %format, "Document rendering failed");
            e
        })?;

        Ok(ExportedDocument {
            bytes,
            content_type: format.content_type(),
            filename: format!("{}.{}", self.settings.file_stem, format.extension()),
        })
    }
}
