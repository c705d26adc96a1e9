//! Document export of search results.
//!
//! A `DocumentExporter` turns a sorted record set into a document and reports
//! where it was stored. `CsvFileExporter` writes CSV files to a local
//! directory; other document types are reported as unsupported.

use crate::models::LogRecord;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Header row of exported CSV documents.
pub const CSV_HEADER: &str = "Timestamp,Level,Message,Calling File,Calling Method";

/// Kind of document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// Rendered PDF report.
    Pdf,
    /// Comma-separated values.
    Csv,
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for DocType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            _ => Err(ExportError::UnknownDocType(s.to_string())),
        }
    }
}

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The exporter cannot produce this document type.
    #[error("Document type '{0}' is not supported")]
    Unsupported(DocType),

    /// The requested document type is not recognized.
    #[error("Unknown document type '{0}'")]
    UnknownDocType(String),

    /// Encoding the document failed.
    #[error("Failed to encode document: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the document failed.
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an exported document was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    /// Location of the document.
    pub location: String,
    /// Number of records written.
    pub records: usize,
}

/// Produces documents from retrieved records.
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    /// Exports `records` for `unique_id` as a `doc_type` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document type is unsupported or the document
    /// cannot be stored.
    async fn export(
        &self,
        unique_id: &str,
        doc_type: DocType,
        records: &[LogRecord],
    ) -> Result<ExportReceipt, ExportError>;
}

/// Writes CSV documents to `{dir}/{unique_id}.csv`.
#[derive(Debug, Clone)]
pub struct CsvFileExporter {
    dir: PathBuf,
}

impl CsvFileExporter {
    /// Creates an exporter writing into `dir`. The directory is created on
    /// first export.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[async_trait]
impl DocumentExporter for CsvFileExporter {
    async fn export(
        &self,
        unique_id: &str,
        doc_type: DocType,
        records: &[LogRecord],
    ) -> Result<ExportReceipt, ExportError> {
        if doc_type != DocType::Csv {
            return Err(ExportError::Unsupported(doc_type));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{unique_id}.csv"));
        tokio::fs::write(&path, render_csv(records)?).await?;

        tracing::info!(
            index = %unique_id,
            path = %path.display(),
            records = records.len(),
            "Exported CSV document"
        );

        Ok(ExportReceipt {
            location: path.display().to_string(),
            records: records.len(),
        })
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    timestamp: String,
    level: &'a str,
    message: &'a str,
    calling_file: Option<&'a str>,
    calling_method: Option<&'a str>,
}

impl<'a> From<&'a LogRecord> for CsvRow<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            timestamp: record.timestamp.to_rfc3339(),
            level: &record.level,
            message: &record.message,
            calling_file: record.calling_file.as_deref(),
            calling_method: record.calling_method.as_deref(),
        }
    }
}

/// Renders records as CSV with a header row and CRLF line endings.
///
/// # Errors
///
/// Returns an error if a record cannot be encoded.
pub fn render_csv(records: &[LogRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER.split(','))?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
