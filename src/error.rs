use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the different failure cases that can occur while the
/// tool ingests reports, consolidates them, or pushes them to the shared
/// spreadsheet.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a named worksheet is absent from a workbook. Carries the
    /// names that are present so the operator can spot the mismatch.
    #[error("missing sheet '{name}' (available: {available:?})")]
    MissingSheet { name: String, available: Vec<String> },

    /// Raised when a required path does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Wrapper for HTTP transport failures.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when signing the service-account assertion fails.
    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Raised when the OAuth token endpoint rejects the assertion.
    #[error("token exchange rejected: {0}")]
    Token(String),

    /// Raised when the Sheets API rejects a read or append call.
    #[error("Sheets API error ({status}): {message}")]
    Sheets { status: u16, message: String },
}

/// Reasons a discovered report file can be skipped without failing the run.
///
/// Skips are non-fatal by design: the file contributes no rows and leaves the
/// watermark untouched, and processing continues with the remaining files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The file name does not split into `<account> <platform-tag> ...`.
    #[error("file name does not follow the '<account> <platform-tag> ...' convention")]
    BadFileName,

    /// The second file-name token is not a recognised platform tag.
    #[error("unknown platform tag '{0}'")]
    UnknownPlatform(String),

    /// The report lacks columns the normalizer requires.
    #[error("missing required columns {missing:?} (available: {available:?})")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
}
