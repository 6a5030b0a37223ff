//! Error types for the hongtou engine.

use std::io;
use thiserror::Error;

/// Result type alias for hongtou operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while importing, analyzing, or rendering
/// official documents.
///
/// Only conditions that make an entire operation meaningless surface here
/// (unreadable input, an empty sample set). Degraded data — a numbering gap,
/// one unparsable table, a low-confidence field — is reported inline in the
/// operation's result and never aborts it.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes are neither a DOCX package nor a PDF.
    #[error("Unknown sample format: not a DOCX or PDF file")]
    UnknownFormat,

    /// The DOCX package is unreadable (bad zip, missing parts).
    #[error("Invalid DOCX package: {0}")]
    InvalidDocx(String),

    /// Error parsing OOXML markup.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Error reading PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted; decryption is not supported.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF carries no extractable text (likely a scan). The caller
    /// should run OCR or supply a DOCX sample instead.
    #[error("PDF contains no extractable text (scanned document?)")]
    TextlessPdf,

    /// Rule aggregation was invoked with no samples.
    #[error("Cannot infer rules from an empty sample set")]
    EmptySampleSet,

    /// A document node violates a model invariant.
    #[error("Invalid document node: {0}")]
    InvalidNode(String),

    /// Error assembling DOCX output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::InvalidDocx(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TextlessPdf;
        assert_eq!(
            err.to_string(),
            "PDF contains no extractable text (scanned document?)"
        );

        let err = Error::EmptySampleSet;
        assert_eq!(err.to_string(), "Cannot infer rules from an empty sample set");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
