//! Sample format detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Format of an uploaded sample or import target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// An OOXML word-processing package (.docx).
    Docx,
    /// A portable document (.pdf), accepted for style sampling only.
    Pdf,
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleFormat::Docx => write!(f, "DOCX"),
            SampleFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Zip local-file-header magic; a DOCX is a zip package.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the sample format from a file path.
///
/// Reads only the file header; the full package/structure is validated by
/// the importer or extractor that consumes the bytes.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SampleFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the sample format from bytes.
///
/// # Returns
/// * `Ok(SampleFormat)` if the data starts with a zip or PDF header
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SampleFormat> {
    if data.starts_with(ZIP_MAGIC) {
        return Ok(SampleFormat::Docx);
    }
    if data.starts_with(PDF_MAGIC) {
        return Ok(SampleFormat::Pdf);
    }
    Err(Error::UnknownFormat)
}

/// Check if bytes look like a DOCX package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Check if bytes look like a PDF document.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}
