//! # hongtou
//!
//! Formatting engine for Chinese official ("red-head") documents.
//!
//! The engine covers four surfaces:
//!
//! - **Import**: a DOCX document becomes a semantic tree of headings,
//!   paragraphs, and tables, with numbering anomalies reported alongside.
//! - **Learning**: sample files (DOCX or PDF) yield per-role style
//!   features; aggregating many samples produces a rule set with a
//!   confidence score per field, revisable through patches and plain-text
//!   instructions.
//! - **Validation**: letterhead templates are checked against the page
//!   safe zone before publication; documents are checked against numbering
//!   and punctuation conventions.
//! - **Rendering**: a semantic tree plus rule set plus letterhead template
//!   becomes a DOCX file with house-style layout.
//!
//! ## Quick start
//!
//! ```no_run
//! use hongtou::{import_docx, DocxRenderer};
//!
//! fn main() -> hongtou::Result<()> {
//!     let bytes = std::fs::read("incoming.docx")?;
//!     let imported = import_docx(&bytes)?;
//!     for warning in &imported.report.numbering_warnings {
//!         eprintln!("{warning}");
//!     }
//!
//!     let out = DocxRenderer::new(imported.document, imported.fields)
//!         .with_unit_name("XX市人民政府")
//!         .render()?;
//!     std::fs::write("formatted.docx", out)?;
//!     Ok(())
//! }
//! ```
//!
//! Every operation is a pure, synchronous transformation: inputs are read
//! fully into memory, results are returned whole, and nothing is mutated
//! in place — callers may keep any number of rule-set versions around.

pub mod check;
pub mod detect;
pub mod error;
pub mod extract;
pub mod import;
pub mod infer;
pub mod model;
pub mod render;
pub mod text;
pub mod validate;

// Re-export commonly used types
pub use check::{check_document, CheckIssue, IssueKind, Severity};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SampleFormat};
pub use error::{Error, Result};
pub use extract::{extract_docx_features, extract_features, extract_pdf_features, Features};
pub use import::{import_docx, ImportReport, ImportResult};
pub use infer::{
    compose_document, infer_rules, merge_patch, patch_from_instruction, revise_rules,
    revision_patch,
};
pub use model::{
    AgentRevision, Alignment, Attachment, ConfidenceReport, ContentTemplate, DocumentNode,
    Element, FieldConfidence, HeadingLevel, HeadingRules, LetterheadTemplate, MarginsCm,
    PageRules, StructuredFields, StyleAttrs, StyleRules,
};
pub use render::DocxRenderer;
pub use validate::{validate_letterhead, ValidationOutcome};
