//! Document model types shared by every engine component.
//!
//! This module defines the semantic tree produced by the importer and
//! consumed by the renderer, the style-rule vocabulary produced by
//! inference, and the letterhead template checked by the geometry
//! validator.

mod fields;
mod letterhead;
mod node;
mod rules;

pub use fields::{AgentRevision, Attachment, StructuredFields};
pub use letterhead::{
    AnchorSide, Binding, Element, ElementKind, FontSpec, LengthMode, LetterheadTemplate, LineSpec,
    PageSpec, TextSpec, XPlacement,
};
pub use node::{Alignment, DocumentNode, HeadingAttrs, HeadingLevel, StyleAttrs};
pub use rules::{
    ConfidenceReport, ContentTemplate, FieldConfidence, HeadingRules, MarginsCm, PageRules,
    StyleRules,
};
