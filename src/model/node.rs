//! Semantic document tree and style-attribute vocabulary.
//!
//! The tree is the intermediate representation shared by the importer, the
//! feature extractor, and the renderer. Nodes are immutable inputs to every
//! operation; transformations build new trees rather than mutating in place.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Heading depth, restricted to the four levels official documents use.
///
/// Serialized as a plain number (`1`..`4`); any other value is rejected at
/// deserialization, so an in-range level is a construction-time invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    /// 一、
    H1,
    /// （一）
    H2,
    /// 1.
    H3,
    /// （1）
    H4,
}

impl HeadingLevel {
    /// All levels, shallow to deep.
    pub fn all() -> [HeadingLevel; 4] {
        [Self::H1, Self::H2, Self::H3, Self::H4]
    }

    /// Numeric depth, 1-based.
    pub fn depth(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
        }
    }

    /// Rule-tree key for this level (`level1`..`level4`).
    pub fn key(self) -> &'static str {
        match self {
            Self::H1 => "level1",
            Self::H2 => "level2",
            Self::H3 => "level3",
            Self::H4 => "level4",
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(Self::H1),
            2 => Ok(Self::H2),
            3 => Ok(Self::H3),
            4 => Ok(Self::H4),
            other => Err(Error::InvalidNode(format!(
                "heading level must be 1..=4, got {other}"
            ))),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level.depth()
    }
}

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Optional style-override bag carried by headings and paragraphs, and used
/// as the per-role style in inferred rule sets.
///
/// Numeric fields deserialize leniently: a string like `"28"` parses, and
/// anything unparsable becomes `None` so rendering falls back to the role
/// default instead of failing the whole export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub font_size_pt: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Six hex digits with `#` prefix, normalized upper-case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<Alignment>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub line_spacing_pt: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub space_before_pt: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub space_after_pt: Option<f64>,

    /// Mutually exclusive with `first_line_indent_chars`.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub first_line_indent_pt: Option<f64>,

    /// Mutually exclusive with `first_line_indent_pt`.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub first_line_indent_chars: Option<f64>,

    /// Marks a paragraph rendered as a red horizontal rule; such a
    /// paragraph carries no text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divider_red: Option<bool>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl StyleAttrs {
    /// Check whether no override is set.
    pub fn is_empty(&self) -> bool {
        *self == StyleAttrs::default()
    }

    /// Set the first-line indent in points, clearing the char-based indent.
    pub fn set_first_line_indent_pt(&mut self, pt: f64) {
        self.first_line_indent_pt = Some(pt);
        self.first_line_indent_chars = None;
    }

    /// Set the first-line indent in chars, clearing the point-based indent.
    pub fn set_first_line_indent_chars(&mut self, chars: f64) {
        self.first_line_indent_chars = Some(chars);
        self.first_line_indent_pt = None;
    }

    /// Layer `over` on top of `self`, producing a new bag. Fields set in
    /// `over` win; an indent in `over` clears both base indents so the
    /// pt/chars exclusivity survives layering.
    pub fn layered(&self, over: &StyleAttrs) -> StyleAttrs {
        let mut out = self.clone();
        if over.font_family.is_some() {
            out.font_family = over.font_family.clone();
        }
        if over.font_size_pt.is_some() {
            out.font_size_pt = over.font_size_pt;
        }
        if over.bold.is_some() {
            out.bold = over.bold;
        }
        if over.color_hex.is_some() {
            out.color_hex = over.color_hex.clone();
        }
        if over.text_align.is_some() {
            out.text_align = over.text_align;
        }
        if over.line_spacing_pt.is_some() {
            out.line_spacing_pt = over.line_spacing_pt;
        }
        if over.space_before_pt.is_some() {
            out.space_before_pt = over.space_before_pt;
        }
        if over.space_after_pt.is_some() {
            out.space_after_pt = over.space_after_pt;
        }
        if over.first_line_indent_pt.is_some() || over.first_line_indent_chars.is_some() {
            out.first_line_indent_pt = over.first_line_indent_pt;
            out.first_line_indent_chars = over.first_line_indent_chars;
        }
        if over.divider_red.is_some() {
            out.divider_red = over.divider_red;
        }
        out
    }
}

/// Heading attributes: the level plus any style overrides, flattened into
/// one JSON object (`{"level": 1, "fontFamily": …}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: HeadingLevel,
    #[serde(flatten)]
    pub style: StyleAttrs,
}

impl HeadingAttrs {
    pub fn new(level: HeadingLevel) -> Self {
        Self {
            level,
            style: StyleAttrs::default(),
        }
    }
}

/// A node in the semantic document tree.
///
/// Only `Heading` and `Paragraph` carry style attributes; table structure
/// nodes and text runs are plain containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentNode {
    /// Root node; its children form the document body.
    Doc {
        #[serde(default)]
        content: Vec<DocumentNode>,
    },
    Heading {
        attrs: HeadingAttrs,
        #[serde(default)]
        content: Vec<DocumentNode>,
    },
    Paragraph {
        #[serde(default, skip_serializing_if = "StyleAttrs::is_empty")]
        attrs: StyleAttrs,
        #[serde(default)]
        content: Vec<DocumentNode>,
    },
    Table {
        #[serde(default)]
        content: Vec<DocumentNode>,
    },
    TableRow {
        #[serde(default)]
        content: Vec<DocumentNode>,
    },
    TableCell {
        #[serde(default)]
        content: Vec<DocumentNode>,
    },
    Text {
        #[serde(default)]
        text: String,
    },
}

impl DocumentNode {
    /// Root document node.
    pub fn doc(content: Vec<DocumentNode>) -> Self {
        Self::Doc { content }
    }

    /// Heading with one text run.
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::Heading {
            attrs: HeadingAttrs::new(level),
            content: vec![Self::text(text)],
        }
    }

    /// Plain paragraph with one text run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            attrs: StyleAttrs::default(),
            content: vec![Self::text(text)],
        }
    }

    /// Paragraph with explicit style attributes.
    pub fn paragraph_with_attrs(attrs: StyleAttrs, text: impl Into<String>) -> Self {
        Self::Paragraph {
            attrs,
            content: vec![Self::text(text)],
        }
    }

    /// Red horizontal-rule paragraph.
    pub fn divider() -> Self {
        Self::Paragraph {
            attrs: StyleAttrs {
                divider_red: Some(true),
                ..Default::default()
            },
            content: Vec::new(),
        }
    }

    /// Text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Concatenated text of all descendant runs.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Doc { content }
            | Self::Heading { content, .. }
            | Self::Paragraph { content, .. }
            | Self::Table { content }
            | Self::TableRow { content }
            | Self::TableCell { content } => {
                content.iter().map(|n| n.plain_text()).collect()
            }
        }
    }

    /// Children of a container node; empty for text runs.
    pub fn children(&self) -> &[DocumentNode] {
        match self {
            Self::Text { .. } => &[],
            Self::Doc { content }
            | Self::Heading { content, .. }
            | Self::Paragraph { content, .. }
            | Self::Table { content }
            | Self::TableRow { content }
            | Self::TableCell { content } => content,
        }
    }

    /// Style attributes for heading/paragraph nodes.
    pub fn style_attrs(&self) -> Option<&StyleAttrs> {
        match self {
            Self::Heading { attrs, .. } => Some(&attrs.style),
            Self::Paragraph { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Mutable style attributes for heading/paragraph nodes.
    pub fn style_attrs_mut(&mut self) -> Option<&mut StyleAttrs> {
        match self {
            Self::Heading { attrs, .. } => Some(&mut attrs.style),
            Self::Paragraph { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Whether this node is a red-divider paragraph.
    pub fn is_divider(&self) -> bool {
        matches!(
            self.style_attrs(),
            Some(StyleAttrs {
                divider_red: Some(true),
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_bounds() {
        assert!(HeadingLevel::try_from(1).is_ok());
        assert!(HeadingLevel::try_from(4).is_ok());
        assert!(HeadingLevel::try_from(0).is_err());
        assert!(HeadingLevel::try_from(5).is_err());
    }

    #[test]
    fn test_heading_level_rejected_in_json() {
        let bad = r#"{"type":"heading","attrs":{"level":7},"content":[]}"#;
        assert!(serde_json::from_str::<DocumentNode>(bad).is_err());
    }

    #[test]
    fn test_node_json_vocabulary() {
        let node = DocumentNode::paragraph_with_attrs(
            StyleAttrs {
                first_line_indent_chars: Some(2.0),
                ..Default::default()
            },
            "正文",
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert_eq!(json["attrs"]["firstLineIndentChars"], 2.0);
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "正文");
    }

    #[test]
    fn test_heading_attrs_flatten() {
        let node = DocumentNode::heading(HeadingLevel::H2, "（一）背景");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["attrs"]["level"], 2);
        assert_eq!(node.plain_text(), "（一）背景");
    }

    #[test]
    fn test_indent_exclusivity() {
        let mut attrs = StyleAttrs::default();
        attrs.set_first_line_indent_chars(2.0);
        attrs.set_first_line_indent_pt(32.0);
        assert_eq!(attrs.first_line_indent_chars, None);
        assert_eq!(attrs.first_line_indent_pt, Some(32.0));
    }

    #[test]
    fn test_layering_overrides_indent_kind() {
        let mut base = StyleAttrs::default();
        base.set_first_line_indent_pt(32.0);
        let mut over = StyleAttrs::default();
        over.set_first_line_indent_chars(2.0);

        let merged = base.layered(&over);
        assert_eq!(merged.first_line_indent_pt, None);
        assert_eq!(merged.first_line_indent_chars, Some(2.0));
    }

    #[test]
    fn test_lenient_numbers() {
        let attrs: StyleAttrs =
            serde_json::from_str(r#"{"fontSizePt":"16","lineSpacingPt":"oops"}"#).unwrap();
        assert_eq!(attrs.font_size_pt, Some(16.0));
        assert_eq!(attrs.line_spacing_pt, None);
    }

    #[test]
    fn test_divider() {
        let node = DocumentNode::divider();
        assert!(node.is_divider());
        assert!(node.plain_text().is_empty());
    }
}
