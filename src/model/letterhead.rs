//! Letterhead ("red-head") templates: positioned header elements printed on
//! page one of an official document.

use serde::{Deserialize, Serialize};

use super::node::Alignment;
use super::rules::MarginsCm;

/// Page setup for a letterhead template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub paper: String,
    pub margins_cm: MarginsCm,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            paper: "A4".to_string(),
            margins_cm: MarginsCm {
                top: 3.7,
                bottom: 3.5,
                left: 2.7,
                right: 2.5,
            },
        }
    }
}

/// Kind of a positioned element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Line,
}

/// Data binding of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Binding {
    UnitName,
    DocNo,
    Signatory,
    CopyNo,
    FixedText,
}

/// Horizontal anchor of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorSide {
    MarginLeft,
    Center,
    MarginRight,
}

/// Horizontal placement: anchor side plus offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XPlacement {
    pub anchor: AnchorSide,
    #[serde(default)]
    pub offset_cm: f64,
}

/// Font of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub size_pt: f64,
    #[serde(default)]
    pub bold: bool,
    pub color: String,
    #[serde(default)]
    pub letter_spacing_pt: f64,
}

/// Text payload of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpec {
    pub align: Alignment,
    pub font: FontSpec,
}

/// Length policy of a line element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthMode {
    /// Span the printable width between the margins.
    ContentWidth,
    /// Use the explicit `length_cm`.
    Fixed,
}

/// Line payload of a line element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSpec {
    pub length_mode: LengthMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_cm: Option<f64>,
    pub thickness_pt: f64,
    pub color: String,
}

/// One positioned letterhead element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub bind: Binding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_text: Option<String>,
    #[serde(default)]
    pub visible_if_empty: bool,
    pub x: XPlacement,
    pub y_cm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineSpec>,
}

fn default_enabled() -> bool {
    true
}

impl Element {
    /// Estimated vertical footprint in centimeters: a line's ink height, or
    /// a text element's em-box at 1.2 line height.
    pub fn estimated_height_cm(&self) -> f64 {
        match self.kind {
            ElementKind::Text => {
                let size_pt = self.text.as_ref().map(|t| t.font.size_pt).unwrap_or(16.0);
                (size_pt / 72.0) * 2.54 * 1.2
            }
            ElementKind::Line => {
                let thickness = self.line.as_ref().map(|l| l.thickness_pt).unwrap_or(1.5);
                (thickness / 72.0) * 2.54
            }
        }
    }
}

/// A letterhead template: page setup plus positioned elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterheadTemplate {
    #[serde(default)]
    pub page: PageSpec,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl LetterheadTemplate {
    /// Enabled elements only.
    pub fn enabled_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_json_vocabulary() {
        let json = r##"{
            "id": "unit-name",
            "enabled": true,
            "type": "text",
            "bind": "unitName",
            "visibleIfEmpty": false,
            "x": {"anchor": "center", "offsetCm": 0},
            "yCm": 1.0,
            "text": {
                "align": "center",
                "font": {"family": "方正小标宋简", "sizePt": 22, "bold": false,
                         "color": "#D40000", "letterSpacingPt": 0}
            }
        }"##;
        let elem: Element = serde_json::from_str(json).unwrap();
        assert_eq!(elem.kind, ElementKind::Text);
        assert_eq!(elem.bind, Binding::UnitName);
        assert_eq!(elem.x.anchor, AnchorSide::Center);
        assert!((elem.estimated_height_cm() - (22.0 / 72.0) * 2.54 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_line_footprint() {
        let json = r##"{
            "id": "red-line",
            "type": "line",
            "bind": "fixedText",
            "x": {"anchor": "marginLeft"},
            "yCm": 2.2,
            "line": {"lengthMode": "contentWidth", "thicknessPt": 1.5, "color": "#D40000"}
        }"##;
        let elem: Element = serde_json::from_str(json).unwrap();
        assert!(elem.enabled);
        assert!((elem.estimated_height_cm() - (1.5 / 72.0) * 2.54).abs() < 1e-9);
    }
}
