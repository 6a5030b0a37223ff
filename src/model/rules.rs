//! Inferred style-rule sets and confidence reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::node::{DocumentNode, HeadingLevel, StyleAttrs};
use crate::error::{Error, Result};

/// Page margins in centimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginsCm {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Page-level rules (margins only; paper size is fixed by house style).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRules {
    pub margins_cm: MarginsCm,
}

/// Per-level heading styles. Levels with no evidence stay unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level1: Option<StyleAttrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level2: Option<StyleAttrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level3: Option<StyleAttrs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level4: Option<StyleAttrs>,
}

impl HeadingRules {
    /// Style for one level, if inferred.
    pub fn level(&self, level: HeadingLevel) -> Option<&StyleAttrs> {
        match level {
            HeadingLevel::H1 => self.level1.as_ref(),
            HeadingLevel::H2 => self.level2.as_ref(),
            HeadingLevel::H3 => self.level3.as_ref(),
            HeadingLevel::H4 => self.level4.as_ref(),
        }
    }

    /// Mutable slot for one level.
    pub fn level_mut(&mut self, level: HeadingLevel) -> &mut Option<StyleAttrs> {
        match level {
            HeadingLevel::H1 => &mut self.level1,
            HeadingLevel::H2 => &mut self.level2,
            HeadingLevel::H3 => &mut self.level3,
            HeadingLevel::H4 => &mut self.level4,
        }
    }
}

/// Fixed prologue/epilogue scaffold learned from samples: the leading block
/// (unit name, signer line, red rule) and trailing block (attendee and
/// distribution lines) spliced around a placeholder body paragraph when a
/// new document is created from the topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTemplate {
    #[serde(default)]
    pub leading_nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub trailing_nodes: Vec<DocumentNode>,
    #[serde(default = "ContentTemplate::default_placeholder")]
    pub body_placeholder: String,
}

impl ContentTemplate {
    pub(crate) fn default_placeholder() -> String {
        "（请在此输入正文）".to_string()
    }
}

/// A complete rule set for one topic: body style, per-level heading styles,
/// page margins, and an optional content template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleRules {
    pub body: StyleAttrs,
    pub headings: HeadingRules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_template: Option<ContentTemplate>,
}

impl StyleRules {
    /// JSON form used by patch merging.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Rebuild a typed rule set from a patched JSON tree. Out-of-vocabulary
    /// keys are dropped; malformed numeric leaves degrade to unset fields.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| Error::Other(format!("invalid rule tree: {e}")))
    }
}

/// Confidence for one inferred field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfidence {
    /// Share of present samples agreeing with the chosen value, in (0, 1].
    pub confidence: f64,
    /// Number of samples where the field was present at all.
    pub samples: usize,
}

/// Map from dotted field path (`body.fontFamily`, `headings.level3.fontSizePt`)
/// to its confidence. Ordered so reports are stable across runs.
pub type ConfidenceReport = BTreeMap<String, FieldConfidence>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_json_shape() {
        let mut rules = StyleRules::default();
        rules.body.font_family = Some("仿宋_GB2312".to_string());
        rules.body.font_size_pt = Some(16.0);
        rules.headings.level1 = Some(StyleAttrs {
            font_family: Some("黑体".to_string()),
            ..Default::default()
        });

        let json = rules.to_value();
        assert_eq!(json["body"]["fontFamily"], "仿宋_GB2312");
        assert_eq!(json["headings"]["level1"]["fontFamily"], "黑体");
        assert!(json.get("page").is_none());
    }

    #[test]
    fn test_round_trip_through_value() {
        let mut rules = StyleRules::default();
        rules.page = Some(PageRules {
            margins_cm: MarginsCm {
                top: 3.7,
                bottom: 3.5,
                left: 2.7,
                right: 2.5,
            },
        });
        let back = StyleRules::from_value(&rules.to_value()).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_content_template_placeholder_default() {
        let tpl: ContentTemplate =
            serde_json::from_str(r#"{"leadingNodes":[],"trailingNodes":[]}"#).unwrap();
        assert_eq!(tpl.body_placeholder, "（请在此输入正文）");
    }
}
