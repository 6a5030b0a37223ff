//! Structured fields attached to a document alongside its body tree.

use serde::{Deserialize, Serialize};

use super::rules::StyleRules;

/// One attachment entry in a document's structured fields. Only the name is
/// known to the engine; rendering emits a manifest plus a placeholder
/// section per attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub index: u32,
    pub name: String,
}

/// Structured (non-body) fields of a document: letterhead bindings, sign-off
/// block, attachments, and the topic rule set applied at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredFields {
    pub title: String,
    /// Main addressee line (主送机关).
    pub main_to: String,
    /// Sign-off unit or signer name, rendered right-aligned before the date.
    pub sign_off: String,
    /// Document number; brackets are normalized wherever this flows.
    pub doc_no: String,
    pub signatory: String,
    pub copy_no: String,
    /// ISO date (`YYYY-MM-DD`); formatted as 年/月/日 on export.
    pub date: String,
    pub export_with_redhead: bool,
    pub attachments: Vec<Attachment>,
    /// Rule set of the topic this document was created from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_template_rules: Option<StyleRules>,
}

impl Default for StructuredFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            main_to: String::new(),
            sign_off: String::new(),
            doc_no: String::new(),
            signatory: String::new(),
            copy_no: String::new(),
            date: String::new(),
            export_with_redhead: true,
            attachments: Vec::new(),
            topic_template_rules: None,
        }
    }
}

/// Result of the external text-to-patch agent, consumed during rule
/// revision. The engine never calls the agent itself; it only merges the
/// patch with the deterministic instruction heuristic and any explicit
/// caller patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentRevision {
    pub patch: serde_json::Value,
    pub assistant_reply: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fields = StructuredFields::default();
        assert!(fields.export_with_redhead);
        assert!(fields.attachments.is_empty());

        let parsed: StructuredFields = serde_json::from_str(r#"{"docNo":"X文〔2026〕3号"}"#).unwrap();
        assert_eq!(parsed.doc_no, "X文〔2026〕3号");
        assert!(parsed.export_with_redhead);
    }
}
