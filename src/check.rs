//! Document checks over the semantic tree: numbering continuity, heading
//! punctuation conventions, and body indentation.

use serde::{Deserialize, Serialize};

use crate::import::classify::marker_prefix;
use crate::model::{DocumentNode, HeadingLevel};
use crate::text::int_to_zh_numeral;

/// Sentence-final punctuation governed by the heading conventions.
const PUNCTUATION_END: [char; 5] = ['。', '！', '？', '；', '：'];

/// Issue category: A for typesetting conventions, B for structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    A,
    B,
}

/// Severity of one finding. Errors should block submission; warnings allow
/// the user to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One finding of [`check_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIssue {
    pub code: String,
    pub kind: IssueKind,
    pub message: String,
    /// Node path of the finding, e.g. `body.content[3]`.
    pub path: String,
    pub severity: Severity,
}

impl CheckIssue {
    fn new(code: &str, kind: IssueKind, message: String, path: String, severity: Severity) -> Self {
        Self {
            code: code.to_string(),
            kind,
            message,
            path,
            severity,
        }
    }
}

/// Render the expected numbering marker for a level and counter value.
fn expected_prefix(level: HeadingLevel, counter: u32) -> String {
    match level {
        HeadingLevel::H1 => format!("{}、", int_to_zh_numeral(counter)),
        HeadingLevel::H2 => format!("（{}）", int_to_zh_numeral(counter)),
        HeadingLevel::H3 => format!("{counter}."),
        HeadingLevel::H4 => format!("（{counter}）"),
    }
}

/// Check a document body for structural and typesetting issues.
///
/// Walks the root's children: heading numbering is audited against per-level
/// counters, heading punctuation follows the house conventions (H1 bare,
/// H3/H4 terminated), and body paragraphs are expected to indent two chars.
pub fn check_document(doc: &DocumentNode) -> Vec<CheckIssue> {
    let mut issues = Vec::new();
    let mut counters = [0u32; 4];

    for (idx, node) in doc.children().iter().enumerate() {
        let path = format!("body.content[{idx}]");

        match node {
            DocumentNode::Heading { attrs, .. } => {
                let level = attrs.level;
                let text = node.plain_text().trim().to_string();
                if text.is_empty() {
                    continue;
                }

                let level_idx = (level.depth() - 1) as usize;
                for deeper in counters.iter_mut().skip(level_idx + 1) {
                    *deeper = 0;
                }
                counters[level_idx] += 1;

                let prefix = marker_prefix(level, &text);
                let expected = expected_prefix(level, counters[level_idx]);
                if let Some(prefix) = prefix {
                    if prefix != expected {
                        issues.push(CheckIssue::new(
                            "B_NUMBERING",
                            IssueKind::B,
                            format!("编号疑似异常，当前 {prefix}，期望 {expected}"),
                            path.clone(),
                            Severity::Warning,
                        ));
                    }
                }

                let tail = match prefix {
                    Some(p) => text[p.len()..].trim(),
                    None => text.as_str(),
                };
                if tail.is_empty() {
                    continue;
                }
                let ends_punctuated = tail
                    .chars()
                    .last()
                    .map(|c| PUNCTUATION_END.contains(&c))
                    .unwrap_or(false);

                if level == HeadingLevel::H1 && ends_punctuated {
                    issues.push(CheckIssue::new(
                        "B_PUNC_H1",
                        IssueKind::B,
                        "H1 句末不应有标点。".to_string(),
                        path,
                        Severity::Error,
                    ));
                } else if matches!(level, HeadingLevel::H3 | HeadingLevel::H4) && !ends_punctuated {
                    issues.push(CheckIssue::new(
                        &format!("B_PUNC_H{}", level.depth()),
                        IssueKind::B,
                        format!("H{} 句末必须有标点。", level.depth()),
                        path,
                        Severity::Error,
                    ));
                }
            }
            DocumentNode::Paragraph { attrs, .. } => {
                if let Some(indent) = attrs.first_line_indent_chars {
                    if indent != 2.0 {
                        issues.push(CheckIssue::new(
                            "A_INDENT",
                            IssueKind::A,
                            "正文首行应缩进2字。".to_string(),
                            path,
                            Severity::Warning,
                        ));
                    }
                }
            }
            DocumentNode::Table { .. } => {}
            other => {
                issues.push(CheckIssue::new(
                    "A_NODE_TYPE",
                    IssueKind::A,
                    format!("不支持的节点类型: {}", node_kind(other)),
                    path,
                    Severity::Warning,
                ));
            }
        }
    }

    issues
}

fn node_kind(node: &DocumentNode) -> &'static str {
    match node {
        DocumentNode::Doc { .. } => "doc",
        DocumentNode::Heading { .. } => "heading",
        DocumentNode::Paragraph { .. } => "paragraph",
        DocumentNode::Table { .. } => "table",
        DocumentNode::TableRow { .. } => "tableRow",
        DocumentNode::TableCell { .. } => "tableCell",
        DocumentNode::Text { .. } => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(level: u8, text: &str) -> DocumentNode {
        DocumentNode::heading(HeadingLevel::try_from(level).unwrap(), text)
    }

    #[test]
    fn test_numbering_gap_warns() {
        let doc = DocumentNode::doc(vec![h(1, "一、总体"), h(1, "三、保障")]);
        let issues = check_document(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "B_NUMBERING");
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.contains("期望 二、"));
    }

    #[test]
    fn test_h1_trailing_punctuation_is_an_error() {
        let doc = DocumentNode::doc(vec![h(1, "一、总体要求。")]);
        let issues = check_document(&doc);
        assert_eq!(issues[0].code, "B_PUNC_H1");
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_h3_requires_trailing_punctuation() {
        let doc = DocumentNode::doc(vec![h(3, "1.落实责任")]);
        let issues = check_document(&doc);
        assert_eq!(issues[0].code, "B_PUNC_H3");

        let doc = DocumentNode::doc(vec![h(3, "1.落实责任。")]);
        assert!(check_document(&doc).is_empty());
    }

    #[test]
    fn test_indent_convention() {
        let mut attrs = crate::model::StyleAttrs::default();
        attrs.set_first_line_indent_chars(4.0);
        let doc = DocumentNode::doc(vec![DocumentNode::paragraph_with_attrs(attrs, "正文")]);
        let issues = check_document(&doc);
        assert_eq!(issues[0].code, "A_INDENT");
    }

    #[test]
    fn test_stray_node_kind_warns() {
        let doc = DocumentNode::doc(vec![DocumentNode::text("悬空文本")]);
        let issues = check_document(&doc);
        assert_eq!(issues[0].code, "A_NODE_TYPE");
    }

    #[test]
    fn test_counters_reset_across_levels() {
        let doc = DocumentNode::doc(vec![
            h(1, "一、部署"),
            h(2, "（一）安排"),
            h(1, "二、落实"),
            h(2, "（一）检查"),
        ]);
        assert!(check_document(&doc).is_empty());
    }
}
