//! DOCX import: native document bytes → semantic tree plus report.

pub(crate) mod classify;
pub(crate) mod docx;
mod numbering;

pub use classify::{detect_heading_level, looks_like_title_candidate, marker_level};
pub use numbering::audit_numbering;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DocumentNode, HeadingLevel, StructuredFields, StyleAttrs};
use crate::text::normalize_doc_no_brackets;

/// How many leading nodes are scanned for a document-number field.
const DOC_NO_SCAN_NODES: usize = 8;

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("digit run regex"));

/// Degraded-data findings of one import. Nothing here aborts the import;
/// the UI shows warnings and lets the user proceed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportReport {
    /// Paragraphs that look like titles but matched no heading rule.
    pub unrecognized_title_count: usize,
    pub numbering_warnings: Vec<String>,
    pub table_warnings: Vec<String>,
    pub notes: Vec<String>,
}

/// Result of importing one DOCX document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub document: DocumentNode,
    pub fields: StructuredFields,
    pub report: ImportReport,
}

/// Import a DOCX document into the semantic tree.
///
/// Paragraphs are visited in document order; blank ones are skipped.
/// Heading levels come from the numbering markers first, then from the
/// dominant run font. Tables land after the paragraphs; one that cannot be
/// read as a rectangular grid is skipped with a warning. The only fatal
/// condition is an unreadable package.
pub fn import_docx(data: &[u8]) -> Result<ImportResult> {
    let raw = docx::read_docx(data)?;

    let mut nodes: Vec<DocumentNode> = Vec::new();
    let mut headings: Vec<(HeadingLevel, String)> = Vec::new();
    let mut unrecognized_title_count = 0usize;
    let mut table_warnings: Vec<String> = Vec::new();

    for paragraph in &raw.paragraphs {
        let text = paragraph.text().trim().to_string();
        if text.is_empty() {
            continue;
        }

        let dominant_font = paragraph.runs.iter().find_map(|r| r.font_name.as_deref());
        match classify::detect_heading_level(&text, dominant_font) {
            Some(level) => {
                headings.push((level, text.clone()));
                nodes.push(DocumentNode::heading(level, text));
            }
            None => {
                if classify::looks_like_title_candidate(&text) {
                    unrecognized_title_count += 1;
                }
                let mut attrs = StyleAttrs::default();
                attrs.set_first_line_indent_chars(2.0);
                nodes.push(DocumentNode::paragraph_with_attrs(attrs, text));
            }
        }
    }

    for (idx, table) in raw.tables.iter().enumerate() {
        match table_node(table) {
            Ok(node) => nodes.push(node),
            Err(reason) => {
                log::warn!("skipping table {}: {}", idx + 1, reason);
                table_warnings.push(format!("表格 {} 解析失败: {}", idx + 1, reason));
            }
        }
    }

    let mut fields = StructuredFields::default();
    for node in nodes.iter().take(DOC_NO_SCAN_NODES) {
        if !matches!(
            node,
            DocumentNode::Heading { .. } | DocumentNode::Paragraph { .. }
        ) {
            continue;
        }
        let text = node.plain_text();
        if DIGIT_RUN_RE.is_match(&text) && (text.contains('号') || text.contains('文')) {
            fields.doc_no = normalize_doc_no_brackets(&text);
            break;
        }
    }

    let report = ImportReport {
        unrecognized_title_count,
        numbering_warnings: audit_numbering(&headings),
        table_warnings,
        notes: vec![
            "导入时已忽略原 DOCX 页眉/红头（按系统红头模板重建）。".to_string(),
            "已执行轻量套版：正文默认首行缩进2字。".to_string(),
        ],
    };

    Ok(ImportResult {
        document: DocumentNode::doc(nodes),
        fields,
        report,
    })
}

/// Convert one raw table to a tree node, requiring a rectangular grid.
fn table_node(table: &docx::RawTable) -> std::result::Result<DocumentNode, String> {
    if table.rows.is_empty() {
        return Err("表格为空".to_string());
    }
    let width = table.rows[0].len();
    if table.rows.iter().any(|row| row.len() != width) {
        return Err("行列数不一致".to_string());
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cells = row
                .iter()
                .map(|cell| DocumentNode::TableCell {
                    content: cell.lines.iter().map(|line| DocumentNode::text(line.as_str())).collect(),
                })
                .collect();
            DocumentNode::TableRow { content: cells }
        })
        .collect();

    Ok(DocumentNode::Table { content: rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::build_docx_package;

    fn para(text: &str, font: Option<&str>) -> String {
        let rpr = font
            .map(|f| format!("<w:rPr><w:rFonts w:eastAsia=\"{f}\"/></w:rPr>"))
            .unwrap_or_default();
        format!("<w:p><w:r>{rpr}<w:t>{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn test_import_structure_and_numbering() {
        let body = [
            para("X委发〔2026〕7号", None),
            para("一、总体要求", None),
            para("各单位要认真组织实施，确保任务落地见效。", None),
            para("二、工作安排", None),
            para("四、保障措施", None),
        ]
        .concat();
        let result = import_docx(&build_docx_package(&body, "")).unwrap();

        let children = result.document.children();
        assert_eq!(children.len(), 5);
        assert!(matches!(children[1], DocumentNode::Heading { .. }));
        assert!(matches!(children[2], DocumentNode::Paragraph { .. }));

        assert_eq!(result.fields.doc_no, "X委发〔2026〕7号");
        assert_eq!(result.report.numbering_warnings.len(), 1);
        assert!(result.report.numbering_warnings[0].contains("第3个标题"));
    }

    #[test]
    fn test_font_classified_heading() {
        let body = para("总体要求部署", Some("黑体"));
        let result = import_docx(&build_docx_package(&body, "")).unwrap();
        match &result.document.children()[0] {
            DocumentNode::Heading { attrs, .. } => assert_eq!(attrs.level, HeadingLevel::H1),
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_imported_paragraph_gets_indent() {
        let body = para("这是一段普通正文内容，没有任何标题特征。", None);
        let result = import_docx(&build_docx_package(&body, "")).unwrap();
        let attrs = result.document.children()[0].style_attrs().unwrap();
        assert_eq!(attrs.first_line_indent_chars, Some(2.0));
    }

    #[test]
    fn test_ragged_table_degrades_to_warning() {
        let body = r#"
            <w:tbl>
              <w:tr><w:tc><w:p><w:r><w:t>甲</w:t></w:r></w:p></w:tc>
                    <w:tc><w:p><w:r><w:t>乙</w:t></w:r></w:p></w:tc></w:tr>
              <w:tr><w:tc><w:p><w:r><w:t>丙</w:t></w:r></w:p></w:tc></w:tr>
            </w:tbl>"#;
        let result = import_docx(&build_docx_package(body, "")).unwrap();
        assert!(result.document.children().is_empty());
        assert_eq!(result.report.table_warnings.len(), 1);
        assert!(result.report.table_warnings[0].contains("表格 1"));
    }

    #[test]
    fn test_doc_no_bracket_normalization_on_import() {
        let body = para("X委发(2026)12号", None);
        let result = import_docx(&build_docx_package(&body, "")).unwrap();
        assert_eq!(result.fields.doc_no, "X委发〔2026〕12号");
    }

    #[test]
    fn test_unreadable_package_is_fatal() {
        assert!(import_docx(b"not a docx at all").is_err());
    }
}
