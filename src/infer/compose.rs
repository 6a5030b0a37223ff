//! Suffix-block style normalization and new-document composition.

use crate::model::{Alignment, ContentTemplate, DocumentNode, StyleAttrs, StyleRules};
use crate::text::is_suffix_marker;

/// Force a trailing-block node into body typography: font, size, line
/// spacing, and indent come from the body style; alignment goes left and
/// bold is cleared. This guarantees attendee/signer lists render in body
/// typography regardless of how the source sample styled them.
///
/// With `force` false the node is only touched when its text starts with a
/// suffix role marker.
pub(crate) fn normalize_suffix_node(node: &mut DocumentNode, body: &StyleAttrs, force: bool) {
    if !matches!(
        node,
        DocumentNode::Paragraph { .. } | DocumentNode::Heading { .. }
    ) {
        return;
    }
    if !force && !is_suffix_marker(node.plain_text().trim()) {
        return;
    }

    let Some(attrs) = node.style_attrs_mut() else {
        return;
    };

    if let Some(font) = body.font_family.as_deref() {
        if !font.trim().is_empty() {
            attrs.font_family = Some(font.trim().to_string());
        }
    }
    if let Some(size) = body.font_size_pt {
        attrs.font_size_pt = Some(size);
    }
    if let Some(spacing) = body.line_spacing_pt {
        attrs.line_spacing_pt = Some(spacing);
    }

    if let Some(indent) = body.first_line_indent_pt {
        attrs.set_first_line_indent_pt(indent);
    } else if let Some(chars) = body.first_line_indent_chars {
        attrs.set_first_line_indent_chars(chars);
    } else if attrs.first_line_indent_pt.is_none() && attrs.first_line_indent_chars.is_none() {
        attrs.set_first_line_indent_chars(2.0);
    }

    attrs.text_align = Some(Alignment::Left);
    attrs.bold = Some(false);
}

/// Re-style the trailing block of a content template with the final body
/// style: every marker-started line, and everything after one, is forced to
/// body typography. Run by the aggregator once the body mode is known.
pub(crate) fn normalize_trailing_block(nodes: &mut [DocumentNode], body: &StyleAttrs) {
    let mut in_suffix_block = false;
    for node in nodes.iter_mut() {
        let text = node.plain_text().trim().to_string();
        if is_suffix_marker(&text) {
            in_suffix_block = true;
        }
        if in_suffix_block && !text.is_empty() {
            normalize_suffix_node(node, body, true);
        }
    }
}

/// Build the body of a new document from a topic's rule set: the content
/// template's leading block, a placeholder body paragraph, then the
/// trailing block with suffix typography normalized.
///
/// Without a content template the new document starts empty.
pub fn compose_document(rules: &StyleRules) -> DocumentNode {
    let Some(template) = rules.content_template.as_ref() else {
        return DocumentNode::doc(Vec::new());
    };
    if template.leading_nodes.is_empty() && template.trailing_nodes.is_empty() {
        return DocumentNode::doc(Vec::new());
    }

    let mut content: Vec<DocumentNode> = template.leading_nodes.clone();

    let placeholder_text = if template.body_placeholder.is_empty() {
        ContentTemplate::default_placeholder()
    } else {
        template.body_placeholder.clone()
    };
    let mut placeholder_attrs = StyleAttrs::default();
    placeholder_attrs.set_first_line_indent_chars(2.0);
    content.push(DocumentNode::paragraph_with_attrs(
        placeholder_attrs,
        placeholder_text,
    ));

    let mut trailing = template.trailing_nodes.clone();
    normalize_trailing_block(&mut trailing, &rules.body);
    content.extend(trailing);

    DocumentNode::doc(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentTemplate;

    fn body_style() -> StyleAttrs {
        StyleAttrs {
            font_family: Some("仿宋_GB2312".to_string()),
            font_size_pt: Some(16.0),
            line_spacing_pt: Some(28.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_marker_node_is_normalized() {
        let mut node = DocumentNode::paragraph_with_attrs(
            StyleAttrs {
                bold: Some(true),
                text_align: Some(Alignment::Center),
                font_family: Some("黑体".to_string()),
                ..Default::default()
            },
            "参加人员：李四、王五",
        );
        normalize_suffix_node(&mut node, &body_style(), false);

        let attrs = node.style_attrs().unwrap();
        assert_eq!(attrs.font_family.as_deref(), Some("仿宋_GB2312"));
        assert_eq!(attrs.bold, Some(false));
        assert_eq!(attrs.text_align, Some(Alignment::Left));
        assert_eq!(attrs.first_line_indent_chars, Some(2.0));
    }

    #[test]
    fn test_plain_node_untouched_without_force() {
        let mut node = DocumentNode::paragraph("正文内容照旧。");
        normalize_suffix_node(&mut node, &body_style(), false);
        assert!(node.style_attrs().unwrap().is_empty());
    }

    #[test]
    fn test_block_forces_following_lines() {
        let mut nodes = vec![
            DocumentNode::paragraph("二〇二六年三月"),
            DocumentNode::paragraph("主持：张三"),
            DocumentNode::paragraph_with_attrs(
                StyleAttrs {
                    bold: Some(true),
                    ..Default::default()
                },
                "王五、赵六",
            ),
        ];
        normalize_trailing_block(&mut nodes, &body_style());

        // Before the first marker: untouched.
        assert!(nodes[0].style_attrs().unwrap().is_empty());
        // The continuation line after the marker is forced too.
        assert_eq!(nodes[2].style_attrs().unwrap().bold, Some(false));
    }

    #[test]
    fn test_compose_splices_placeholder() {
        let mut rules = StyleRules::default();
        rules.body = body_style();
        rules.content_template = Some(ContentTemplate {
            leading_nodes: vec![DocumentNode::paragraph("XX市人民政府办公室文件")],
            trailing_nodes: vec![DocumentNode::paragraph("抄送：市直各单位")],
            body_placeholder: String::new(),
        });

        let doc = compose_document(&rules);
        let children = doc.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[1].plain_text(), "（请在此输入正文）");
        assert_eq!(
            children[2].style_attrs().unwrap().text_align,
            Some(Alignment::Left)
        );
    }

    #[test]
    fn test_compose_without_template_is_empty() {
        let doc = compose_document(&StyleRules::default());
        assert!(doc.children().is_empty());
    }
}
