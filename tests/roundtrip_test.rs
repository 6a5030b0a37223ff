//! End-to-end tests: render a document, then read the produced package
//! back through the importer and feature extractor.

use hongtou::{
    extract_docx_features, import_docx, DocumentNode, DocxRenderer, HeadingLevel,
    StructuredFields,
};

fn render(doc: DocumentNode) -> Vec<u8> {
    DocxRenderer::new(doc, StructuredFields::default())
        .render()
        .expect("render")
}

#[test]
fn minimal_document_round_trips_in_order() {
    let doc = DocumentNode::doc(vec![
        DocumentNode::heading(HeadingLevel::H1, "一、总体要求"),
        DocumentNode::paragraph("各单位要认真组织实施，确保各项任务落地见效。"),
        DocumentNode::Table {
            content: vec![DocumentNode::TableRow {
                content: vec![DocumentNode::TableCell {
                    content: vec![DocumentNode::text("单元格甲")],
                }],
            }],
        },
    ]);

    let imported = import_docx(&render(doc)).expect("import");
    let children = imported.document.children();
    assert_eq!(children.len(), 3);

    match &children[0] {
        DocumentNode::Heading { attrs, .. } => assert_eq!(attrs.level, HeadingLevel::H1),
        other => panic!("expected heading first, got {other:?}"),
    }
    assert_eq!(children[0].plain_text(), "一、总体要求");
    assert!(matches!(children[1], DocumentNode::Paragraph { .. }));
    assert_eq!(
        children[1].plain_text(),
        "各单位要认真组织实施，确保各项任务落地见效。"
    );
    match &children[2] {
        DocumentNode::Table { content } => {
            assert_eq!(content.len(), 1);
            assert_eq!(content[0].children()[0].plain_text(), "单元格甲");
        }
        other => panic!("expected table last, got {other:?}"),
    }

    assert!(imported.report.numbering_warnings.is_empty());
    assert!(imported.report.table_warnings.is_empty());
}

#[test]
fn skipped_heading_number_is_reported_once() {
    let doc = DocumentNode::doc(vec![
        DocumentNode::heading(HeadingLevel::H1, "一、部署安排"),
        DocumentNode::heading(HeadingLevel::H1, "二、责任分工"),
        DocumentNode::heading(HeadingLevel::H1, "四、保障措施"),
    ]);

    let imported = import_docx(&render(doc)).expect("import");
    assert_eq!(imported.report.numbering_warnings.len(), 1);
    let warning = &imported.report.numbering_warnings[0];
    assert!(warning.contains("第3个标题"), "got: {warning}");
    assert!(warning.contains("当前 4"));
    assert!(warning.contains("期望 3"));
}

#[test]
fn suffix_line_text_survives_the_round_trip() {
    let doc = DocumentNode::doc(vec![DocumentNode::paragraph("主 持：金刚善")]);
    let imported = import_docx(&render(doc)).expect("import");
    assert_eq!(imported.document.children()[0].plain_text(), "主 持：金刚善");
}

#[test]
fn rendered_output_is_valid_style_evidence() {
    let doc = DocumentNode::doc(vec![
        DocumentNode::heading(HeadingLevel::H1, "一、工作要求"),
        DocumentNode::paragraph("要统筹安排部署，压实工作责任，确保按期完成各项任务。"),
        DocumentNode::paragraph("要加强督导检查，及时发现和解决存在的问题，形成闭环。"),
    ]);

    let features = extract_docx_features(&render(doc)).expect("extract");
    assert_eq!(features.body.font_family.as_deref(), Some("仿宋_GB2312"));
    assert_eq!(features.body.font_size_pt, Some(16.0));
    assert_eq!(features.body.line_spacing_pt, Some(28.0));

    let h1 = features.headings.level1.as_ref().expect("h1 evidence");
    assert_eq!(h1.font_family.as_deref(), Some("黑体"));

    let margins = features.page.expect("margins").margins_cm;
    assert!((margins.top - 3.7).abs() < 0.01);
    assert!((margins.bottom - 3.5).abs() < 0.01);
    assert!((margins.left - 2.7).abs() < 0.01);
    assert!((margins.right - 2.5).abs() < 0.01);
}

#[test]
fn imported_doc_no_is_normalized() {
    let doc = DocumentNode::doc(vec![DocumentNode::paragraph("X委发(2026)12号")]);
    let imported = import_docx(&render(doc)).expect("import");
    assert_eq!(imported.fields.doc_no, "X委发〔2026〕12号");
}
