//! Letterhead validation and header rendering against a realistic
//! template: copy number, centered unit name, red rule, and a shared
//! docNo/signatory row.

use std::io::{Cursor, Read};

use hongtou::{
    validate_letterhead, DocumentNode, DocxRenderer, LetterheadTemplate, StructuredFields,
};

fn common_template() -> LetterheadTemplate {
    serde_json::from_str(
        r##"{
        "page": {"paper": "A4", "marginsCm": {"top": 3.7, "bottom": 3.5, "left": 2.7, "right": 2.5}},
        "elements": [
            {"id": "copy-no", "enabled": true, "type": "text", "bind": "copyNo",
             "visibleIfEmpty": false,
             "x": {"anchor": "marginLeft", "offsetCm": 0}, "yCm": 0.8,
             "text": {"align": "left", "font": {"family": "仿宋_GB2312", "sizePt": 12,
                      "bold": false, "color": "#000000", "letterSpacingPt": 0}}},
            {"id": "unit-name", "enabled": true, "type": "text", "bind": "unitName",
             "visibleIfEmpty": false,
             "x": {"anchor": "center", "offsetCm": 0}, "yCm": 1.0,
             "text": {"align": "center", "font": {"family": "方正小标宋简", "sizePt": 22,
                      "bold": false, "color": "#D40000", "letterSpacingPt": 0}}},
            {"id": "red-line", "enabled": true, "type": "line", "bind": "fixedText",
             "visibleIfEmpty": false,
             "x": {"anchor": "marginLeft", "offsetCm": 0}, "yCm": 2.2,
             "line": {"lengthMode": "contentWidth", "thicknessPt": 1.5, "color": "#D40000"}},
            {"id": "doc-no", "enabled": true, "type": "text", "bind": "docNo",
             "visibleIfEmpty": false,
             "x": {"anchor": "marginLeft", "offsetCm": 0}, "yCm": 2.45,
             "text": {"align": "left", "font": {"family": "仿宋_GB2312", "sizePt": 16,
                      "bold": false, "color": "#000000", "letterSpacingPt": 0}}},
            {"id": "signatory", "enabled": true, "type": "text", "bind": "signatory",
             "visibleIfEmpty": false,
             "x": {"anchor": "marginRight", "offsetCm": 0}, "yCm": 2.45,
             "text": {"align": "right", "font": {"family": "仿宋_GB2312", "sizePt": 16,
                      "bold": false, "color": "#000000", "letterSpacingPt": 0}}}
        ]
    }"##,
    )
    .expect("template json")
}

fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).expect("zip");
    let mut file = archive.by_name(name).expect(name);
    let mut out = String::new();
    file.read_to_string(&mut out).expect("read part");
    out
}

#[test]
fn common_template_validates_clean() {
    let outcome = validate_letterhead(&common_template());
    assert!(outcome.passes(), "errors: {:?}", outcome.errors);
    assert!(outcome.warnings.is_empty(), "warnings: {:?}", outcome.warnings);
}

#[test]
fn template_without_unit_name_is_rejected() {
    let mut template = common_template();
    template.elements.retain(|e| e.bind != hongtou::model::Binding::UnitName);
    let outcome = validate_letterhead(&template);
    assert!(!outcome.passes());
    assert!(outcome.errors.iter().any(|e| e.contains("unitName")));
}

#[test]
fn overflowing_element_is_rejected() {
    let mut template = common_template();
    for element in template.elements.iter_mut() {
        if element.id == "unit-name" {
            element.y_cm = 3.4; // 3.4 + ~0.93 > 3.5
        }
    }
    let outcome = validate_letterhead(&template);
    assert!(outcome.errors.iter().any(|e| e.contains("顶部安全区")));
}

#[test]
fn header_renders_rows_with_tab_aligned_number_line() {
    let fields = StructuredFields {
        doc_no: "X政发（2026）5号".to_string(),
        signatory: "签发人：李四".to_string(),
        copy_no: "000001".to_string(),
        ..Default::default()
    };
    let bytes = DocxRenderer::new(DocumentNode::doc(vec![]), fields)
        .with_unit_name("XX市人民政府")
        .with_letterhead(common_template())
        .render()
        .expect("render");

    let header = read_part(&bytes, "word/header1.xml");

    // Unit name centered in its declared typography.
    assert!(header.contains("XX市人民政府"));
    assert!(header.contains("方正小标宋简"));
    assert!(header.contains("w:jc w:val=\"center\""));
    // The red rule row.
    assert!(header.contains("<w:pBdr><w:bottom w:val=\"single\" w:sz=\"12\""));
    // docNo and signatory share one tab-aligned row, brackets normalized.
    assert!(header.contains("X政发〔2026〕5号"));
    assert!(header.contains("签发人：李四"));
    assert!(header.contains("<w:tab/>"));
    assert!(header.contains("w:val=\"right\" w:pos=\"8959\""));

    // First-page header wiring in the section properties.
    let document = read_part(&bytes, "word/document.xml");
    assert!(document.contains("w:headerReference w:type=\"first\""));
    assert!(document.contains("<w:titlePg/>"));
}

#[test]
fn letterhead_can_be_skipped() {
    let bytes = DocxRenderer::new(DocumentNode::doc(vec![]), StructuredFields::default())
        .with_unit_name("XX市人民政府")
        .with_letterhead(common_template())
        .include_letterhead(false)
        .render()
        .expect("render");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).expect("zip");
    assert!(archive.by_name("word/header1.xml").is_err());
}
