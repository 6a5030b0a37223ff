//! Streaming reader for DOCX packages.
//!
//! Pulls `word/document.xml` (and `word/styles.xml` for style-name lookup)
//! out of the zip container and walks the markup with a single-pass event
//! loop, collecting the paragraph/run/table subset the engine cares about.
//! Everything OOXML offers beyond that subset is skipped unharmed.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{Alignment, MarginsCm};

const TWIPS_PER_PT: f64 = 20.0;
const TWIPS_PER_CM: f64 = 567.0;

/// One `<w:r>` with the character properties the engine reads.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawRun {
    pub text: String,
    /// `w:eastAsia` font if present, else `w:ascii`.
    pub font_name: Option<String>,
    pub size_pt: Option<f64>,
    pub bold: Option<bool>,
    /// Raw hex digits from `w:color` (no `#`), `auto` filtered out.
    pub color_hex: Option<String>,
}

/// One `<w:p>` outside any table.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawParagraph {
    pub runs: Vec<RawRun>,
    /// Resolved style name (`Heading 1`, `标题 2`, …) via styles.xml.
    pub style_name: Option<String>,
    pub alignment: Option<Alignment>,
    pub line_spacing_pt: Option<f64>,
    pub space_before_pt: Option<f64>,
    pub space_after_pt: Option<f64>,
    pub first_line_indent_pt: Option<f64>,
    pub first_line_indent_chars: Option<f64>,
}

impl RawParagraph {
    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// First run bearing visible text, the style evidence for the whole
    /// paragraph.
    pub fn first_visible_run(&self) -> Option<&RawRun> {
        self.runs.iter().find(|r| !r.text.trim().is_empty())
    }
}

/// One table cell: the texts of its non-empty paragraphs.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawCell {
    pub lines: Vec<String>,
}

/// One top-level table.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

/// Font defaults of a named style from styles.xml.
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleDef {
    pub name: String,
    pub font_name: Option<String>,
    pub size_pt: Option<f64>,
}

/// Everything read from one DOCX package.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawDocument {
    pub paragraphs: Vec<RawParagraph>,
    pub tables: Vec<RawTable>,
    pub margins_cm: Option<MarginsCm>,
    /// styleId → style definition.
    pub styles: HashMap<String, StyleDef>,
}

impl RawDocument {
    /// Resolved style name for a paragraph (styles.xml name, falling back
    /// to the raw style id).
    pub fn style_name<'a>(&'a self, style_id: &'a str) -> &'a str {
        self.styles
            .get(style_id)
            .map(|s| s.name.as_str())
            .unwrap_or(style_id)
    }

    /// Style-sheet font defaults for a paragraph's style, if any.
    pub fn style_font(&self, style_id: &str) -> (Option<&str>, Option<f64>) {
        match self.styles.get(style_id) {
            Some(def) => (def.font_name.as_deref(), def.size_pt),
            None => (None, None),
        }
    }
}

/// Read a DOCX package from bytes.
pub(crate) fn read_docx(data: &[u8]) -> Result<RawDocument> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::InvalidDocx(format!("not a readable zip package: {e}")))?;

    let document_xml = read_part(&mut archive, "word/document.xml")?
        .ok_or_else(|| Error::InvalidDocx("missing word/document.xml".to_string()))?;

    let mut doc = parse_document_xml(&document_xml)?;

    // styles.xml is optional; without it style ids stand in for names.
    if let Some(styles_xml) = read_part(&mut archive, "word/styles.xml")? {
        doc.styles = parse_styles_xml(&styles_xml)?;
    }

    Ok(doc)
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            Ok(Some(buf))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn attr_local(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn attr_twips_pt(e: &BytesStart, name: &[u8]) -> Option<f64> {
    attr_local(e, name)?.parse::<f64>().ok().map(|v| v / TWIPS_PER_PT)
}

fn parse_alignment(val: &str) -> Option<Alignment> {
    match val {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "distribute" => Some(Alignment::Justify),
        _ => None,
    }
}

fn parse_on_off(val: Option<String>) -> bool {
    match val.as_deref() {
        Some("0") | Some("false") | Some("none") => false,
        _ => true,
    }
}

fn text_content(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    match quick_xml::escape::unescape(&text) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => text.into_owned(),
    }
}

fn parse_document_xml(xml: &[u8]) -> Result<RawDocument> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::with_capacity(1024);

    let mut doc = RawDocument::default();

    let mut para: Option<RawParagraph> = None;
    let mut run: Option<RawRun> = None;
    let mut in_ppr = false;
    let mut in_run_rpr = false;
    let mut in_text = false;

    let mut tbl_depth: usize = 0;
    let mut table: Option<RawTable> = None;
    let mut row: Option<Vec<RawCell>> = None;
    let mut cell: Option<RawCell> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => para = Some(RawParagraph::default()),
                b"pPr" => in_ppr = true,
                b"r" => {
                    if para.is_some() {
                        run = Some(RawRun::default());
                    }
                }
                b"rPr" => {
                    // A w:rPr inside w:pPr styles the paragraph mark, not a
                    // run; only run-level properties are collected.
                    if run.is_some() && !in_ppr {
                        in_run_rpr = true;
                    }
                }
                b"t" => in_text = run.is_some(),
                b"tbl" => {
                    tbl_depth += 1;
                    if tbl_depth == 1 {
                        table = Some(RawTable::default());
                    }
                }
                b"tr" if tbl_depth == 1 => row = Some(Vec::new()),
                b"tc" if tbl_depth == 1 => cell = Some(RawCell::default()),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                let p = para.as_mut();
                match e.local_name().as_ref() {
                    b"p" => {
                        // An empty <w:p/> is a blank paragraph.
                        if tbl_depth == 0 {
                            doc.paragraphs.push(RawParagraph::default());
                        }
                    }
                    b"pStyle" if in_ppr => {
                        if let (Some(p), Some(val)) = (p, attr_local(e, b"val")) {
                            p.style_name = Some(val);
                        }
                    }
                    b"jc" if in_ppr => {
                        if let Some(p) = p {
                            p.alignment =
                                attr_local(e, b"val").as_deref().and_then(parse_alignment);
                        }
                    }
                    b"spacing" if in_ppr => {
                        if let Some(p) = p {
                            let rule = attr_local(e, b"lineRule");
                            if matches!(rule.as_deref(), Some("exact") | Some("atLeast")) {
                                p.line_spacing_pt = attr_twips_pt(e, b"line");
                            }
                            p.space_before_pt = attr_twips_pt(e, b"before");
                            p.space_after_pt = attr_twips_pt(e, b"after");
                        }
                    }
                    b"ind" if in_ppr => {
                        if let Some(p) = p {
                            p.first_line_indent_pt = attr_twips_pt(e, b"firstLine");
                            p.first_line_indent_chars = attr_local(e, b"firstLineChars")
                                .and_then(|v| v.parse::<f64>().ok())
                                .map(|v| v / 100.0);
                        }
                    }
                    b"rFonts" if in_run_rpr => {
                        if let Some(r) = run.as_mut() {
                            r.font_name =
                                attr_local(e, b"eastAsia").or_else(|| attr_local(e, b"ascii"));
                        }
                    }
                    b"sz" if in_run_rpr => {
                        if let Some(r) = run.as_mut() {
                            r.size_pt = attr_local(e, b"val")
                                .and_then(|v| v.parse::<f64>().ok())
                                .map(|half| half / 2.0);
                        }
                    }
                    b"b" if in_run_rpr => {
                        if let Some(r) = run.as_mut() {
                            r.bold = Some(parse_on_off(attr_local(e, b"val")));
                        }
                    }
                    b"color" if in_run_rpr => {
                        if let Some(r) = run.as_mut() {
                            r.color_hex = attr_local(e, b"val").filter(|v| v.as_str() != "auto");
                        }
                    }
                    b"tab" => {
                        if let Some(r) = run.as_mut() {
                            r.text.push('\t');
                        }
                    }
                    b"br" => {
                        if let Some(r) = run.as_mut() {
                            r.text.push('\n');
                        }
                    }
                    b"pgMar" => {
                        let cm = |name| {
                            attr_local(e, name)
                                .and_then(|v: String| v.parse::<f64>().ok())
                                .map(|twips| twips / TWIPS_PER_CM)
                                .unwrap_or(0.0)
                        };
                        doc.margins_cm = Some(MarginsCm {
                            top: cm(b"top" as &[u8]),
                            bottom: cm(b"bottom"),
                            left: cm(b"left"),
                            right: cm(b"right"),
                        });
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(r) = run.as_mut() {
                        r.text.push_str(&text_content(e.as_ref()));
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(p) = para.take() {
                        if tbl_depth > 0 {
                            let text = p.text();
                            if let Some(c) = cell.as_mut() {
                                if !text.trim().is_empty() {
                                    c.lines.push(text.trim().to_string());
                                }
                            }
                        } else {
                            doc.paragraphs.push(p);
                        }
                    }
                }
                b"pPr" => in_ppr = false,
                b"rPr" => in_run_rpr = false,
                b"t" => in_text = false,
                b"r" => {
                    if let (Some(p), Some(r)) = (para.as_mut(), run.take()) {
                        p.runs.push(r);
                    }
                }
                b"tbl" => {
                    if tbl_depth > 0 {
                        tbl_depth -= 1;
                    }
                    if tbl_depth == 0 {
                        if let Some(t) = table.take() {
                            doc.tables.push(t);
                        }
                    }
                }
                b"tr" if tbl_depth == 1 => {
                    if let (Some(t), Some(r)) = (table.as_mut(), row.take()) {
                        t.rows.push(r);
                    }
                }
                b"tc" if tbl_depth == 1 => {
                    if let (Some(r), Some(c)) = (row.as_mut(), cell.take()) {
                        r.push(c);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(doc)
}

fn parse_styles_xml(xml: &[u8]) -> Result<HashMap<String, StyleDef>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::with_capacity(1024);

    let mut styles = HashMap::new();
    let mut current_id: Option<String> = None;
    let mut current: StyleDef = StyleDef::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"style" => {
                current_id = attr_local(e, b"styleId");
                current = StyleDef::default();
            }
            Ok(Event::Empty(ref e)) if current_id.is_some() => match e.local_name().as_ref() {
                b"name" => {
                    if let Some(val) = attr_local(e, b"val") {
                        current.name = val;
                    }
                }
                b"rFonts" => {
                    current.font_name =
                        attr_local(e, b"eastAsia").or_else(|| attr_local(e, b"ascii"));
                }
                b"sz" => {
                    current.size_pt = attr_local(e, b"val")
                        .and_then(|v| v.parse::<f64>().ok())
                        .map(|half| half / 2.0);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => {
                if let Some(id) = current_id.take() {
                    if current.name.is_empty() {
                        current.name = id.clone();
                    }
                    styles.insert(id, std::mem::take(&mut current));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::build_docx_package;

    #[test]
    fn test_reads_paragraph_runs_and_properties() {
        let body = r#"
            <w:p>
              <w:pPr>
                <w:jc w:val="center"/>
                <w:spacing w:line="560" w:lineRule="exact" w:before="0" w:after="0"/>
                <w:ind w:firstLineChars="200"/>
              </w:pPr>
              <w:r>
                <w:rPr><w:rFonts w:eastAsia="仿宋_GB2312"/><w:sz w:val="32"/><w:b/></w:rPr>
                <w:t>这是正文。</w:t>
              </w:r>
            </w:p>"#;
        let docx = build_docx_package(body, "");
        let doc = read_docx(&docx).unwrap();

        assert_eq!(doc.paragraphs.len(), 1);
        let p = &doc.paragraphs[0];
        assert_eq!(p.text(), "这是正文。");
        assert_eq!(p.alignment, Some(Alignment::Center));
        assert_eq!(p.line_spacing_pt, Some(28.0));
        assert_eq!(p.first_line_indent_chars, Some(2.0));

        let r = p.first_visible_run().unwrap();
        assert_eq!(r.font_name.as_deref(), Some("仿宋_GB2312"));
        assert_eq!(r.size_pt, Some(16.0));
        assert_eq!(r.bold, Some(true));
    }

    #[test]
    fn test_reads_tables_and_margins() {
        let body = r#"
            <w:tbl>
              <w:tr>
                <w:tc><w:p><w:r><w:t>甲</w:t></w:r></w:p><w:p><w:r><w:t>乙</w:t></w:r></w:p></w:tc>
                <w:tc><w:p><w:r><w:t>丙</w:t></w:r></w:p></w:tc>
              </w:tr>
            </w:tbl>
            <w:sectPr><w:pgMar w:top="2098" w:bottom="1984" w:left="1531" w:right="1417"/></w:sectPr>"#;
        let docx = build_docx_package(body, "");
        let doc = read_docx(&docx).unwrap();

        assert_eq!(doc.tables.len(), 1);
        let rows = &doc.tables[0].rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].lines, vec!["甲", "乙"]);
        assert_eq!(rows[0][1].lines, vec!["丙"]);

        let margins = doc.margins_cm.unwrap();
        assert!((margins.top - 3.7).abs() < 0.01);
        assert!((margins.left - 2.7).abs() < 0.01);
    }

    #[test]
    fn test_rejects_non_zip() {
        assert!(matches!(
            read_docx(b"definitely not a zip"),
            Err(Error::InvalidDocx(_))
        ));
    }

    #[test]
    fn test_paragraph_mark_rpr_not_mistaken_for_run() {
        let body = r#"
            <w:p>
              <w:pPr><w:rPr><w:rFonts w:eastAsia="黑体"/><w:sz w:val="44"/></w:rPr></w:pPr>
              <w:r><w:t>无字体标记</w:t></w:r>
            </w:p>"#;
        let docx = build_docx_package(body, "");
        let doc = read_docx(&docx).unwrap();
        let r = doc.paragraphs[0].first_visible_run().unwrap();
        assert_eq!(r.font_name, None);
        assert_eq!(r.size_pt, None);
    }
}
