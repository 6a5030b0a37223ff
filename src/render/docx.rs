//! DOCX output: semantic tree + structured fields + letterhead template →
//! package bytes.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{Error, Result};
use crate::model::{
    Alignment, DocumentNode, HeadingLevel, LetterheadTemplate, StructuredFields, StyleAttrs,
    StyleRules,
};
use crate::text::{format_zh_date, split_suffix_marker, strip_file_ext, is_suffix_marker};

use super::letterhead::{write_header_rows, BindMap};
use super::xml::{
    write_page_break_run, write_page_number_field, write_paragraph, write_run, BorderSpec,
    ParaProps, RunProps,
};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";
const W_NS: &str = "xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\" \
                    xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"";

/// A4 in twips.
const PAGE_W: i64 = 11906;
const PAGE_H: i64 = 16838;
/// Statutory margins: 3.7 / 3.5 / 2.7 / 2.5 cm.
const MARGIN_TOP: i64 = 2098;
const MARGIN_BOTTOM: i64 = 1985;
const MARGIN_LEFT: i64 = 1531;
const MARGIN_RIGHT: i64 = 1418;
/// Printable width between the margins.
const CONTENT_W: i64 = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;

const BODY_FONT: &str = "仿宋_GB2312";
const TITLE_FONT: &str = "方正小标宋简";
const LABEL_FONT: &str = "黑体";

/// Renderer for one document. Built with the document tree and structured
/// fields, optionally given a letterhead template, then `render()` once.
pub struct DocxRenderer {
    document: DocumentNode,
    fields: StructuredFields,
    unit_name: String,
    letterhead: Option<LetterheadTemplate>,
    include_letterhead: bool,
}

impl DocxRenderer {
    pub fn new(document: DocumentNode, fields: StructuredFields) -> Self {
        Self {
            document,
            fields,
            unit_name: String::new(),
            letterhead: None,
            include_letterhead: true,
        }
    }

    /// Unit name bound into the letterhead.
    pub fn with_unit_name(mut self, unit_name: impl Into<String>) -> Self {
        self.unit_name = unit_name.into();
        self
    }

    /// Letterhead template for the first-page header.
    pub fn with_letterhead(mut self, template: LetterheadTemplate) -> Self {
        self.letterhead = Some(template);
        self
    }

    /// Render without the letterhead even when a template is present.
    pub fn include_letterhead(mut self, include: bool) -> Self {
        self.include_letterhead = include;
        self
    }

    /// Produce the DOCX bytes.
    pub fn render(&self) -> Result<Vec<u8>> {
        let with_header = self.include_letterhead && self.letterhead.is_some();

        let document_xml = self.document_xml(with_header);
        let header_xml = match (&self.letterhead, with_header) {
            (Some(template), true) => Some(self.header_xml(template)),
            _ => None,
        };

        write_package(&document_xml, header_xml.as_deref(), &footer_xml())
    }

    fn rules(&self) -> Option<&StyleRules> {
        self.fields.topic_template_rules.as_ref()
    }

    /// Leading template nodes supply the frontmatter; the automatic title
    /// and main-addressee lines would duplicate it.
    fn frontmatter_suppressed(&self) -> bool {
        self.rules()
            .and_then(|r| r.content_template.as_ref())
            .map(|t| !t.leading_nodes.is_empty())
            .unwrap_or(false)
    }

    fn header_xml(&self, template: &LetterheadTemplate) -> String {
        let bind = BindMap::new(&self.fields, &self.unit_name);
        let mut xml = format!("{XML_DECL}<w:hdr {W_NS}>");
        write_header_rows(&mut xml, template, &bind);
        xml.push_str("</w:hdr>");
        xml
    }

    fn document_xml(&self, with_header: bool) -> String {
        let body_rule = self.rules().map(|r| r.body.clone()).unwrap_or_default();
        let heading_rules = self.rules().map(|r| r.headings.clone()).unwrap_or_default();

        let mut xml = format!("{XML_DECL}<w:document {W_NS}><w:body>");

        if !self.frontmatter_suppressed() {
            let title = self.fields.title.trim();
            if !title.is_empty() {
                write_paragraph(
                    &mut xml,
                    &ParaProps {
                        align: Some(Alignment::Center),
                        line_spacing_pt: Some(28.0),
                        ..Default::default()
                    },
                    |xml| write_run(xml, title, &RunProps::new(TITLE_FONT, 22.0)),
                );
            }
            let main_to = self.fields.main_to.trim();
            if !main_to.is_empty() {
                write_paragraph(
                    &mut xml,
                    &ParaProps {
                        line_spacing_pt: Some(28.0),
                        first_line_indent_pt: Some(0.0),
                        ..Default::default()
                    },
                    |xml| write_run(xml, main_to, &RunProps::new(BODY_FONT, 16.0)),
                );
            }
        }

        let no_rule = StyleAttrs::default();
        let mut suffix_mode = false;
        for node in self.document.children() {
            match node {
                DocumentNode::Heading { attrs, .. } => {
                    let resolved = heading_default(attrs.level)
                        .layered(heading_rules.level(attrs.level).unwrap_or(&no_rule))
                        .layered(&attrs.style);
                    let text = node.plain_text();
                    write_styled_paragraph(&mut xml, &resolved, &text);
                }
                DocumentNode::Paragraph { attrs, .. } => {
                    if node.is_divider() {
                        write_divider(&mut xml);
                        continue;
                    }
                    let text = node.plain_text();
                    let trimmed = text.trim();
                    if is_suffix_marker(trimmed) {
                        suffix_mode = true;
                    }
                    let resolved = body_default().layered(&body_rule).layered(attrs);
                    if suffix_mode && !trimmed.is_empty() {
                        write_suffix_paragraph(&mut xml, &resolved, trimmed);
                    } else {
                        write_styled_paragraph(&mut xml, &resolved, &text);
                    }
                }
                DocumentNode::Table { .. } => {
                    self.write_table(&mut xml, node, &body_rule);
                }
                _ => {}
            }
        }

        self.write_sign_off(&mut xml);
        self.write_attachments(&mut xml, &body_rule);
        write_sect_pr(&mut xml, with_header);

        xml.push_str("</w:body></w:document>");
        xml
    }

    fn write_table(&self, xml: &mut String, table: &DocumentNode, body_rule: &StyleAttrs) {
        let resolved = body_default().layered(body_rule);
        let family = resolved.font_family.unwrap_or_else(|| BODY_FONT.to_string());
        let size = resolved.font_size_pt.unwrap_or(16.0);

        let rows: Vec<Vec<String>> = table
            .children()
            .iter()
            .filter_map(|row| match row {
                DocumentNode::TableRow { content } => Some(
                    content
                        .iter()
                        .map(|cell| {
                            cell.children()
                                .iter()
                                .map(|line| line.plain_text())
                                .filter(|l| !l.trim().is_empty())
                                .collect::<Vec<_>>()
                                .join("\n")
                        })
                        .collect::<Vec<String>>(),
                ),
                _ => None,
            })
            .filter(|cells| !cells.is_empty())
            .collect();

        if rows.is_empty() {
            return;
        }
        let col_count = rows.iter().map(Vec::len).max().unwrap_or(1);
        let col_width = CONTENT_W / col_count as i64;

        xml.push_str("<w:tbl><w:tblPr><w:tblW w:w=\"");
        xml.push_str(&CONTENT_W.to_string());
        xml.push_str("\" w:type=\"dxa\"/><w:tblLayout w:type=\"fixed\"/></w:tblPr><w:tblGrid>");
        for _ in 0..col_count {
            xml.push_str(&format!("<w:gridCol w:w=\"{col_width}\"/>"));
        }
        xml.push_str("</w:tblGrid>");

        for row in &rows {
            xml.push_str("<w:tr>");
            for col in 0..col_count {
                let value = row.get(col).map(String::as_str).unwrap_or("");
                xml.push_str(&format!(
                    "<w:tc><w:tcPr><w:tcW w:w=\"{col_width}\" w:type=\"dxa\"/></w:tcPr>"
                ));
                write_paragraph(
                    xml,
                    &ParaProps {
                        line_spacing_pt: Some(28.0),
                        ..Default::default()
                    },
                    |xml| {
                        for (i, line) in value.split('\n').enumerate() {
                            if i > 0 {
                                xml.push_str("<w:r><w:br/></w:r>");
                            }
                            write_run(xml, line, &RunProps::new(family.as_str(), size));
                        }
                    },
                );
                xml.push_str("</w:tc>");
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
    }

    fn write_sign_off(&self, xml: &mut String) {
        let sign_off = self.fields.sign_off.trim();
        let date_text = format_zh_date(&self.fields.date);
        if sign_off.is_empty() && date_text.is_empty() {
            return;
        }

        let blank = ParaProps {
            line_spacing_pt: Some(28.0),
            first_line_indent_pt: Some(0.0),
            space_before_pt: Some(0.0),
            space_after_pt: Some(0.0),
            ..Default::default()
        };
        for _ in 0..2 {
            write_paragraph(xml, &blank, |_| {});
        }

        let right = ParaProps {
            align: Some(Alignment::Right),
            line_spacing_pt: Some(28.0),
            first_line_indent_pt: Some(0.0),
            ..Default::default()
        };
        if !sign_off.is_empty() {
            write_paragraph(xml, &right, |xml| {
                write_run(xml, sign_off, &RunProps::new(BODY_FONT, 16.0));
            });
        }
        if !date_text.is_empty() {
            write_paragraph(xml, &right, |xml| {
                write_run(xml, &date_text, &RunProps::new(BODY_FONT, 16.0));
            });
        }
    }

    fn write_attachments(&self, xml: &mut String, body_rule: &StyleAttrs) {
        if self.fields.attachments.is_empty() {
            return;
        }

        let list_props = ParaProps {
            line_spacing_pt: Some(28.0),
            first_line_indent_pt: Some(32.0),
            ..Default::default()
        };

        write_paragraph(xml, &ParaProps::default(), |_| {});
        write_paragraph(xml, &list_props, |xml| {
            write_run(xml, "附件：", &RunProps::new(BODY_FONT, 16.0));
        });
        for item in &self.fields.attachments {
            write_paragraph(xml, &list_props, |xml| {
                write_run(
                    xml,
                    &format!("{}. {}", item.index, strip_file_ext(&item.name)),
                    &RunProps::new(BODY_FONT, 16.0),
                );
            });
        }

        // One placeholder section per attachment, each on its own page.
        let resolved = body_default().layered(body_rule);
        for item in &self.fields.attachments {
            write_paragraph(xml, &ParaProps::default(), write_page_break_run);

            write_paragraph(
                xml,
                &ParaProps {
                    line_spacing_pt: Some(28.0),
                    first_line_indent_pt: Some(0.0),
                    ..Default::default()
                },
                |xml| {
                    write_run(
                        xml,
                        &format!("附件{}", item.index),
                        &RunProps::new(LABEL_FONT, 16.0),
                    );
                },
            );
            write_paragraph(
                xml,
                &ParaProps {
                    align: Some(Alignment::Center),
                    line_spacing_pt: Some(28.0),
                    ..Default::default()
                },
                |xml| {
                    write_run(
                        xml,
                        strip_file_ext(&item.name),
                        &RunProps::new(TITLE_FONT, 22.0),
                    );
                },
            );
            write_styled_paragraph(xml, &resolved, "（附件正文请在此处编辑）");
        }
    }
}

/// Default body role style.
fn body_default() -> StyleAttrs {
    StyleAttrs {
        font_family: Some(BODY_FONT.to_string()),
        font_size_pt: Some(16.0),
        line_spacing_pt: Some(28.0),
        first_line_indent_pt: Some(32.0),
        space_before_pt: Some(0.0),
        space_after_pt: Some(0.0),
        ..Default::default()
    }
}

/// Default per-level heading role style.
fn heading_default(level: HeadingLevel) -> StyleAttrs {
    let family = match level {
        HeadingLevel::H1 | HeadingLevel::H2 => LABEL_FONT,
        HeadingLevel::H3 | HeadingLevel::H4 => BODY_FONT,
    };
    StyleAttrs {
        font_family: Some(family.to_string()),
        font_size_pt: Some(16.0),
        line_spacing_pt: Some(28.0),
        first_line_indent_pt: Some(32.0),
        space_before_pt: Some(0.0),
        space_after_pt: Some(0.0),
        ..Default::default()
    }
}

fn para_props_from(attrs: &StyleAttrs) -> ParaProps {
    ParaProps {
        align: attrs.text_align,
        line_spacing_pt: attrs.line_spacing_pt.or(Some(28.0)),
        space_before_pt: attrs.space_before_pt,
        space_after_pt: attrs.space_after_pt,
        first_line_indent_pt: attrs.first_line_indent_pt,
        first_line_indent_chars: attrs.first_line_indent_chars,
        ..Default::default()
    }
}

fn run_props_from(attrs: &StyleAttrs) -> RunProps {
    RunProps {
        family: Some(
            attrs
                .font_family
                .clone()
                .unwrap_or_else(|| BODY_FONT.to_string()),
        ),
        size_pt: Some(attrs.font_size_pt.unwrap_or(16.0)),
        bold: attrs.bold.unwrap_or(false),
        color: attrs
            .color_hex
            .as_deref()
            .map(|c| c.trim_start_matches('#').to_string()),
        letter_spacing_pt: None,
    }
}

/// Write a heading or body paragraph with fully resolved style attributes.
fn write_styled_paragraph(xml: &mut String, resolved: &StyleAttrs, text: &str) {
    write_paragraph(xml, &para_props_from(resolved), |xml| {
        write_run(xml, text, &run_props_from(resolved));
    });
}

/// Suffix-mode paragraph: the role label (marker plus colon) renders in
/// 黑体 with bold forced off, the remainder in the resolved body font —
/// visually distinct labels over body typography.
fn write_suffix_paragraph(xml: &mut String, resolved: &StyleAttrs, text: &str) {
    let mut props = para_props_from(resolved);
    props.align = Some(Alignment::Left);
    props.first_line_indent_pt = Some(0.0);
    props.first_line_indent_chars = None;

    let size = resolved.font_size_pt.unwrap_or(16.0);
    let body_run = run_props_from(resolved);

    write_paragraph(xml, &props, |xml| match split_suffix_marker(text) {
        Some((label, rest)) => {
            write_run(
                xml,
                label,
                &RunProps {
                    family: Some(LABEL_FONT.to_string()),
                    size_pt: Some(size),
                    bold: false,
                    color: None,
                    letter_spacing_pt: None,
                },
            );
            write_run(
                xml,
                rest,
                &RunProps {
                    bold: false,
                    ..body_run.clone()
                },
            );
        }
        None => write_run(xml, text, &body_run),
    });
}

/// Red divider paragraph: zero-height, red bottom border, no text.
fn write_divider(xml: &mut String) {
    write_paragraph(
        xml,
        &ParaProps {
            space_before_pt: Some(0.0),
            space_after_pt: Some(0.0),
            bottom_border: Some(BorderSpec::red_rule(1.5, "#D40000")),
            ..Default::default()
        },
        |_| {},
    );
}

fn write_sect_pr(xml: &mut String, with_header: bool) {
    xml.push_str("<w:sectPr>");
    if with_header {
        xml.push_str("<w:headerReference w:type=\"first\" r:id=\"rId2\"/>");
    }
    xml.push_str("<w:footerReference w:type=\"default\" r:id=\"rId3\"/>");
    xml.push_str(&format!(
        "<w:pgSz w:w=\"{PAGE_W}\" w:h=\"{PAGE_H}\"/>"
    ));
    let header_distance = if with_header { 0 } else { 851 };
    xml.push_str(&format!(
        "<w:pgMar w:top=\"{MARGIN_TOP}\" w:right=\"{MARGIN_RIGHT}\" w:bottom=\"{MARGIN_BOTTOM}\" \
         w:left=\"{MARGIN_LEFT}\" w:header=\"{header_distance}\" w:footer=\"851\" w:gutter=\"0\"/>"
    ));
    if with_header {
        xml.push_str("<w:titlePg/>");
    }
    xml.push_str("</w:sectPr>");
}

fn footer_xml() -> String {
    let mut xml = format!("{XML_DECL}<w:ftr {W_NS}>");
    write_paragraph(
        &mut xml,
        &ParaProps {
            align: Some(Alignment::Center),
            ..Default::default()
        },
        write_page_number_field,
    );
    xml.push_str("</w:ftr>");
    xml
}

fn styles_xml() -> String {
    format!(
        "{XML_DECL}<w:styles {W_NS}>\
         <w:docDefaults><w:rPrDefault><w:rPr>\
         <w:rFonts w:ascii=\"{BODY_FONT}\" w:hAnsi=\"{BODY_FONT}\" w:eastAsia=\"{BODY_FONT}\"/>\
         <w:sz w:val=\"32\"/><w:szCs w:val=\"32\"/>\
         </w:rPr></w:rPrDefault></w:docDefaults>\
         <w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">\
         <w:name w:val=\"Normal\"/></w:style>\
         </w:styles>"
    )
}

fn content_types_xml(with_header: bool) -> String {
    let mut xml = format!(
        "{XML_DECL}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
         <Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>\
         <Override PartName=\"/word/footer1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml\"/>"
    );
    if with_header {
        xml.push_str(
            "<Override PartName=\"/word/header1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml\"/>",
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"word/document.xml\"/>\
         </Relationships>"
    )
}

fn document_rels_xml(with_header: bool) -> String {
    let mut xml = format!(
        "{XML_DECL}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>\
         <Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer\" Target=\"footer1.xml\"/>"
    );
    if with_header {
        xml.push_str(
            "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"header1.xml\"/>",
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn write_package(
    document_xml: &str,
    header_xml: Option<&str>,
    footer_xml: &str,
) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut put = |name: &str, content: &str| -> Result<()> {
        writer
            .start_file(name, options.clone())
            .map_err(|e| Error::Render(format!("zip entry {name}: {e}")))?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    };

    put("[Content_Types].xml", &content_types_xml(header_xml.is_some()))?;
    put("_rels/.rels", &root_rels_xml())?;
    put("word/document.xml", document_xml)?;
    put("word/styles.xml", &styles_xml())?;
    put(
        "word/_rels/document.xml.rels",
        &document_rels_xml(header_xml.is_some()),
    )?;
    if let Some(header) = header_xml {
        put("word/header1.xml", header)?;
    }
    put("word/footer1.xml", footer_xml)?;

    let cursor = writer
        .finish()
        .map_err(|e| Error::Render(format!("finalize package: {e}")))?;
    Ok(cursor.into_inner())
}

/// Test-only fixture builder: a minimal DOCX package around raw body and
/// styles markup, for exercising the importer and extractor.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn build_docx_package(body_inner: &str, styles_inner: &str) -> Vec<u8> {
        let document_xml = format!(
            "{XML_DECL}<w:document {W_NS}><w:body>{body_inner}</w:body></w:document>"
        );
        let styles_xml = format!("{XML_DECL}<w:styles {W_NS}>{styles_inner}</w:styles>");

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let entries = [
            ("[Content_Types].xml", content_types_xml(false)),
            ("_rels/.rels", root_rels_xml()),
            ("word/document.xml", document_xml),
            ("word/styles.xml", styles_xml),
        ];
        for (name, content) in entries {
            writer.start_file(name, options.clone()).expect("zip entry");
            writer.write_all(content.as_bytes()).expect("zip write");
        }
        writer.finish().expect("finish zip").into_inner()
    }
}
