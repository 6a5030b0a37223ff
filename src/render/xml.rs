//! Low-level OOXML markup builders.
//!
//! Markup is assembled as strings with explicit escaping; the subset here
//! (runs, paragraph properties, borders, fields) is all the house-style
//! renderer needs.

use crate::model::Alignment;

const TWIPS_PER_PT: f64 = 20.0;
const TWIPS_PER_CM: f64 = 567.0;

/// Escape XML special characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub(crate) fn cm_to_twips(cm: f64) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

pub(crate) fn pt_to_twips(pt: f64) -> i64 {
    (pt * TWIPS_PER_PT).round() as i64
}

/// `w:sz` wants half-points.
fn half_points(pt: f64) -> i64 {
    (pt * 2.0).round() as i64
}

/// Character formatting of one run.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunProps {
    pub family: Option<String>,
    pub size_pt: Option<f64>,
    pub bold: bool,
    /// Hex digits, `#` stripped by the caller.
    pub color: Option<String>,
    /// Extra tracking between characters.
    pub letter_spacing_pt: Option<f64>,
}

impl RunProps {
    pub fn new(family: impl Into<String>, size_pt: f64) -> Self {
        Self {
            family: Some(family.into()),
            size_pt: Some(size_pt),
            ..Default::default()
        }
    }

    fn has_any(&self) -> bool {
        self.family.is_some()
            || self.size_pt.is_some()
            || self.bold
            || self.color.is_some()
            || self.letter_spacing_pt.is_some()
    }

    fn write_rpr(&self, xml: &mut String) {
        if !self.has_any() {
            return;
        }
        xml.push_str("<w:rPr>");
        if let Some(family) = &self.family {
            let family = escape_xml(family);
            xml.push_str(&format!(
                "<w:rFonts w:ascii=\"{family}\" w:hAnsi=\"{family}\" w:eastAsia=\"{family}\"/>"
            ));
        }
        if self.bold {
            xml.push_str("<w:b/>");
        }
        if let Some(color) = &self.color {
            xml.push_str(&format!("<w:color w:val=\"{}\"/>", escape_xml(color)));
        }
        if let Some(spacing) = self.letter_spacing_pt {
            if spacing != 0.0 {
                xml.push_str(&format!("<w:spacing w:val=\"{}\"/>", pt_to_twips(spacing)));
            }
        }
        if let Some(size) = self.size_pt {
            let half = half_points(size);
            xml.push_str(&format!(
                "<w:sz w:val=\"{half}\"/><w:szCs w:val=\"{half}\"/>"
            ));
        }
        xml.push_str("</w:rPr>");
    }
}

/// Write one text run.
pub(crate) fn write_run(xml: &mut String, text: &str, props: &RunProps) {
    xml.push_str("<w:r>");
    props.write_rpr(xml);
    if !text.is_empty() {
        xml.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t>",
            escape_xml(text)
        ));
    }
    xml.push_str("</w:r>");
}

/// Write a bare tab run.
pub(crate) fn write_tab_run(xml: &mut String) {
    xml.push_str("<w:r><w:tab/></w:r>");
}

/// Write a page-break run.
pub(crate) fn write_page_break_run(xml: &mut String) {
    xml.push_str("<w:r><w:br w:type=\"page\"/></w:r>");
}

/// Write a PAGE field (current page number).
pub(crate) fn write_page_number_field(xml: &mut String) {
    xml.push_str("<w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>");
    xml.push_str("<w:r><w:instrText xml:space=\"preserve\">PAGE</w:instrText></w:r>");
    xml.push_str("<w:r><w:fldChar w:fldCharType=\"end\"/></w:r>");
}

/// Bottom border of a paragraph.
#[derive(Debug, Clone)]
pub(crate) struct BorderSpec {
    /// Hex digits without `#`.
    pub color: String,
    /// Line weight in eighth-points.
    pub size_eighth: i64,
}

impl BorderSpec {
    pub fn red_rule(thickness_pt: f64, color: &str) -> Self {
        Self {
            color: color.trim_start_matches('#').to_string(),
            size_eighth: (thickness_pt * 8.0).round().max(2.0) as i64,
        }
    }
}

/// Paragraph formatting.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParaProps {
    pub align: Option<Alignment>,
    pub line_spacing_pt: Option<f64>,
    pub space_before_cm: Option<f64>,
    pub space_before_pt: Option<f64>,
    pub space_after_pt: Option<f64>,
    pub first_line_indent_pt: Option<f64>,
    pub first_line_indent_chars: Option<f64>,
    /// Right-aligned tab stop position, for shared docNo/signatory rows.
    pub right_tab_twips: Option<i64>,
    pub bottom_border: Option<BorderSpec>,
}

impl ParaProps {
    fn has_any(&self) -> bool {
        self.align.is_some()
            || self.line_spacing_pt.is_some()
            || self.space_before_cm.is_some()
            || self.space_before_pt.is_some()
            || self.space_after_pt.is_some()
            || self.first_line_indent_pt.is_some()
            || self.first_line_indent_chars.is_some()
            || self.right_tab_twips.is_some()
            || self.bottom_border.is_some()
    }
}

fn alignment_val(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

/// Write the `<w:pPr>` block. Child order follows the OOXML schema:
/// borders, tabs, spacing, indentation, justification.
pub(crate) fn write_ppr(xml: &mut String, props: &ParaProps) {
    if !props.has_any() {
        return;
    }
    xml.push_str("<w:pPr>");

    if let Some(border) = &props.bottom_border {
        xml.push_str(&format!(
            "<w:pBdr><w:bottom w:val=\"single\" w:sz=\"{}\" w:space=\"1\" w:color=\"{}\"/></w:pBdr>",
            border.size_eighth,
            escape_xml(&border.color)
        ));
    }
    if let Some(pos) = props.right_tab_twips {
        xml.push_str(&format!(
            "<w:tabs><w:tab w:val=\"right\" w:pos=\"{pos}\"/></w:tabs>"
        ));
    }

    let has_spacing = props.line_spacing_pt.is_some()
        || props.space_before_cm.is_some()
        || props.space_before_pt.is_some()
        || props.space_after_pt.is_some();
    if has_spacing {
        xml.push_str("<w:spacing");
        if let Some(cm) = props.space_before_cm {
            xml.push_str(&format!(" w:before=\"{}\"", cm_to_twips(cm)));
        } else if let Some(pt) = props.space_before_pt {
            xml.push_str(&format!(" w:before=\"{}\"", pt_to_twips(pt)));
        }
        if let Some(pt) = props.space_after_pt {
            xml.push_str(&format!(" w:after=\"{}\"", pt_to_twips(pt)));
        }
        if let Some(pt) = props.line_spacing_pt {
            xml.push_str(&format!(
                " w:line=\"{}\" w:lineRule=\"exact\"",
                pt_to_twips(pt)
            ));
        }
        xml.push_str("/>");
    }

    if let Some(chars) = props.first_line_indent_chars {
        xml.push_str(&format!(
            "<w:ind w:firstLineChars=\"{}\"/>",
            (chars * 100.0).round() as i64
        ));
    } else if let Some(pt) = props.first_line_indent_pt {
        xml.push_str(&format!("<w:ind w:firstLine=\"{}\"/>", pt_to_twips(pt)));
    }

    if let Some(align) = props.align {
        xml.push_str(&format!("<w:jc w:val=\"{}\"/>", alignment_val(align)));
    }

    xml.push_str("</w:pPr>");
}

/// Write one complete paragraph given its properties and a closure that
/// emits the runs.
pub(crate) fn write_paragraph(
    xml: &mut String,
    props: &ParaProps,
    runs: impl FnOnce(&mut String),
) {
    xml.push_str("<w:p>");
    write_ppr(xml, props);
    runs(xml);
    xml.push_str("</w:p>");
}
