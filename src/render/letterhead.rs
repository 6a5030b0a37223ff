//! First-page letterhead rendering: positioned elements become header
//! paragraphs, one per y-row.

use crate::model::{
    Alignment, AnchorSide, Binding, Element, ElementKind, LetterheadTemplate, StructuredFields,
};
use crate::text::normalize_doc_no_brackets;

use super::xml::{
    cm_to_twips, write_paragraph, write_run, write_tab_run, BorderSpec, ParaProps, RunProps,
};

/// Elements within this vertical distance render on one header line.
const ROW_TOLERANCE_CM: f64 = 0.05;
/// A4 paper width.
const PAGE_WIDTH_CM: f64 = 21.0;

/// Resolved values for the element bindings.
pub(crate) struct BindMap {
    unit_name: String,
    doc_no: String,
    signatory: String,
    copy_no: String,
}

impl BindMap {
    pub fn new(fields: &StructuredFields, unit_name: &str) -> Self {
        Self {
            unit_name: unit_name.to_string(),
            doc_no: normalize_doc_no_brackets(&fields.doc_no),
            signatory: fields.signatory.clone(),
            copy_no: fields.copy_no.clone(),
        }
    }

    fn value(&self, element: &Element) -> String {
        match element.bind {
            Binding::UnitName => self.unit_name.clone(),
            Binding::DocNo => self.doc_no.clone(),
            Binding::Signatory => self.signatory.clone(),
            Binding::CopyNo => self.copy_no.clone(),
            Binding::FixedText => element.fixed_text.clone().unwrap_or_default(),
        }
    }
}

/// Group enabled elements into rows: sort by y, then chain elements whose y
/// differs from the row anchor by at most the tolerance.
pub(crate) fn group_elements_by_y(template: &LetterheadTemplate) -> Vec<Vec<&Element>> {
    let mut enabled: Vec<&Element> = template.enabled_elements().collect();
    enabled.sort_by(|a, b| a.y_cm.total_cmp(&b.y_cm));

    let mut groups: Vec<Vec<&Element>> = Vec::new();
    for element in enabled {
        match groups.last_mut() {
            Some(group) if (element.y_cm - group[0].y_cm).abs() <= ROW_TOLERANCE_CM => {
                group.push(element);
            }
            _ => groups.push(vec![element]),
        }
    }
    groups
}

fn text_height_cm(size_pt: f64) -> f64 {
    (size_pt / 72.0) * 2.54 * 1.2
}

fn run_props(element: &Element) -> RunProps {
    let font = element.text.as_ref().map(|t| &t.font);
    RunProps {
        family: Some(
            font.map(|f| f.family.clone())
                .unwrap_or_else(|| "仿宋_GB2312".to_string()),
        ),
        size_pt: Some(font.map(|f| f.size_pt).unwrap_or(16.0)),
        bold: font.map(|f| f.bold).unwrap_or(false),
        color: font.map(|f| f.color.trim_start_matches('#').to_string()),
        letter_spacing_pt: font.map(|f| f.letter_spacing_pt),
    }
}

fn row_alignment(element: &Element) -> Alignment {
    let align = element.text.as_ref().map(|t| t.align);
    match (align, element.x.anchor) {
        (Some(Alignment::Center), _) | (_, AnchorSide::Center) => Alignment::Center,
        (Some(Alignment::Right), _) | (_, AnchorSide::MarginRight) => Alignment::Right,
        _ => Alignment::Left,
    }
}

fn border_for(element: &Element) -> BorderSpec {
    match element.line.as_ref() {
        Some(line) => BorderSpec::red_rule(line.thickness_pt, &line.color),
        None => BorderSpec::red_rule(1.5, "#D40000"),
    }
}

/// Render the letterhead rows into header paragraphs.
///
/// Vertical placement is approximated with paragraph space-before: each row
/// is pushed down by the gap between its y and the bottom of the previous
/// row, carried forward row to row.
pub(crate) fn write_header_rows(
    xml: &mut String,
    template: &LetterheadTemplate,
    bind: &BindMap,
) {
    let margins = template.page.margins_cm;
    let content_width_cm = PAGE_WIDTH_CM - margins.left - margins.right;

    let mut prev_y = 0.0f64;
    let mut prev_height = 0.0f64;

    for group in group_elements_by_y(template) {
        let y_cm = group[0].y_cm;
        let space_before = (y_cm - (prev_y + prev_height)).max(0.0);

        let line_elem = group.iter().copied().find(|e| e.kind == ElementKind::Line);
        let text_elems: Vec<&Element> = group
            .iter()
            .copied()
            .filter(|e| e.kind == ElementKind::Text)
            .collect();

        let doc_no = text_elems.iter().copied().find(|e| e.bind == Binding::DocNo);
        let signatory = text_elems
            .iter()
            .copied()
            .find(|e| e.bind == Binding::Signatory);

        let mut props = ParaProps {
            space_before_cm: Some(space_before),
            space_after_pt: Some(0.0),
            ..Default::default()
        };

        // A row holding only a line renders as a bare red rule.
        if let (Some(line), true) = (line_elem, text_elems.is_empty()) {
            props.bottom_border = Some(border_for(line));
            write_paragraph(xml, &props, |_| {});
            prev_height = 0.08;
            prev_y = y_cm;
            continue;
        }

        // Document number and signatory share one tab-aligned line.
        if let (Some(doc_no), Some(signatory), 2) = (doc_no, signatory, text_elems.len()) {
            props.align = Some(Alignment::Left);
            props.right_tab_twips = Some(cm_to_twips(content_width_cm));
            if let Some(line) = line_elem {
                props.bottom_border = Some(border_for(line));
            }
            let left_props = run_props(doc_no);
            let right_props = run_props(signatory);
            let row_size = left_props
                .size_pt
                .unwrap_or(16.0)
                .max(right_props.size_pt.unwrap_or(16.0));
            write_paragraph(xml, &props, |xml| {
                write_run(xml, &bind.value(doc_no), &left_props);
                write_tab_run(xml);
                write_run(xml, &bind.value(signatory), &right_props);
            });
            prev_height = text_height_cm(row_size);
            prev_y = y_cm;
            continue;
        }

        // General text row: each visible element one styled run, paragraph
        // alignment from the element's own align/anchor.
        let mut rendered_height = prev_height;
        let mut visible: Vec<(&Element, String)> = Vec::new();
        for &element in &text_elems {
            let value = bind.value(element);
            if value.is_empty() && !element.visible_if_empty {
                continue;
            }
            props.align = Some(row_alignment(element));
            rendered_height = text_height_cm(
                element.text.as_ref().map(|t| t.font.size_pt).unwrap_or(16.0),
            );
            visible.push((element, value));
        }
        if let Some(line) = line_elem {
            props.bottom_border = Some(border_for(line));
        }
        write_paragraph(xml, &props, |xml| {
            for (element, value) in &visible {
                write_run(xml, value, &run_props(element));
            }
        });
        prev_height = rendered_height;
        prev_y = y_cm;
    }
}
