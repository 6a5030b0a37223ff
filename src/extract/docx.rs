//! Style feature extraction from DOCX samples.

use crate::error::Result;
use crate::import::classify::{marker_level, style_name_level};
use crate::import::docx::{read_docx, RawParagraph, RawDocument};
use crate::infer::mode::round2;
use crate::model::{DocumentNode, HeadingLevel, PageRules, MarginsCm, StyleAttrs};
use crate::text::normalize_color_hex;

use super::template::{body_start_index, extract_content_template, suffix_start_index};
use super::{summarize_samples, Features};

/// One visited paragraph: its tree node, its style sample, and its heading
/// classification.
struct Visited {
    node: DocumentNode,
    sample: StyleAttrs,
    level: Option<HeadingLevel>,
}

/// Extract per-role style summaries, page margins, and the content template
/// from one DOCX sample.
///
/// Body evidence is restricted to paragraphs between the detected body
/// start and suffix start, so letterhead and attendee lines cannot pollute
/// the body-style mode.
pub fn extract_docx_features(data: &[u8]) -> Result<Features> {
    let raw = read_docx(data)?;

    let mut visited: Vec<Visited> = Vec::new();
    for paragraph in &raw.paragraphs {
        let text = paragraph.text().trim().to_string();
        if text.is_empty() {
            continue;
        }

        let sample = style_sample(&raw, paragraph);
        let level = heading_level(&raw, paragraph, &text);
        let node = tree_node(&text, &sample, paragraph, level);
        visited.push(Visited {
            node,
            sample,
            level,
        });
    }

    let nodes: Vec<DocumentNode> = visited.iter().map(|v| v.node.clone()).collect();
    let body_start = body_start_index(&nodes);
    let suffix_start = suffix_start_index(&nodes);

    let locus_start = body_start.unwrap_or(nodes.len());
    let locus_end = match suffix_start {
        Some(ss) if ss >= locus_start => ss,
        _ => nodes.len(),
    };

    let body_samples: Vec<StyleAttrs> = visited
        .iter()
        .enumerate()
        .filter(|(i, v)| v.level.is_none() && (locus_start..locus_end).contains(i))
        .map(|(_, v)| v.sample.clone())
        .collect();

    let mut features = Features {
        body: summarize_samples(&body_samples),
        ..Default::default()
    };

    for level in HeadingLevel::all() {
        let samples: Vec<StyleAttrs> = visited
            .iter()
            .filter(|v| v.level == Some(level))
            .map(|v| v.sample.clone())
            .collect();
        if !samples.is_empty() {
            *features.headings.level_mut(level) = Some(summarize_samples(&samples));
        }
    }

    features.page = raw.margins_cm.map(|m| PageRules {
        margins_cm: MarginsCm {
            top: round2(m.top),
            bottom: round2(m.bottom),
            left: round2(m.left),
            right: round2(m.right),
        },
    });

    features.content_template = extract_content_template(&nodes);

    Ok(features)
}

/// Style evidence of one paragraph: the first visibly texted run, with the
/// paragraph style sheet as fallback, plus paragraph-format values. All
/// numbers are rounded to two decimals.
fn style_sample(raw: &RawDocument, paragraph: &RawParagraph) -> StyleAttrs {
    let run = paragraph.first_visible_run();
    let (style_font, style_size) = match paragraph.style_name.as_deref() {
        Some(style_id) => raw.style_font(style_id),
        None => (None, None),
    };

    StyleAttrs {
        font_family: run
            .and_then(|r| r.font_name.clone())
            .or_else(|| style_font.map(str::to_string)),
        font_size_pt: run.and_then(|r| r.size_pt).or(style_size).map(round2),
        bold: run.and_then(|r| r.bold),
        color_hex: run
            .and_then(|r| r.color_hex.as_deref())
            .and_then(normalize_color_hex),
        line_spacing_pt: paragraph.line_spacing_pt.map(round2),
        space_before_pt: paragraph.space_before_pt.map(round2),
        space_after_pt: paragraph.space_after_pt.map(round2),
        first_line_indent_pt: paragraph.first_line_indent_pt.map(round2),
        ..Default::default()
    }
}

/// Heading classification for a sampled paragraph: the native style name
/// first, then the textual numbering markers.
fn heading_level(
    raw: &RawDocument,
    paragraph: &RawParagraph,
    text: &str,
) -> Option<HeadingLevel> {
    if let Some(style_id) = paragraph.style_name.as_deref() {
        if let Some(level) = style_name_level(raw.style_name(style_id)) {
            return Some(level);
        }
    }
    marker_level(text)
}

/// Tree node for template extraction, carrying the observed typography so
/// a learned prologue/epilogue reproduces its source look.
fn tree_node(
    text: &str,
    sample: &StyleAttrs,
    paragraph: &RawParagraph,
    level: Option<HeadingLevel>,
) -> DocumentNode {
    let mut attrs = StyleAttrs {
        font_family: sample.font_family.clone(),
        font_size_pt: sample.font_size_pt,
        color_hex: sample.color_hex.clone(),
        text_align: paragraph.alignment,
        ..Default::default()
    };
    if sample.bold == Some(true) {
        attrs.bold = Some(true);
    }

    match level {
        Some(level) => {
            let mut node = DocumentNode::heading(level, text);
            if let Some(slot) = node.style_attrs_mut() {
                *slot = attrs;
            }
            node
        }
        None => DocumentNode::paragraph_with_attrs(attrs, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::build_docx_package;

    fn styled_para(text: &str, font: &str, half_points: u32) -> String {
        format!(
            "<w:p><w:pPr><w:spacing w:line=\"560\" w:lineRule=\"exact\"/></w:pPr>\
             <w:r><w:rPr><w:rFonts w:eastAsia=\"{font}\"/><w:sz w:val=\"{half_points}\"/></w:rPr>\
             <w:t>{text}</w:t></w:r></w:p>"
        )
    }

    #[test]
    fn test_body_mode_and_heading_split() {
        let body = [
            styled_para("一、总体要求", "黑体", 32),
            styled_para("要深入学习领会上级精神，统一思想认识，抓好贯彻落实。", "仿宋_GB2312", 32),
            styled_para("要压实各级责任，确保各项任务按期完成，形成工作闭环。", "仿宋_GB2312", 32),
            styled_para("二、工作安排", "黑体", 32),
        ]
        .concat();
        let features = extract_docx_features(&build_docx_package(&body, "")).unwrap();

        assert_eq!(features.body.font_family.as_deref(), Some("仿宋_GB2312"));
        assert_eq!(features.body.font_size_pt, Some(16.0));
        assert_eq!(features.body.line_spacing_pt, Some(28.0));

        let h1 = features.headings.level1.as_ref().unwrap();
        assert_eq!(h1.font_family.as_deref(), Some("黑体"));
        assert!(features.headings.level3.is_none());
    }

    #[test]
    fn test_style_name_classification() {
        let styles = r#"<w:style w:type="paragraph" w:styleId="2">
                          <w:name w:val="heading 2"/>
                        </w:style>"#;
        let body = format!(
            "<w:p><w:pPr><w:pStyle w:val=\"2\"/></w:pPr><w:r><w:t>背景情况</w:t></w:r></w:p>{}",
            styled_para("经研究，现将有关事项安排通知如下，请认真落实。", "仿宋_GB2312", 32)
        );
        let features = extract_docx_features(&build_docx_package(&body, styles)).unwrap();
        assert!(features.headings.level2.is_some());
    }

    #[test]
    fn test_letterhead_lines_excluded_from_body_evidence() {
        let body = [
            styled_para("XX市应急管理局文件", "方正小标宋简", 44),
            styled_para("一、会议内容", "黑体", 32),
            styled_para("会议研究了近期安全生产重点工作，明确了责任分工。", "仿宋_GB2312", 32),
            styled_para("主持：张三", "黑体", 32),
        ]
        .concat();
        let features = extract_docx_features(&build_docx_package(&body, "")).unwrap();

        // The 22pt letterhead line and the suffix line stay out of the mode.
        assert_eq!(features.body.font_family.as_deref(), Some("仿宋_GB2312"));
        assert_eq!(features.body.font_size_pt, Some(16.0));

        let template = features.content_template.unwrap();
        assert_eq!(template.leading_nodes.len(), 1);
        assert_eq!(template.trailing_nodes.len(), 1);
    }

    #[test]
    fn test_margins_extracted() {
        let body = format!(
            "{}<w:sectPr><w:pgMar w:top=\"2098\" w:bottom=\"1984\" w:left=\"1531\" w:right=\"1417\"/></w:sectPr>",
            styled_para("经研究，现将有关事项通知如下，请抓好落实。", "仿宋_GB2312", 32)
        );
        let features = extract_docx_features(&build_docx_package(&body, "")).unwrap();
        let margins = features.page.unwrap().margins_cm;
        assert!((margins.top - 3.7).abs() < 0.01);
        assert!((margins.bottom - 3.5).abs() < 0.01);
    }
}
