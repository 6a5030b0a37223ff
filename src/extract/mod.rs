//! Style feature extraction from sample files (DOCX or PDF).
//!
//! One sample in, one [`Features`] out: per-role style summaries (each the
//! per-file statistical mode over paragraph samples), page margins, and —
//! for DOCX samples — an extracted content template. The rule aggregator
//! then merges `Features` across samples.

mod docx;
mod pdf;
pub(crate) mod template;

pub use docx::extract_docx_features;
pub use pdf::extract_pdf_features;

use serde::{Deserialize, Serialize};

use crate::detect::{detect_format_from_bytes, SampleFormat};
use crate::error::Result;
use crate::infer::mode::{mode_of, round2};
use crate::model::{ContentTemplate, HeadingRules, PageRules, StyleAttrs};

/// Style evidence extracted from one sample file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    pub body: StyleAttrs,
    pub headings: HeadingRules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_template: Option<ContentTemplate>,
}

/// Extract features from sample bytes, detecting DOCX vs PDF from the
/// header when `format` is not given.
pub fn extract_features(data: &[u8], format: Option<SampleFormat>) -> Result<Features> {
    let format = match format {
        Some(format) => format,
        None => detect_format_from_bytes(data)?,
    };
    match format {
        SampleFormat::Docx => extract_docx_features(data),
        SampleFormat::Pdf => extract_pdf_features(data),
    }
}

/// Per-file summary: the most frequent value of each captured field across
/// one sample's paragraphs, ties broken by first encounter. Numbers are
/// rounded to two decimals before comparison.
pub(crate) fn summarize_samples(samples: &[StyleAttrs]) -> StyleAttrs {
    fn mode_num(values: Vec<f64>) -> Option<f64> {
        let normalized: Vec<i64> = values
            .into_iter()
            .map(|v| (round2(v) * 100.0).round() as i64)
            .collect();
        mode_of(&normalized).map(|(v, _)| v as f64 / 100.0)
    }

    fn collect<T, F: Fn(&StyleAttrs) -> Option<T>>(samples: &[StyleAttrs], f: F) -> Vec<T> {
        samples.iter().filter_map(f).collect()
    }

    let mut summary = StyleAttrs::default();
    summary.font_family = mode_of(&collect(samples, |s| s.font_family.clone())).map(|(v, _)| v);
    summary.font_size_pt = mode_num(collect(samples, |s| s.font_size_pt));
    summary.bold = mode_of(&collect(samples, |s| s.bold)).map(|(v, _)| v);
    summary.color_hex = mode_of(&collect(samples, |s| s.color_hex.clone())).map(|(v, _)| v);
    summary.line_spacing_pt = mode_num(collect(samples, |s| s.line_spacing_pt));
    summary.space_before_pt = mode_num(collect(samples, |s| s.space_before_pt));
    summary.space_after_pt = mode_num(collect(samples, |s| s.space_after_pt));
    summary.first_line_indent_pt = mode_num(collect(samples, |s| s.first_line_indent_pt));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_takes_per_field_mode() {
        let mk = |font: &str, size: f64| StyleAttrs {
            font_family: Some(font.to_string()),
            font_size_pt: Some(size),
            ..Default::default()
        };
        let samples = vec![
            mk("仿宋_GB2312", 16.0),
            mk("仿宋_GB2312", 16.004), // rounds into the same bucket
            mk("黑体", 22.0),
        ];
        let summary = summarize_samples(&samples);
        assert_eq!(summary.font_family.as_deref(), Some("仿宋_GB2312"));
        assert_eq!(summary.font_size_pt, Some(16.0));
        assert_eq!(summary.bold, None);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let summary = summarize_samples(&[StyleAttrs::default(), StyleAttrs::default()]);
        assert!(summary.is_empty());
    }
}
