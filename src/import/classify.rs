//! Heading-level classification heuristics.
//!
//! Pure pattern-matching functions, independent of any document-library
//! object model: first the textual numbering markers, then the dominant run
//! font as a fallback.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::HeadingLevel;

/// 一、 二、 十二、 …
static RE_H1: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十百千]+、").expect("H1 marker regex"));
/// （一） （二） …
static RE_H2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^（[一二三四五六七八九十百千]+）").expect("H2 marker regex"));
/// 1. 2. …
static RE_H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").expect("H3 marker regex"));
/// （1） （2） …
static RE_H4: Lazy<Regex> = Lazy::new(|| Regex::new(r"^（\d+）").expect("H4 marker regex"));

/// Classify a heading level from the leading numbering marker alone.
pub fn marker_level(text: &str) -> Option<HeadingLevel> {
    if RE_H1.is_match(text) {
        Some(HeadingLevel::H1)
    } else if RE_H2.is_match(text) {
        Some(HeadingLevel::H2)
    } else if RE_H3.is_match(text) {
        Some(HeadingLevel::H3)
    } else if RE_H4.is_match(text) {
        Some(HeadingLevel::H4)
    } else {
        None
    }
}

/// The numbering marker itself (`一、`, `（二）`, `3.`, `（4）`), when the
/// text carries one for the given level.
pub fn marker_prefix(level: HeadingLevel, text: &str) -> Option<&str> {
    let re = match level {
        HeadingLevel::H1 => &RE_H1,
        HeadingLevel::H2 => &RE_H2,
        HeadingLevel::H3 => &RE_H3,
        HeadingLevel::H4 => &RE_H4,
    };
    re.find(text).map(|m| &text[..m.end()])
}

/// Short-title shape: 4–24 chars and no trailing full stop. Used both for
/// the 仿宋-font fallback and for counting unrecognized title candidates.
pub fn looks_like_title_candidate(text: &str) -> bool {
    let len = text.chars().count();
    (4..=24).contains(&len) && !text.ends_with('。')
}

/// Classify a heading level for an imported paragraph: numbering markers
/// first, then the dominant run font (黑体 → H1, 楷体 → H2, 仿宋 with a
/// short-title shape → H3).
pub fn detect_heading_level(text: &str, dominant_font: Option<&str>) -> Option<HeadingLevel> {
    if let Some(level) = marker_level(text) {
        return Some(level);
    }

    let font = dominant_font.unwrap_or("");
    if font.contains("黑体") {
        Some(HeadingLevel::H1)
    } else if font.contains("楷体") {
        Some(HeadingLevel::H2)
    } else if font.contains("仿宋") && looks_like_title_candidate(text) {
        Some(HeadingLevel::H3)
    } else {
        None
    }
}

/// Classify a heading level from a native paragraph style name
/// (`Heading N` / `标题 N`), used by the feature extractor before falling
/// back to [`marker_level`].
pub fn style_name_level(style_name: &str) -> Option<HeadingLevel> {
    let name = style_name.trim();
    let suffix = name
        .strip_prefix("Heading ")
        .or_else(|| name.strip_prefix("heading "))
        .or_else(|| name.strip_prefix("标题 "))
        .or_else(|| name.strip_prefix("标题"))?;
    let depth: u8 = suffix.trim().parse().ok()?;
    HeadingLevel::try_from(depth).ok()
}
