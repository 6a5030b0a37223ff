//! Text heuristics shared across import, inference, and rendering.
//!
//! Everything here is a pure function over `&str`: marker classification,
//! document-number bracket normalization, CJK numeral conversion, and the
//! Chinese sign-off date format.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing suffix-block role markers: 主持/参加/列席/出席/记录/发送/主送/
/// 抄送/分送 (with common person/list variants), followed by a colon.
/// Whitespace is tolerated inside the label because the 2-char labels are
/// conventionally letter-spaced (e.g. "主 持：").
static SUFFIX_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(主\s*持(?:\s*人|\s*者)?|参\s*(?:加|会)(?:\s*人|\s*人员|\s*名单)?|列\s*席(?:\s*人|\s*人员)?|出\s*席(?:\s*人|\s*人员)?|记\s*录(?:\s*人|\s*员)?|发\s*(?:送|至|文)|主\s*送|抄\s*送|分\s*送)\s*[：:]",
    )
    .expect("suffix marker regex")
});

/// Dispatch line (发送/发至/发文) inside a trailing block; rendered between
/// red dividers.
static DISPATCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^发\s*(?:送|至|文)\s*[：:]").expect("dispatch regex"));

/// Signer line (签发人) inside a leading block; a red divider follows it.
static SIGNER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^签\s*发\s*人\s*[：:]").expect("signer regex"));

static HALF_BRACKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([0-9]{2,4})\)").expect("half bracket regex"));
static FULL_BRACKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"（([0-9]{2,4})）").expect("full bracket regex"));

static SUBSET_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{6}\+").expect("subset prefix regex"));

/// Check whether a line starts with a suffix-block role marker.
pub fn is_suffix_marker(text: &str) -> bool {
    SUFFIX_MARKER_RE.is_match(text)
}

/// Split a suffix-block line into its role label (colon included) and the
/// remainder. Returns `None` when the line does not start with a marker.
pub fn split_suffix_marker(text: &str) -> Option<(&str, &str)> {
    let m = SUFFIX_MARKER_RE.find(text)?;
    Some((&text[..m.end()], &text[m.end()..]))
}

/// Check whether a line is a dispatch (发送/发至/发文) line.
pub fn is_dispatch_line(text: &str) -> bool {
    DISPATCH_RE.is_match(text)
}

/// Check whether a line is a signer (签发人) line.
pub fn is_signer_line(text: &str) -> bool {
    SIGNER_RE.is_match(text)
}

/// Normalize document-number brackets: half- or full-width parentheses
/// around a 2–4 digit run become the lenticular brackets 〔〕.
///
/// Idempotent: an already-normalized number passes through unchanged.
pub fn normalize_doc_no_brackets(text: &str) -> String {
    let pass = HALF_BRACKET_RE.replace_all(text, "〔$1〕");
    FULL_BRACKET_RE.replace_all(&pass, "〔$1〕").into_owned()
}

/// Convert a Chinese numeral (一..九十九 territory) to an integer.
///
/// Returns 0 for anything it cannot read, which the numbering audit then
/// reports as a mismatch.
pub fn zh_numeral_to_int(zh: &str) -> u32 {
    fn digit(c: char) -> u32 {
        match c {
            '一' => 1,
            '二' => 2,
            '三' => 3,
            '四' => 4,
            '五' => 5,
            '六' => 6,
            '七' => 7,
            '八' => 8,
            '九' => 9,
            '十' => 10,
            _ => 0,
        }
    }

    let chars: Vec<char> = zh.chars().collect();
    match chars.as_slice() {
        ['十'] => 10,
        ['十', rest @ ..] => 10 + rest.first().map(|c| digit(*c)).unwrap_or(0),
        [c] => digit(*c),
        _ => {
            if let Some(pos) = chars.iter().position(|c| *c == '十') {
                let tens = chars[..pos].first().map(|c| digit(*c)).unwrap_or(0);
                let ones = chars[pos + 1..].first().map(|c| digit(*c)).unwrap_or(0);
                tens * 10 + ones
            } else {
                0
            }
        }
    }
}

/// Render an integer as a Chinese numeral (1..=99).
pub fn int_to_zh_numeral(num: u32) -> String {
    const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    match num {
        1..=9 => DIGITS[num as usize].to_string(),
        10 => "十".to_string(),
        11..=19 => format!("十{}", DIGITS[(num - 10) as usize]),
        20..=99 => {
            let tens = (num / 10) as usize;
            let ones = (num % 10) as usize;
            let mut out = format!("{}十", DIGITS[tens]);
            if ones > 0 {
                out.push_str(DIGITS[ones]);
            }
            out
        }
        _ => num.to_string(),
    }
}

/// Format an ISO `YYYY-MM-DD` date as 年/月/日; any other input passes
/// through unchanged.
pub fn format_zh_date(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    match chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => {
            use chrono::Datelike;
            format!("{}年{}月{}日", date.year(), date.month(), date.day())
        }
        Err(_) => value.to_string(),
    }
}

/// Strip the six-letter subset prefix (`ABCDEF+`) from a PDF `/BaseFont`
/// name.
pub fn strip_subset_prefix(font: &str) -> &str {
    match SUBSET_PREFIX_RE.find(font) {
        Some(m) => &font[m.end()..],
        None => font,
    }
}

/// Normalize a color to `#RRGGBB` upper-case, or `None` when the input is
/// not six hex digits.
pub fn normalize_color_hex(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{}", hex.to_ascii_uppercase()))
    } else {
        None
    }
}

/// Drop the file extension from an attachment name.
pub fn strip_file_ext(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_marker_detection() {
        assert!(is_suffix_marker("主持：张三"));
        assert!(is_suffix_marker("主 持：张三"));
        assert!(is_suffix_marker("参加人员:李四、王五"));
        assert!(is_suffix_marker("抄送：办公室"));
        assert!(!is_suffix_marker("关于某事项的请示"));
        assert!(!is_suffix_marker("会议主持得很好"));
    }

    #[test]
    fn test_split_suffix_marker() {
        let (label, rest) = split_suffix_marker("主 持：金刚善").unwrap();
        assert_eq!(label, "主 持：");
        assert_eq!(rest, "金刚善");
        assert!(split_suffix_marker("普通正文。").is_none());
    }

    #[test]
    fn test_bracket_normalization() {
        assert_eq!(normalize_doc_no_brackets("X文(2026)3号"), "X文〔2026〕3号");
        assert_eq!(normalize_doc_no_brackets("X文（2026）3号"), "X文〔2026〕3号");
        // Idempotent
        assert_eq!(normalize_doc_no_brackets("X文〔2026〕3号"), "X文〔2026〕3号");
        // Non-numeric parentheses untouched
        assert_eq!(normalize_doc_no_brackets("通知（试行）"), "通知（试行）");
    }

    #[test]
    fn test_zh_numerals() {
        assert_eq!(zh_numeral_to_int("一"), 1);
        assert_eq!(zh_numeral_to_int("九"), 9);
        assert_eq!(zh_numeral_to_int("十"), 10);
        assert_eq!(zh_numeral_to_int("十二"), 12);
        assert_eq!(zh_numeral_to_int("二十"), 20);
        assert_eq!(zh_numeral_to_int("二十一"), 21);
        assert_eq!(zh_numeral_to_int("千"), 0);

        assert_eq!(int_to_zh_numeral(1), "一");
        assert_eq!(int_to_zh_numeral(10), "十");
        assert_eq!(int_to_zh_numeral(12), "十二");
        assert_eq!(int_to_zh_numeral(21), "二十一");
    }

    #[test]
    fn test_zh_date() {
        assert_eq!(format_zh_date("2026-03-05"), "2026年3月5日");
        assert_eq!(format_zh_date("  "), "");
        assert_eq!(format_zh_date("2026/03/05"), "2026/03/05");
    }

    #[test]
    fn test_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+FangSong"), "FangSong");
        assert_eq!(strip_subset_prefix("FangSong"), "FangSong");
        assert_eq!(strip_subset_prefix("ABC+FangSong"), "ABC+FangSong");
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(normalize_color_hex("d40000").as_deref(), Some("#D40000"));
        assert_eq!(normalize_color_hex("#D40000").as_deref(), Some("#D40000"));
        assert_eq!(normalize_color_hex("red"), None);
    }

    #[test]
    fn test_strip_file_ext() {
        assert_eq!(strip_file_ext("情况说明.docx"), "情况说明");
        assert_eq!(strip_file_ext("附件"), "附件");
    }
}
