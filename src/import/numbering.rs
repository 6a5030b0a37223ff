//! Heading numbering audit.

use crate::import::classify::marker_prefix;
use crate::model::HeadingLevel;
use crate::text::zh_numeral_to_int;

/// Parse the numeral out of a heading's marker: Chinese numerals for
/// H1/H2, Arabic for H3/H4.
fn marker_number(level: HeadingLevel, text: &str) -> Option<u32> {
    let prefix = marker_prefix(level, text)?;
    match level {
        HeadingLevel::H1 => Some(zh_numeral_to_int(prefix.trim_end_matches('、'))),
        HeadingLevel::H2 => Some(zh_numeral_to_int(
            prefix.trim_start_matches('（').trim_end_matches('）'),
        )),
        HeadingLevel::H3 => prefix.trim_end_matches('.').parse().ok(),
        HeadingLevel::H4 => prefix
            .trim_start_matches('（')
            .trim_end_matches('）')
            .parse()
            .ok(),
    }
}

/// Walk the detected headings in document order and report numbering gaps
/// and mixed-up sequences.
///
/// Four independent counters are kept, one per level; entering a shallower
/// level resets all deeper counters. A heading whose parsed numeral differs
/// from its counter produces one warning carrying the 1-based heading index
/// and the level. Warnings never abort an import.
pub fn audit_numbering(headings: &[(HeadingLevel, String)]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut counters = [0u32; 4];

    for (i, (level, text)) in headings.iter().enumerate() {
        let idx = (level.depth() - 1) as usize;
        for deeper in counters.iter_mut().skip(idx + 1) {
            *deeper = 0;
        }
        counters[idx] += 1;

        if let Some(actual) = marker_number(*level, text) {
            let expected = counters[idx];
            if actual != expected {
                warnings.push(format!(
                    "第{}个标题编号疑似跳号/混用：层级 H{} 当前 {}，期望 {}",
                    i + 1,
                    level.depth(),
                    actual,
                    expected
                ));
            }
        }
    }

    warnings
}
