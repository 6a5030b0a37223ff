//! Rule aggregation: many per-sample feature sets → one rule set with a
//! confidence report.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::extract::Features;
use crate::model::{ConfidenceReport, ContentTemplate, FieldConfidence, StyleRules};

use super::compose::normalize_trailing_block;
use super::mode::{mode_of, mode_with_confidence, RuleValue};

/// The fixed set of aggregated field paths. A path with no present value in
/// any sample is omitted from the rule tree entirely rather than defaulted.
pub const RULE_PATHS: &[&str] = &[
    "body.fontFamily",
    "body.fontSizePt",
    "body.bold",
    "body.colorHex",
    "body.lineSpacingPt",
    "body.spaceBeforePt",
    "body.spaceAfterPt",
    "body.firstLineIndentPt",
    "page.marginsCm.top",
    "page.marginsCm.bottom",
    "page.marginsCm.left",
    "page.marginsCm.right",
    "headings.level1.fontFamily",
    "headings.level1.fontSizePt",
    "headings.level1.bold",
    "headings.level2.fontFamily",
    "headings.level2.fontSizePt",
    "headings.level2.bold",
    "headings.level3.fontFamily",
    "headings.level3.fontSizePt",
    "headings.level3.bold",
    "headings.level4.fontFamily",
    "headings.level4.fontSizePt",
    "headings.level4.bold",
];

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn read_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cursor = value;
    for part in path.split('.') {
        cursor = cursor.as_object()?.get(part)?;
    }
    Some(cursor)
}

fn insert_path(map: &mut Map<String, Value>, path: &str, leaf: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), leaf);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, leaf);
            }
        }
    }
}

/// Merge feature sets from N samples into one rule set.
///
/// Per path: collect the value from every sample where it is present, take
/// the statistical mode (ties to the first-encountered value in sample
/// order), and record `modeCount / presentCount` as confidence. Sample
/// order cannot affect the result except through that documented tie-break.
///
/// An empty sample list is an input error, never an empty rule set.
pub fn infer_rules(samples: &[Features]) -> Result<(StyleRules, ConfidenceReport)> {
    if samples.is_empty() {
        return Err(Error::EmptySampleSet);
    }

    let sample_values: Vec<Value> = samples
        .iter()
        .map(|f| serde_json::to_value(f).unwrap_or(Value::Null))
        .collect();

    let mut tree = Map::new();
    let mut report = ConfidenceReport::new();

    for path in RULE_PATHS {
        let values: Vec<RuleValue> = sample_values
            .iter()
            .filter_map(|sample| read_path(sample, path))
            .filter_map(RuleValue::from_json)
            .collect();

        let Some((value, confidence, present)) = mode_with_confidence(&values) else {
            continue;
        };
        report.insert(
            (*path).to_string(),
            FieldConfidence {
                confidence: round4(confidence),
                samples: present,
            },
        );
        insert_path(&mut tree, path, value.to_json());
    }

    let mut rules = StyleRules::from_value(&Value::Object(tree))?;
    select_content_template(samples, &mut rules, &mut report);

    Ok((rules, report))
}

/// Pick the most frequent content template by canonical serialization, then
/// re-style its trailing suffix block with the final body typography.
fn select_content_template(
    samples: &[Features],
    rules: &mut StyleRules,
    report: &mut ConfidenceReport,
) {
    let templates: Vec<&ContentTemplate> = samples
        .iter()
        .filter_map(|f| f.content_template.as_ref())
        .collect();
    if templates.is_empty() {
        return;
    }

    let keys: Vec<String> = templates
        .iter()
        .map(|t| serde_json::to_string(t).unwrap_or_default())
        .collect();
    let Some((key, count)) = mode_of(&keys) else {
        return;
    };
    let Some(pos) = keys.iter().position(|k| *k == key) else {
        return;
    };

    let mut chosen = templates[pos].clone();
    normalize_trailing_block(&mut chosen.trailing_nodes, &rules.body);
    rules.content_template = Some(chosen);
    report.insert(
        "contentTemplate".to_string(),
        FieldConfidence {
            confidence: round4(count as f64 / keys.len() as f64),
            samples: keys.len(),
        },
    );
}
