//! Rule-set revision: patch merging and the deterministic
//! instruction-to-patch heuristic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::model::{AgentRevision, StyleRules};

/// Common official-document fonts and their colloquial aliases, longest
/// alias first so 仿宋_GB2312 wins over 仿宋.
static FONT_ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut aliases = vec![
        ("方正小标宋简", "方正小标宋简"),
        ("方正小标宋", "方正小标宋简"),
        ("小标宋", "方正小标宋简"),
        ("仿宋_GB2312", "仿宋_GB2312"),
        ("仿宋", "仿宋_GB2312"),
        ("楷体_GB2312", "楷体_GB2312"),
        ("楷体", "楷体_GB2312"),
        ("黑体", "黑体"),
        ("宋体", "宋体"),
    ];
    aliases.sort_by_key(|(raw, _)| std::cmp::Reverse(raw.chars().count()));
    aliases
});

/// Object of 改为/设为/使用-style verbs, the font candidate when no alias
/// matched directly.
static FONT_VERB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:改为|改成|设为|设置为|调整为|变为|使用|用|字体为|为)\s*([A-Za-z0-9_\-\u{4e00}-\u{9fa5}]+)",
    )
    .expect("font verb regex")
});

/// Trailing words that are not part of a font name.
static FONT_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(并|且|保持|不变|不改|不调整|\s)").expect("font tail regex"));

/// Sentence separators splitting an instruction into segments.
static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[，,。；;\n]+").expect("segment regex"));

static LEVEL_RES: Lazy<[(Regex, &'static str); 4]> = Lazy::new(|| {
    [
        (Regex::new(r"(一级标题|1级标题|1\s*级\s*标题|一\s*级\s*标题)").unwrap(), "level1"),
        (Regex::new(r"(二级标题|2级标题|2\s*级\s*标题|二\s*级\s*标题)").unwrap(), "level2"),
        (Regex::new(r"(三级标题|3级标题|3\s*级\s*标题|三\s*级\s*标题)").unwrap(), "level3"),
        (Regex::new(r"(四级标题|4级标题|4\s*级\s*标题|四\s*级\s*标题)").unwrap(), "level4"),
    ]
});

/// Recursive patch merge: where both sides hold a map the merge recurses,
/// anywhere else the patch value replaces the target wholesale. Returns a
/// new tree; neither input is mutated.
pub fn merge_patch(target: &Value, patch: &Value) -> Value {
    match (target, patch) {
        (Value::Object(t), Value::Object(p)) => {
            let mut out = t.clone();
            for (key, value) in p {
                let merged = match out.get(key) {
                    Some(existing) => merge_patch(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::Object(out)
        }
        _ => patch.clone(),
    }
}

/// Extract a font name from one instruction segment: alias table first,
/// then the object of a rewrite verb.
fn extract_font_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    for (raw, canonical) in FONT_ALIASES.iter() {
        if text.contains(raw) {
            return Some((*canonical).to_string());
        }
    }

    let captured = FONT_VERB_RE.captures(text)?;
    let candidate = FONT_TAIL_RE
        .split(captured.get(1)?.as_str())
        .next()
        .unwrap_or("")
        .trim();
    if candidate.is_empty() {
        return None;
    }
    for (raw, canonical) in FONT_ALIASES.iter() {
        if *raw == candidate {
            return Some((*canonical).to_string());
        }
    }
    Some(candidate.to_string())
}

/// Resolve which styles one segment targets: `body`, specific heading
/// levels, bare 标题 (all four levels), or 全文 (everything).
fn detect_font_targets(text: &str) -> Vec<&'static str> {
    let mut targets: Vec<&'static str> = Vec::new();
    if text.is_empty() {
        return targets;
    }

    for (re, key) in LEVEL_RES.iter() {
        if re.is_match(text) {
            targets.push(*key);
        }
    }
    if text.contains("正文") {
        targets.push("body");
    }
    if text.contains("标题") && !targets.iter().any(|t| t.starts_with("level")) {
        targets.extend(["level1", "level2", "level3", "level4"]);
    }
    if text.contains("全文") {
        for key in ["body", "level1", "level2", "level3", "level4"] {
            if !targets.contains(&key) {
                targets.push(key);
            }
        }
    }
    targets
}

/// Deterministic instruction-to-patch heuristic: split the instruction into
/// segments, pair each segment's font with its targets, and build a nested
/// `fontFamily` patch. When no segment resolves a pair, a font found
/// anywhere in the instruction falls back to `body` alone.
pub fn patch_from_instruction(instruction: &str) -> Value {
    let mut patch = Map::new();

    for segment in SEGMENT_RE.split(instruction).map(str::trim) {
        if segment.is_empty() {
            continue;
        }
        let Some(font) = extract_font_name(segment) else {
            continue;
        };
        let targets = detect_font_targets(segment);
        if targets.is_empty() {
            continue;
        }

        for target in targets {
            if target == "body" {
                let body = patch
                    .entry("body")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(body) = body {
                    body.insert("fontFamily".to_string(), Value::String(font.clone()));
                }
            } else {
                let headings = patch
                    .entry("headings")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(headings) = headings {
                    let level = headings
                        .entry(target)
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(level) = level {
                        level.insert("fontFamily".to_string(), Value::String(font.clone()));
                    }
                }
            }
        }
    }

    if !patch.is_empty() {
        return Value::Object(patch);
    }

    match extract_font_name(instruction) {
        Some(font) => json!({ "body": { "fontFamily": font } }),
        None => Value::Object(Map::new()),
    }
}

fn non_empty_object(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
}

/// Compose the effective patch for one revision round.
///
/// With an agent result the agent's patch is the base, the instruction
/// heuristic merges on top, and an explicit caller patch merges last —
/// later merges win on overlapping leaves. Without an agent result an
/// explicit patch is used as-is, and failing that the heuristic alone.
pub fn revision_patch(
    instruction: &str,
    explicit: Option<&Value>,
    agent: Option<&AgentRevision>,
) -> Value {
    let instruction_patch = patch_from_instruction(instruction);

    match agent {
        Some(agent) => {
            let mut patch = if agent.patch.is_object() {
                agent.patch.clone()
            } else {
                Value::Object(Map::new())
            };
            if non_empty_object(Some(&instruction_patch)).is_some() {
                patch = merge_patch(&patch, &instruction_patch);
            }
            if let Some(explicit) = non_empty_object(explicit) {
                patch = merge_patch(&patch, explicit);
            }
            patch
        }
        None => match non_empty_object(explicit) {
            Some(explicit) => explicit.clone(),
            None => instruction_patch,
        },
    }
}

/// Apply one revision round to a rule set, producing the next version. The
/// previous rule set is never mutated.
pub fn revise_rules(
    previous: &StyleRules,
    instruction: &str,
    explicit: Option<&Value>,
    agent: Option<&AgentRevision>,
) -> Result<StyleRules> {
    let patch = revision_patch(instruction, explicit, agent);
    let next = merge_patch(&previous.to_value(), &patch);
    StyleRules::from_value(&next)
}
