//! Aggregation and revision properties.

use hongtou::{
    infer_rules, merge_patch, revise_rules, AgentRevision, Error, Features, StyleAttrs,
    StyleRules,
};
use serde_json::json;

fn sample(font: &str, size: f64) -> Features {
    Features {
        body: StyleAttrs {
            font_family: Some(font.to_string()),
            font_size_pt: Some(size),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn mode_value_appears_at_least_confidence_times() {
    let samples = vec![
        sample("仿宋_GB2312", 16.0),
        sample("仿宋_GB2312", 16.0),
        sample("宋体", 14.0),
        sample("仿宋_GB2312", 15.0),
    ];
    let (rules, report) = infer_rules(&samples).expect("infer");

    let field = &report["body.fontFamily"];
    assert!(field.confidence > 0.0 && field.confidence <= 1.0);
    let chosen = rules.body.font_family.as_deref().expect("font chosen");
    let occurrences = samples
        .iter()
        .filter(|s| s.body.font_family.as_deref() == Some(chosen))
        .count() as f64;
    assert!(occurrences >= field.confidence * field.samples as f64 - 1e-9);
}

#[test]
fn two_to_one_majority_is_two_thirds_regardless_of_order() {
    let a = sample("仿宋_GB2312", 16.0);
    let b = sample("宋体", 14.0);

    let orders = [
        vec![a.clone(), a.clone(), b.clone()],
        vec![a.clone(), b.clone(), a.clone()],
        vec![b.clone(), a.clone(), a.clone()],
    ];
    for order in orders {
        let (rules, report) = infer_rules(&order).expect("infer");
        assert_eq!(rules.body.font_family.as_deref(), Some("仿宋_GB2312"));
        assert!((report["body.fontFamily"].confidence - 2.0 / 3.0).abs() < 1e-3);
    }
}

#[test]
fn empty_sample_set_is_rejected() {
    assert!(matches!(infer_rules(&[]), Err(Error::EmptySampleSet)));
}

#[test]
fn merge_patch_contract() {
    assert_eq!(
        merge_patch(&json!({"a": {"b": 1, "c": 2}}), &json!({"a": {"b": 9}})),
        json!({"a": {"b": 9, "c": 2}})
    );
    assert_eq!(
        merge_patch(&json!({"a": 1}), &json!({"a": {"b": 1}})),
        json!({"a": {"b": 1}})
    );
}

#[test]
fn bracket_normalization_is_idempotent() {
    use hongtou::text::normalize_doc_no_brackets;

    for input in ["(2026)", "（2026）", "〔2026〕"] {
        assert_eq!(normalize_doc_no_brackets(input), "〔2026〕");
    }
    let once = normalize_doc_no_brackets("X文(2026)3号");
    assert_eq!(normalize_doc_no_brackets(&once), once);
}

#[test]
fn revision_layers_agent_instruction_and_explicit_patches() {
    let mut previous = StyleRules::default();
    previous.body.font_family = Some("仿宋_GB2312".to_string());
    previous.body.font_size_pt = Some(16.0);

    let agent = AgentRevision {
        patch: json!({"body": {"fontFamily": "宋体", "lineSpacingPt": 30}}),
        assistant_reply: "已按要求调整。".to_string(),
        summary: "正文字体调整".to_string(),
    };
    let explicit = json!({"body": {"fontSizePt": 14}});

    let next = revise_rules(&previous, "正文改为黑体", Some(&explicit), Some(&agent))
        .expect("revise");

    // Instruction overrides the agent's font; explicit patch wins the size;
    // the agent's untouched leaf survives; unrelated fields persist.
    assert_eq!(next.body.font_family.as_deref(), Some("黑体"));
    assert_eq!(next.body.font_size_pt, Some(14.0));
    assert_eq!(next.body.line_spacing_pt, Some(30.0));

    // The previous version is untouched.
    assert_eq!(previous.body.font_family.as_deref(), Some("仿宋_GB2312"));
}
