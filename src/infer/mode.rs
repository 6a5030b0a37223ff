//! Statistical mode over a closed set of comparable value kinds.

use serde_json::Value;

/// Round to two decimal places; applied to every numeric sample before
/// comparison so float noise cannot split a mode.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A comparable rule value: string, number (normalized to 2 decimals and
/// held in hundredths so it hashes), or boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleValue {
    Str(String),
    /// Hundredths of the rounded numeric value.
    Num(i64),
    Bool(bool),
}

impl RuleValue {
    /// Read a leaf from a JSON tree; objects, arrays, and nulls carry no
    /// aggregatable value.
    pub fn from_json(value: &Value) -> Option<RuleValue> {
        match value {
            Value::String(s) => Some(RuleValue::Str(s.clone())),
            Value::Number(n) => n.as_f64().map(|f| RuleValue::Num((round2(f) * 100.0).round() as i64)),
            Value::Bool(b) => Some(RuleValue::Bool(*b)),
            _ => None,
        }
    }

    /// Back to JSON, rendering whole numbers without a fraction.
    pub fn to_json(&self) -> Value {
        match self {
            RuleValue::Str(s) => Value::String(s.clone()),
            RuleValue::Num(hundredths) => {
                if hundredths % 100 == 0 {
                    Value::from(hundredths / 100)
                } else {
                    Value::from(*hundredths as f64 / 100.0)
                }
            }
            RuleValue::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Most frequent value with its count, ties broken by first encounter.
/// Returns `None` for an empty slice.
pub(crate) fn mode_of<T: PartialEq + Clone>(values: &[T]) -> Option<(T, usize)> {
    let mut best: Option<(usize, usize)> = None; // (first index, count)
    for (i, candidate) in values.iter().enumerate() {
        if values[..i].contains(candidate) {
            continue; // counted when first seen
        }
        let count = values.iter().filter(|v| *v == candidate).count();
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((i, count)),
        }
    }
    best.map(|(i, count)| (values[i].clone(), count))
}

/// Mode plus its share of the present values: `(value, confidence, present)`.
pub fn mode_with_confidence(values: &[RuleValue]) -> Option<(RuleValue, f64, usize)> {
    let (value, count) = mode_of(values)?;
    let present = values.len();
    Some((value, count as f64 / present as f64, present))
}
