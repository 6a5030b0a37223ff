//! Letterhead geometry validation.
//!
//! Gates template publication: errors block publish, warnings do not.

use serde::{Deserialize, Serialize};

use crate::model::{AnchorSide, Binding, ElementKind, LetterheadTemplate};

/// Bottom of the zone reserved for letterhead content, in cm from the top
/// edge. Body text begins below this line.
pub const SAFE_TOP_CM: f64 = 3.7;
/// Margin kept clear inside the safe zone.
pub const SAFE_BUFFER_CM: f64 = 0.2;

/// Outcome of validating one letterhead template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Conditions that block publication.
    pub errors: Vec<String>,
    /// Advisory findings; publication may proceed.
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    /// Whether publication may proceed.
    pub fn passes(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check every enabled element of a letterhead template against the page
/// safe zone and the structural conventions of a red-head header.
pub fn validate_letterhead(template: &LetterheadTemplate) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    let mut unit_name_count = 0usize;
    let mut doc_no_y: Option<f64> = None;
    let mut signatory_y: Option<f64> = None;

    for element in template.enabled_elements() {
        let y_cm = element.y_cm;

        if !(0.0..SAFE_TOP_CM).contains(&y_cm) {
            outcome.errors.push(format!(
                "元素 {} 的 yCm={} 超出允许范围 [0, 3.7)。",
                element.id, y_cm
            ));
            continue;
        }

        if element.kind == ElementKind::Text {
            match element.bind {
                Binding::UnitName => {
                    unit_name_count += 1;
                    if element.x.anchor != AnchorSide::Center {
                        outcome
                            .warnings
                            .push("unitName 建议使用 center 锚点。".to_string());
                    }
                }
                Binding::DocNo => doc_no_y = Some(y_cm),
                Binding::Signatory => signatory_y = Some(y_cm),
                _ => {}
            }
        }

        // A zero-footprint element (a hairline of zero thickness) only has
        // to sit inside the y range; the buffered check applies to ink.
        let estimated = element.estimated_height_cm();
        if estimated > 0.0 && y_cm + estimated > SAFE_TOP_CM - SAFE_BUFFER_CM {
            let label = match element.kind {
                ElementKind::Text => "元素",
                ElementKind::Line => "线条",
            };
            outcome.errors.push(format!(
                "{} {} 超出顶部安全区：yCm({}) + estimatedHeightCm({:.3}) > {}。",
                label,
                element.id,
                y_cm,
                estimated,
                SAFE_TOP_CM - SAFE_BUFFER_CM
            ));
        }
    }

    if unit_name_count == 0 {
        outcome
            .errors
            .push("必须至少包含一个 bind=unitName 的文本元素。".to_string());
    } else if unit_name_count > 1 {
        outcome
            .warnings
            .push("存在多个 bind=unitName 的文本元素，建议仅保留一个。".to_string());
    }

    // docNo and signatory are expected to share one rendered line via tab
    // alignment; a y mismatch breaks that row.
    if let (Some(doc_no), Some(signatory)) = (doc_no_y, signatory_y) {
        let diff = (doc_no - signatory).abs();
        if diff > 0.05 {
            outcome.warnings.push(format!(
                "docNo 与 signatory 的 yCm 差值为 {diff:.3}cm，建议 <= 0.05cm。"
            ));
        }
    }

    outcome
}
