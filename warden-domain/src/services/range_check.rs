// Range-mode rule check.
//
// Reads one numeric attribute out of an event payload and compares it to the
// rule's configured normal range. A non-numeric or missing attribute is a
// silent non-match, never an error. Exceeding `max` alone raises an alert;
// exceeding the secondary `threshold` escalates to a cheat violation.

use crate::entities::Rule;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeCheck {
    NoMatch,
    /// Above the normal range but within the hard threshold.
    Alert { value: f64, max: f64 },
    /// Past the hard threshold.
    Violation { value: f64, max: f64, threshold: f64 },
}

pub fn check_payload_range(rule: &Rule, payload: Option<&serde_json::Value>) -> RangeCheck {
    let Some(value) = payload
        .and_then(|p| p.get(&rule.action))
        .and_then(serde_json::Value::as_f64)
    else {
        return RangeCheck::NoMatch;
    };
    let Some(normal) = rule.normal_for_action() else {
        return RangeCheck::NoMatch;
    };
    let Some(max) = normal.max else {
        return RangeCheck::NoMatch;
    };
    if value <= max {
        return RangeCheck::NoMatch;
    }
    // A missing secondary threshold makes `max` the hard limit.
    let threshold = normal.threshold.unwrap_or(max);
    if value > threshold {
        RangeCheck::Violation {
            value,
            max,
            threshold,
        }
    } else {
        RangeCheck::Alert { value, max }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::entities::NormalRange;
    use crate::value_objects::{RuleId, Severity};

    fn speed_rule(max: Option<f64>, threshold: Option<f64>) -> Rule {
        let now = Utc::now();
        let mut normals = HashMap::new();
        normals.insert(
            "speed".to_string(),
            NormalRange {
                min: Some(0.0),
                max,
                threshold,
            },
        );
        Rule {
            id: RuleId::new(),
            name: "speed-check".to_string(),
            game_id: Some("racer".to_string()),
            description: None,
            action: "speed".to_string(),
            threshold: 1,
            window_seconds: 60,
            normals,
            severity: Severity::Medium,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn within_normal_range_does_not_match() {
        let rule = speed_rule(Some(100.0), Some(150.0));
        let payload = json!({"speed": 80.0});
        assert_eq!(check_payload_range(&rule, Some(&payload)), RangeCheck::NoMatch);
    }

    #[test]
    fn above_max_within_threshold_is_alert() {
        let rule = speed_rule(Some(100.0), Some(150.0));
        let payload = json!({"speed": 120.0});
        assert_eq!(
            check_payload_range(&rule, Some(&payload)),
            RangeCheck::Alert {
                value: 120.0,
                max: 100.0
            }
        );
    }

    #[test]
    fn above_threshold_is_violation() {
        let rule = speed_rule(Some(100.0), Some(150.0));
        let payload = json!({"speed": 200.0});
        assert_eq!(
            check_payload_range(&rule, Some(&payload)),
            RangeCheck::Violation {
                value: 200.0,
                max: 100.0,
                threshold: 150.0
            }
        );
    }

    #[test]
    fn missing_threshold_makes_max_the_hard_limit() {
        let rule = speed_rule(Some(100.0), None);
        let payload = json!({"speed": 101.0});
        assert!(matches!(
            check_payload_range(&rule, Some(&payload)),
            RangeCheck::Violation { .. }
        ));
    }

    #[test]
    fn non_numeric_attribute_is_a_silent_non_match() {
        let rule = speed_rule(Some(100.0), Some(150.0));
        let payload = json!({"speed": "fast"});
        assert_eq!(check_payload_range(&rule, Some(&payload)), RangeCheck::NoMatch);
        assert_eq!(check_payload_range(&rule, None), RangeCheck::NoMatch);
    }

    #[test]
    fn attribute_without_configured_range_does_not_match() {
        let mut rule = speed_rule(Some(100.0), Some(150.0));
        rule.normals.clear();
        let payload = json!({"speed": 500.0});
        assert_eq!(check_payload_range(&rule, Some(&payload)), RangeCheck::NoMatch);
    }
}
