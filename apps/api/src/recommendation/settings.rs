//! Recommendation settings — built-in defaults plus a persisted JSON override.
//!
//! The override is merged field by field over a base configuration. Each field
//! is read independently: a missing, `null`, or non-numeric value keeps the base
//! value, and numeric values are clamped into their allowed range.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::recommendation::tier::Tier;

pub const DEFAULT_COUNT: usize = 3;
pub const MAX_COUNT: usize = 100;
pub const MAX_WEIGHT: f64 = 1000.0;
pub const MAX_RECENCY_WINDOW_DAYS: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierWeights {
    pub mega: f64,
    pub premium: f64,
    pub prime: f64,
    pub newspaper: f64,
    pub latest: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            mega: 2.0,
            premium: 1.0,
            prime: 0.0,
            newspaper: 0.0,
            latest: 0.0,
        }
    }
}

impl TierWeights {
    pub fn weight(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Mega => self.mega,
            Tier::Premium => self.premium,
            Tier::Prime => self.prime,
            Tier::Newspaper => self.newspaper,
            Tier::Latest => self.latest,
        }
    }

    fn slot_mut(&mut self, tier: Tier) -> &mut f64 {
        match tier {
            Tier::Mega => &mut self.mega,
            Tier::Premium => &mut self.premium,
            Tier::Prime => &mut self.prime,
            Tier::Newspaper => &mut self.newspaper,
            Tier::Latest => &mut self.latest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationWeights {
    /// Added once per job tag found in the user's skills.
    pub skill_tag: f64,
    /// Added once per title token found in the user's skills.
    pub title_token: f64,
    /// Flat bonus when the job's category matches a saved job's category.
    pub saved_category: f64,
    /// Recency bonus for a job posted today; also the decay window in days.
    pub recency_max_bonus: f64,
    pub tier: TierWeights,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        Self {
            skill_tag: 3.0,
            title_token: 2.0,
            saved_category: 2.0,
            recency_max_bonus: 6.0,
            tier: TierWeights::default(),
        }
    }
}

/// Effective recommendation configuration. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSettings {
    pub count: usize,
    pub weights: RecommendationWeights,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            weights: RecommendationWeights::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OverrideError {
    #[error("settings override is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings override must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl RecommendationSettings {
    /// Parses a raw override and merges it over `self`.
    pub fn merge_raw(&self, raw: &str) -> Result<Self, OverrideError> {
        let value: Value = serde_json::from_str(raw)?;
        self.merge_override(&value)
    }

    /// Merges a JSON override over `self`, field by field.
    pub fn merge_override(&self, value: &Value) -> Result<Self, OverrideError> {
        let obj = value
            .as_object()
            .ok_or_else(|| OverrideError::NotAnObject(json_kind(value)))?;

        let mut merged = self.clone();
        merged.count = count_field(obj, "count", self.count);

        match obj.get("weights") {
            None | Some(Value::Null) => {}
            Some(Value::Object(weights)) => merged.weights = self.weights.merge(weights),
            Some(other) => warn!(
                "Ignoring recommendation override 'weights': expected object, got {}",
                json_kind(other)
            ),
        }

        Ok(merged)
    }

    /// Clamps every field into its allowed range.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        out.count = out.count.min(MAX_COUNT);
        let defaults = RecommendationWeights::default();
        let w = &mut out.weights;
        w.skill_tag = clamp_weight(w.skill_tag, MAX_WEIGHT, defaults.skill_tag);
        w.title_token = clamp_weight(w.title_token, MAX_WEIGHT, defaults.title_token);
        w.saved_category = clamp_weight(w.saved_category, MAX_WEIGHT, defaults.saved_category);
        w.recency_max_bonus = clamp_weight(
            w.recency_max_bonus,
            MAX_RECENCY_WINDOW_DAYS,
            defaults.recency_max_bonus,
        );
        for tier in Tier::ALL {
            let slot = w.tier.slot_mut(tier);
            *slot = clamp_weight(*slot, MAX_WEIGHT, defaults.tier.weight(tier));
        }
        out
    }
}

impl RecommendationWeights {
    fn merge(&self, obj: &Map<String, Value>) -> Self {
        let mut merged = self.clone();
        merged.skill_tag = weight_field(obj, "skillTag", self.skill_tag, MAX_WEIGHT);
        merged.title_token = weight_field(obj, "titleToken", self.title_token, MAX_WEIGHT);
        merged.saved_category =
            weight_field(obj, "savedCategory", self.saved_category, MAX_WEIGHT);
        merged.recency_max_bonus = weight_field(
            obj,
            "recencyMaxBonus",
            self.recency_max_bonus,
            MAX_RECENCY_WINDOW_DAYS,
        );

        match obj.get("tier") {
            None | Some(Value::Null) => {}
            Some(Value::Object(tiers)) => {
                for tier in Tier::ALL {
                    let current = self.tier.weight(tier);
                    *merged.tier.slot_mut(tier) =
                        weight_field(tiers, tier.as_str(), current, MAX_WEIGHT);
                }
            }
            Some(other) => warn!(
                "Ignoring recommendation override 'weights.tier': expected object, got {}",
                json_kind(other)
            ),
        }

        merged
    }
}

/// Resolves effective settings from an optional persisted override.
/// Absent or unreadable overrides fall back to defaults.
pub fn resolve_settings(raw: Option<&str>) -> RecommendationSettings {
    let defaults = RecommendationSettings::default();
    let Some(raw) = raw else {
        return defaults;
    };
    match defaults.merge_raw(raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Discarding persisted recommendation settings: {e}");
            defaults
        }
    }
}

fn weight_field(obj: &Map<String, Value>, key: &str, current: f64, max: f64) -> f64 {
    match obj.get(key) {
        None | Some(Value::Null) => current,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => clamp_weight(v, max, current),
            None => current,
        },
        Some(other) => {
            warn!(
                "Ignoring recommendation override '{key}': expected number, got {}",
                json_kind(other)
            );
            current
        }
    }
}

fn count_field(obj: &Map<String, Value>, key: &str, current: usize) -> usize {
    match obj.get(key) {
        None | Some(Value::Null) => current,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => {
                let clamped = v.trunc().clamp(0.0, MAX_COUNT as f64);
                if clamped != v {
                    warn!("Recommendation override '{key}' = {v} coerced to {clamped}");
                }
                clamped as usize
            }
            _ => current,
        },
        Some(other) => {
            warn!(
                "Ignoring recommendation override '{key}': expected number, got {}",
                json_kind(other)
            );
            current
        }
    }
}

fn clamp_weight(value: f64, max: f64, fallback: f64) -> f64 {
    if !value.is_finite() {
        warn!("Non-finite recommendation weight replaced with {fallback}");
        return fallback;
    }
    let clamped = value.clamp(0.0, max);
    if clamped != value {
        warn!("Recommendation weight {value} clamped to {clamped}");
    }
    clamped
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match_documented_values() {
        let s = RecommendationSettings::default();
        assert_eq!(s.count, 3);
        assert_eq!(s.weights.skill_tag, 3.0);
        assert_eq!(s.weights.title_token, 2.0);
        assert_eq!(s.weights.saved_category, 2.0);
        assert_eq!(s.weights.recency_max_bonus, 6.0);
        assert_eq!(s.weights.tier.weight(Tier::Mega), 2.0);
        assert_eq!(s.weights.tier.weight(Tier::Premium), 1.0);
        assert_eq!(s.weights.tier.weight(Tier::Prime), 0.0);
        assert_eq!(s.weights.tier.weight(Tier::Newspaper), 0.0);
        assert_eq!(s.weights.tier.weight(Tier::Latest), 0.0);
    }

    #[test]
    fn test_count_only_override_keeps_default_weights() {
        let s = resolve_settings(Some(r#"{"count": 5}"#));
        assert_eq!(s.count, 5);
        assert_eq!(s.weights, RecommendationWeights::default());
    }

    #[test]
    fn test_nested_tier_override_is_per_field() {
        let s = resolve_settings(Some(r#"{"weights": {"tier": {"prime": 4}}}"#));
        assert_eq!(s.weights.tier.prime, 4.0);
        assert_eq!(s.weights.tier.mega, 2.0);
        assert_eq!(s.weights.tier.premium, 1.0);
        assert_eq!(s.weights.skill_tag, 3.0);
        assert_eq!(s.count, 3);
    }

    #[test]
    fn test_absent_override_yields_defaults() {
        assert_eq!(resolve_settings(None), RecommendationSettings::default());
    }

    #[test]
    fn test_unparsable_override_yields_defaults() {
        assert_eq!(
            resolve_settings(Some("{not json")),
            RecommendationSettings::default()
        );
    }

    #[test]
    fn test_non_object_override_yields_defaults() {
        assert_eq!(
            resolve_settings(Some("[1, 2, 3]")),
            RecommendationSettings::default()
        );
        assert_eq!(
            resolve_settings(Some("42")),
            RecommendationSettings::default()
        );
    }

    #[test]
    fn test_null_and_wrong_typed_fields_keep_base_value() {
        let s = resolve_settings(Some(
            r#"{"count": null, "weights": {"skillTag": "lots", "titleToken": 7}}"#,
        ));
        assert_eq!(s.count, 3);
        assert_eq!(s.weights.skill_tag, 3.0);
        assert_eq!(s.weights.title_token, 7.0);
    }

    #[test]
    fn test_negative_weight_is_clamped_to_zero() {
        let s = resolve_settings(Some(r#"{"weights": {"savedCategory": -4}}"#));
        assert_eq!(s.weights.saved_category, 0.0);
    }

    #[test]
    fn test_oversized_values_are_clamped() {
        let s = resolve_settings(Some(
            r#"{"count": 5000, "weights": {"skillTag": 1e9, "recencyMaxBonus": 10000}}"#,
        ));
        assert_eq!(s.count, MAX_COUNT);
        assert_eq!(s.weights.skill_tag, MAX_WEIGHT);
        assert_eq!(s.weights.recency_max_bonus, MAX_RECENCY_WINDOW_DAYS);
    }

    #[test]
    fn test_fractional_count_truncates() {
        let s = resolve_settings(Some(r#"{"count": 4.8}"#));
        assert_eq!(s.count, 4);
        let s = resolve_settings(Some(r#"{"count": -2}"#));
        assert_eq!(s.count, 0);
    }

    #[test]
    fn test_merge_override_over_non_default_base() {
        let base = resolve_settings(Some(r#"{"count": 8, "weights": {"skillTag": 5}}"#));
        let merged = base
            .merge_override(&json!({"weights": {"titleToken": 1}}))
            .unwrap();
        assert_eq!(merged.count, 8);
        assert_eq!(merged.weights.skill_tag, 5.0);
        assert_eq!(merged.weights.title_token, 1.0);
    }

    #[test]
    fn test_merge_override_rejects_non_object() {
        let err = RecommendationSettings::default()
            .merge_override(&json!("count=5"))
            .unwrap_err();
        assert!(matches!(err, OverrideError::NotAnObject("string")));
    }

    #[test]
    fn test_normalized_replaces_non_finite_with_default() {
        let mut s = RecommendationSettings::default();
        s.weights.skill_tag = f64::NAN;
        s.weights.tier.mega = f64::INFINITY;
        s.count = 1000;
        let n = s.normalized();
        assert_eq!(n.weights.skill_tag, 3.0);
        assert_eq!(n.weights.tier.mega, 2.0);
        assert_eq!(n.count, MAX_COUNT);
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let value = serde_json::to_value(RecommendationSettings::default()).unwrap();
        assert_eq!(value["weights"]["skillTag"], json!(3.0));
        assert_eq!(value["weights"]["recencyMaxBonus"], json!(6.0));
        assert_eq!(value["weights"]["tier"]["mega"], json!(2.0));
    }

    #[test]
    fn test_serialized_settings_resolve_to_themselves() {
        let mut s = RecommendationSettings::default();
        s.count = 7;
        s.weights.tier.newspaper = 0.5;
        let raw = serde_json::to_string(&s).unwrap();
        assert_eq!(resolve_settings(Some(&raw)), s);
    }
}
