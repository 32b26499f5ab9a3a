use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;
pub const DEFAULT_MIN_SESSIONS: usize = 1;

/// Component weights for the combined score. The sum is not checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub recency: f64,
    pub volume: f64,
    pub coverage: f64,
    pub minutes: f64,
    pub specialty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            volume: 0.3,
            coverage: 0.15,
            minutes: 0.1,
            specialty: 0.05,
        }
    }
}

/// Caller-supplied partial weights, e.g. `{"recency": 0.6}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightOverrides {
    pub recency: Option<f64>,
    pub volume: Option<f64>,
    pub coverage: Option<f64>,
    pub minutes: Option<f64>,
    pub specialty: Option<f64>,
}

impl WeightOverrides {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .with_context(|| format!("invalid weights JSON {raw:?}"))
    }
}

impl ScoreWeights {
    pub fn merged(overrides: &WeightOverrides) -> Self {
        let defaults = Self::default();
        Self {
            recency: overrides.recency.unwrap_or(defaults.recency),
            volume: overrides.volume.unwrap_or(defaults.volume),
            coverage: overrides.coverage.unwrap_or(defaults.coverage),
            minutes: overrides.minutes.unwrap_or(defaults.minutes),
            specialty: overrides.specialty.unwrap_or(defaults.specialty),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub half_life_days: f64,
    pub min_sessions: usize,
    pub event: Option<String>,
    pub weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            min_sessions: DEFAULT_MIN_SESSIONS,
            event: None,
            weights: ScoreWeights::default(),
        }
    }
}

impl ScoringConfig {
    /// Lowercased, trimmed event tag; blank counts as no event.
    pub fn event_tag(&self) -> Option<String> {
        self.event
            .as_deref()
            .map(|event| event.trim().to_lowercase())
            .filter(|event| !event.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let overrides = WeightOverrides::from_json(r#"{"recency": 0.9, "specialty": 1.5}"#)
            .unwrap();
        let weights = ScoreWeights::merged(&overrides);
        assert_eq!(weights.recency, 0.9);
        assert_eq!(weights.specialty, 1.5);
        assert_eq!(weights.volume, 0.3);
        assert_eq!(weights.coverage, 0.15);
        assert_eq!(weights.minutes, 0.1);
    }

    #[test]
    fn empty_override_is_default() {
        let overrides = WeightOverrides::from_json("{}").unwrap();
        assert_eq!(ScoreWeights::merged(&overrides), ScoreWeights::default());
    }

    #[test]
    fn unknown_weight_key_is_rejected() {
        let err = WeightOverrides::from_json(r#"{"charisma": 1.0}"#).unwrap_err();
        assert!(format!("{err:#}").contains("charisma"));
    }

    #[test]
    fn blank_event_means_no_event() {
        let config = ScoringConfig {
            event: Some("   ".to_string()),
            ..ScoringConfig::default()
        };
        assert_eq!(config.event_tag(), None);

        let config = ScoringConfig {
            event: Some(" LD ".to_string()),
            ..ScoringConfig::default()
        };
        assert_eq!(config.event_tag().as_deref(), Some("ld"));
    }
}
