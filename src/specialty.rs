use std::collections::HashMap;

use crate::models::{CoachAggregate, CoachProfile};

const MATCH_SHARE: f64 = 0.7;
const RATING_SHARE: f64 = 0.3;

/// 1.0 when `event` is one of the comma-separated tags, else 0.0.
/// `event` is expected already lowercased.
pub fn specialty_match(specialties: &str, event: Option<&str>) -> f64 {
    let Some(event) = event else {
        return 0.0;
    };

    let specialties = specialties.to_lowercase();
    let matched = specialties
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .any(|tag| tag == event);

    if matched {
        1.0
    } else {
        0.0
    }
}

/// Min-max scaling; all-equal input maps to zeros.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if values.is_empty() || max <= min {
        return vec![0.0; values.len()];
    }

    values.iter().map(|value| (value - min) / (max - min)).collect()
}

/// Specialty score per aggregate, in the same order as `aggregates`.
///
/// The blended signal `0.7 * match + 0.3 * rating` is divided by its own
/// batch maximum even though the rating part is already min-max scaled.
/// Coaches without a profile score as no match and a zero rating.
pub fn specialty_scores(
    aggregates: &[CoachAggregate],
    profiles: &[CoachProfile],
    event: Option<&str>,
) -> Vec<f64> {
    let mut by_coach: HashMap<&str, &CoachProfile> = HashMap::new();
    for profile in profiles {
        by_coach.entry(profile.coach.as_str()).or_insert(profile);
    }

    let (matches, ratings): (Vec<f64>, Vec<f64>) = aggregates
        .iter()
        .map(|aggregate| match by_coach.get(aggregate.coach.as_str()) {
            Some(profile) => (
                specialty_match(&profile.specialties, event),
                profile.rating.filter(|rating| rating.is_finite()).unwrap_or(0.0),
            ),
            None => (0.0, 0.0),
        })
        .unzip();

    let ratings = min_max_normalize(&ratings);
    let raw: Vec<f64> = matches
        .iter()
        .zip(ratings.iter())
        .map(|(matched, rating)| MATCH_SHARE * matched + RATING_SHARE * rating)
        .collect();

    let max = raw.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter().map(|value| value / max).collect()
}
