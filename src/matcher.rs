use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{ScoreWeights, ScoringConfig};
use crate::models::{CoachAggregate, CoachProfile, CoachScoreRow, InteractionRecord, RosterEntry};
use crate::specialty;

const MIN_HALF_LIFE_DAYS: f64 = 0.0001;
pub const MAJORITY_NOTE: &str = "Worked with majority of group recently";

pub fn normalize_student(student: &str) -> String {
    student.trim().to_lowercase()
}

/// Distinct normalized roster students. Blank entries are skipped.
pub fn roster_students(roster: &[RosterEntry]) -> HashSet<String> {
    roster
        .iter()
        .map(|entry| normalize_student(&entry.student))
        .filter(|student| !student.is_empty())
        .collect()
}

pub fn filter_to_roster<'a>(
    records: &'a [InteractionRecord],
    students: &HashSet<String>,
) -> Vec<&'a InteractionRecord> {
    records
        .iter()
        .filter(|record| students.contains(&normalize_student(&record.student)))
        .collect()
}

/// `0.5 ^ (days_ago / half_life_days)`; future dates count as today.
pub fn recency_weight(days_ago: i64, half_life_days: f64) -> f64 {
    let days_ago = days_ago.max(0) as f64;
    0.5_f64.powf(days_ago / half_life_days.max(MIN_HALF_LIFE_DAYS))
}

/// Groups records by coach, ordered by coach identifier.
pub fn aggregate_by_coach(
    records: &[&InteractionRecord],
    as_of: NaiveDate,
    half_life_days: f64,
) -> Vec<CoachAggregate> {
    let mut groups: BTreeMap<&str, (CoachAggregate, HashSet<String>)> = BTreeMap::new();

    for record in records {
        let (entry, students) = groups.entry(record.coach.as_str()).or_insert_with(|| {
            (
                CoachAggregate {
                    coach: record.coach.clone(),
                    sessions: 0,
                    students_covered: 0,
                    total_minutes: 0.0,
                    recency_sum: 0.0,
                },
                HashSet::new(),
            )
        });

        entry.sessions += 1;
        entry.total_minutes += record.minutes;
        if let Some(date) = record.date {
            let days_ago = (as_of - date).num_days();
            entry.recency_sum += recency_weight(days_ago, half_life_days);
        }
        students.insert(normalize_student(&record.student));
    }

    groups
        .into_values()
        .map(|(mut aggregate, students)| {
            aggregate.students_covered = students.len();
            aggregate
        })
        .collect()
}

/// Divides each value by the batch maximum; a non-positive maximum gives zeros.
pub fn normalize_by_max(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|value| value / max).collect()
}

pub fn majority_threshold(roster_size: usize) -> usize {
    (roster_size / 2).max(1)
}

pub fn combine(row: &CoachScoreRow, weights: &ScoreWeights) -> f64 {
    weights.recency * row.recency_score
        + weights.volume * row.volume_score
        + weights.coverage * row.coverage_score
        + weights.minutes * row.minutes_score
        + weights.specialty * row.specialty_score
}

/// Half-to-even, so 6.25 becomes 6.2.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Ranks coaches for the roster, highest combined score first.
pub fn score_coaches(
    records: &[InteractionRecord],
    roster: &[RosterEntry],
    coaches: &[CoachProfile],
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> Vec<CoachScoreRow> {
    let students = roster_students(roster);
    let filtered = filter_to_roster(records, &students);
    debug!(
        total = records.len(),
        kept = filtered.len(),
        roster = students.len(),
        "filtered interactions to roster"
    );

    if filtered.is_empty() {
        return Vec::new();
    }

    let aggregates = aggregate_by_coach(&filtered, as_of, config.half_life_days);
    debug!(coaches = aggregates.len(), "aggregated interactions by coach");

    let recency_sums: Vec<f64> = aggregates.iter().map(|a| a.recency_sum).collect();
    let sessions: Vec<f64> = aggregates.iter().map(|a| a.sessions as f64).collect();
    let minutes: Vec<f64> = aggregates.iter().map(|a| a.total_minutes).collect();

    let recency_scores = normalize_by_max(&recency_sums);
    let volume_scores = normalize_by_max(&sessions);
    let minutes_scores = normalize_by_max(&minutes);
    let event = config.event_tag();
    let specialty_scores = specialty::specialty_scores(&aggregates, coaches, event.as_deref());

    let roster_size = students.len().max(1);
    let threshold = majority_threshold(students.len());

    let mut rows: Vec<CoachScoreRow> = aggregates
        .into_iter()
        .enumerate()
        .map(|(index, aggregate)| {
            let coverage_score = aggregate.students_covered as f64 / roster_size as f64;
            let notes = if aggregate.students_covered >= threshold {
                MAJORITY_NOTE.to_string()
            } else {
                String::new()
            };
            CoachScoreRow {
                coach: aggregate.coach,
                sessions: aggregate.sessions,
                students_covered: aggregate.students_covered,
                total_minutes: aggregate.total_minutes,
                recency_sum: aggregate.recency_sum,
                recency_score: recency_scores[index],
                volume_score: volume_scores[index],
                coverage_score,
                minutes_score: minutes_scores[index],
                specialty_score: specialty_scores[index],
                combined_score: 0.0,
                percent_of_group_covered: round_one_decimal(coverage_score * 100.0),
                notes,
            }
        })
        .filter(|row| row.sessions >= config.min_sessions)
        .collect();

    for row in rows.iter_mut() {
        row.combined_score = combine(row, &config.weights);
    }

    rows.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(ranked = rows.len(), min_sessions = config.min_sessions, "ranked coaches");
    rows
}
