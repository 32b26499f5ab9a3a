use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::ScoringConfig;
use crate::models::{CoachScoreRow, DrillTypeSummary, InteractionRecord};

pub fn summarize_by_drill_type(records: &[&InteractionRecord]) -> Vec<DrillTypeSummary> {
    let mut totals: HashMap<&str, (usize, f64)> = HashMap::new();
    for record in records {
        let (count, minutes) = totals.entry(record.drill_type.as_str()).or_default();
        *count += 1;
        *minutes += record.minutes;
    }

    let mut summaries: Vec<DrillTypeSummary> = totals
        .into_iter()
        .map(|(drill_type, (count, minutes))| DrillTypeSummary {
            drill_type: drill_type.to_string(),
            count,
            avg_minutes: minutes / count as f64,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.drill_type.cmp(&b.drill_type)));
    summaries
}

pub fn build_report(
    tournament: &str,
    as_of: NaiveDate,
    config: &ScoringConfig,
    records: &[&InteractionRecord],
    rows: &[CoachScoreRow],
) -> String {
    let summaries = summarize_by_drill_type(records);

    let mut output = String::new();
    let event_label = config
        .event
        .as_deref()
        .filter(|event| !event.trim().is_empty())
        .unwrap_or("any event");

    let _ = writeln!(output, "# Coach Recommendations: {}", tournament);
    let _ = writeln!(
        output,
        "Generated for {} as of {} (half-life {} days, minimum {} sessions)",
        event_label, as_of, config.half_life_days, config.min_sessions
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommended Coaches");

    if rows.is_empty() {
        let _ = writeln!(output, "No eligible coaches for this group.");
    } else {
        for (rank, row) in rows.iter().take(10).enumerate() {
            let _ = writeln!(
                output,
                "{}. {} score {:.3} ({} sessions, {:.2} recency-weighted, {} students, {:.0} minutes, {:.1}% of group)",
                rank + 1,
                row.coach,
                row.combined_score,
                row.sessions,
                row.recency_sum,
                row.students_covered,
                row.total_minutes,
                row.percent_of_group_covered
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Drill Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No drills recorded for this group.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} sessions (avg {:.1} minutes)",
                summary.drill_type, summary.count, summary.avg_minutes
            );
        }
    }

    let majority: Vec<&CoachScoreRow> = rows.iter().filter(|row| !row.notes.is_empty()).collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "## Coverage Notes");

    if majority.is_empty() {
        let _ = writeln!(output, "No coach has worked with most of the group.");
    } else {
        for row in majority {
            let _ = writeln!(output, "- {}: {}", row.coach, row.notes);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drill(drill_type: &str, minutes: f64) -> InteractionRecord {
        InteractionRecord {
            student: "Avery".to_string(),
            coach: "Kim".to_string(),
            date: None,
            minutes,
            drill_type: drill_type.to_string(),
        }
    }

    #[test]
    fn drill_mix_sorts_by_count_then_name() {
        let records = vec![
            drill("speed", 10.0),
            drill("rebuttal", 30.0),
            drill("rebuttal", 50.0),
            drill("cross-ex", 20.0),
        ];
        let refs: Vec<&InteractionRecord> = records.iter().collect();
        let summaries = summarize_by_drill_type(&refs);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].drill_type, "rebuttal");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].avg_minutes, 40.0);
        assert_eq!(summaries[1].drill_type, "cross-ex");
        assert_eq!(summaries[2].drill_type, "speed");
    }

    #[test]
    fn empty_report_explains_itself() {
        let as_of = NaiveDate::from_ymd_opt(2025, 11, 14).unwrap();
        let report = build_report("Greenhill 2025", as_of, &ScoringConfig::default(), &[], &[]);
        assert!(report.starts_with("# Coach Recommendations: Greenhill 2025"));
        assert!(report.contains("any event as of 2025-11-14"));
        assert!(report.contains("No eligible coaches for this group."));
        assert!(report.contains("No drills recorded for this group."));
    }

    #[test]
    fn blank_event_reads_as_any_event() {
        let as_of = NaiveDate::from_ymd_opt(2025, 11, 14).unwrap();
        let config = ScoringConfig {
            event: Some(" ".to_string()),
            ..ScoringConfig::default()
        };
        let report = build_report("Greenhill 2025", as_of, &config, &[], &[]);
        assert!(report.contains("Generated for any event as of 2025-11-14"));
    }

    #[test]
    fn report_lists_ranked_coaches() {
        let as_of = NaiveDate::from_ymd_opt(2025, 11, 14).unwrap();
        let row = CoachScoreRow {
            coach: "Kim".to_string(),
            sessions: 4,
            students_covered: 3,
            total_minutes: 120.0,
            recency_sum: 3.2,
            recency_score: 1.0,
            volume_score: 1.0,
            coverage_score: 0.75,
            minutes_score: 1.0,
            specialty_score: 1.0,
            combined_score: 0.9626,
            percent_of_group_covered: 75.0,
            notes: "Worked with majority of group recently".to_string(),
        };
        let config = ScoringConfig {
            event: Some("LD".to_string()),
            ..ScoringConfig::default()
        };
        let report = build_report("Greenhill 2025", as_of, &config, &[], &[row]);
        assert!(report.contains("1. Kim score 0.963 (4 sessions, 3.20 recency-weighted, 3 students, 120 minutes, 75.0% of group)"));
        assert!(report.contains("- Kim: Worked with majority of group recently"));
        assert!(report.contains("Generated for LD"));
    }
}
