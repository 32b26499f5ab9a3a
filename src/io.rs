use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::models::{CoachProfile, CoachScoreRow, InteractionRecord, RosterEntry};

const DRILL_COLUMNS: &[&str] = &["student", "coach", "date", "minutes", "drill_type"];
const ROSTER_COLUMNS: &[&str] = &["student"];
const COACH_COLUMNS: &[&str] = &["coach", "specialties", "rating"];

pub const RESULT_COLUMNS: &[&str] = &[
    "coach",
    "sessions",
    "students_covered",
    "total_minutes",
    "recency_score",
    "volume_score",
    "coverage_score",
    "minutes_score",
    "specialty_score",
    "combined_score",
    "percent_of_group_covered",
    "notes",
];

// Fields are optional so short rows degrade to blanks instead of failing.
#[derive(Deserialize)]
struct DrillRow {
    student: Option<String>,
    coach: Option<String>,
    date: Option<String>,
    minutes: Option<String>,
    drill_type: Option<String>,
}

#[derive(Deserialize)]
struct RosterRow {
    student: Option<String>,
}

#[derive(Deserialize)]
struct CoachRow {
    coach: Option<String>,
    specialties: Option<String>,
    rating: Option<String>,
}

/// Opens a CSV reader with trimmed, lowercased headers and checks that
/// every required column is present.
fn open_table<R: Read>(
    source: R,
    table: &str,
    required: &[&str],
) -> anyhow::Result<csv::Reader<R>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: csv::StringRecord = reader
        .headers()
        .with_context(|| format!("failed to read {table} header"))?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();

    let present: BTreeSet<&str> = headers.iter().collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !present.contains(column))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("missing columns in {table}: {}", missing.join(", "));
    }

    reader.set_headers(headers);
    Ok(reader)
}

pub fn read_drills<R: Read>(source: R) -> anyhow::Result<Vec<InteractionRecord>> {
    let mut reader = open_table(source, "drills", DRILL_COLUMNS)?;
    let mut records = Vec::new();

    for (line, result) in reader.deserialize::<DrillRow>().enumerate() {
        let row = result.with_context(|| format!("malformed drills row {}", line + 1))?;
        records.push(InteractionRecord {
            student: row.student.unwrap_or_default(),
            coach: row.coach.unwrap_or_default(),
            date: row.date.as_deref().and_then(parse_date),
            minutes: row.minutes.as_deref().map_or(0.0, parse_minutes),
            drill_type: row.drill_type.unwrap_or_default(),
        });
    }

    Ok(records)
}

pub fn read_roster<R: Read>(source: R) -> anyhow::Result<Vec<RosterEntry>> {
    let mut reader = open_table(source, "roster", ROSTER_COLUMNS)?;
    let mut entries = Vec::new();

    for (line, result) in reader.deserialize::<RosterRow>().enumerate() {
        let row = result.with_context(|| format!("malformed roster row {}", line + 1))?;
        entries.push(RosterEntry {
            student: row.student.unwrap_or_default(),
        });
    }

    Ok(entries)
}

pub fn read_coaches<R: Read>(source: R) -> anyhow::Result<Vec<CoachProfile>> {
    let mut reader = open_table(source, "coaches", COACH_COLUMNS)?;
    let mut profiles = Vec::new();

    for (line, result) in reader.deserialize::<CoachRow>().enumerate() {
        let row = result.with_context(|| format!("malformed coaches row {}", line + 1))?;
        profiles.push(CoachProfile {
            coach: row.coach.unwrap_or_default(),
            specialties: row.specialties.unwrap_or_default(),
            rating: row.rating.as_deref().and_then(parse_rating),
        });
    }

    Ok(profiles)
}

pub fn load_drills(path: &Path) -> anyhow::Result<Vec<InteractionRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open drills file {}", path.display()))?;
    let records = read_drills(file)?;
    info!(path = %path.display(), rows = records.len(), "loaded drills");
    Ok(records)
}

pub fn load_roster(path: &Path) -> anyhow::Result<Vec<RosterEntry>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open roster file {}", path.display()))?;
    let entries = read_roster(file)?;
    info!(path = %path.display(), rows = entries.len(), "loaded roster");
    Ok(entries)
}

pub fn load_coaches(path: &Path) -> anyhow::Result<Vec<CoachProfile>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open coaches file {}", path.display()))?;
    let profiles = read_coaches(file)?;
    info!(path = %path.display(), rows = profiles.len(), "loaded coaches");
    Ok(profiles)
}

/// Lenient date parsing; unrecognized input is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

pub fn parse_minutes(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
        .unwrap_or(0.0)
}

pub fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
}

pub fn parse_as_of(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        Some(value) => parse_date(value).with_context(|| format!("invalid --as-of date {value:?}")),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn write_table<W: Write>(
    sink: W,
    rows: &[CoachScoreRow],
    tournament: &str,
    event: Option<&str>,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);

    let event = event.filter(|event| !event.trim().is_empty());

    let mut header: Vec<&str> = RESULT_COLUMNS.to_vec();
    header.insert(1, "tournament");
    if event.is_some() {
        header.insert(2, "event");
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.coach.clone(), tournament.to_string()];
        if let Some(event) = event {
            record.push(event.to_string());
        }
        record.extend([
            row.sessions.to_string(),
            row.students_covered.to_string(),
            row.total_minutes.to_string(),
            row.recency_score.to_string(),
            row.volume_score.to_string(),
            row.coverage_score.to_string(),
            row.minutes_score.to_string(),
            row.specialty_score.to_string(),
            row.combined_score.to_string(),
            format!("{:.1}", row.percent_of_group_covered),
            row.notes.clone(),
        ]);
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_results(
    path: &Path,
    rows: &[CoachScoreRow],
    tournament: &str,
    event: Option<&str>,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    write_table(file, rows, tournament, event)
        .with_context(|| format!("failed to write results to {}", path.display()))
}
