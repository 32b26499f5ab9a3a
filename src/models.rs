use chrono::NaiveDate;

/// One logged drill session between a student and a coach.
#[derive(Debug, Clone)]
pub struct InteractionRecord {
    pub student: String,
    pub coach: String,
    pub date: Option<NaiveDate>,
    pub minutes: f64,
    pub drill_type: String,
}

#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub student: String,
}

#[derive(Debug, Clone)]
pub struct CoachProfile {
    pub coach: String,
    pub specialties: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CoachAggregate {
    pub coach: String,
    pub sessions: usize,
    pub students_covered: usize,
    pub total_minutes: f64,
    pub recency_sum: f64,
}

#[derive(Debug, Clone)]
pub struct CoachScoreRow {
    pub coach: String,
    pub sessions: usize,
    pub students_covered: usize,
    pub total_minutes: f64,
    pub recency_sum: f64,
    pub recency_score: f64,
    pub volume_score: f64,
    pub coverage_score: f64,
    pub minutes_score: f64,
    pub specialty_score: f64,
    pub combined_score: f64,
    pub percent_of_group_covered: f64,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct DrillTypeSummary {
    pub drill_type: String,
    pub count: usize,
    pub avg_minutes: f64,
}
