use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod io;
mod matcher;
mod models;
mod report;
mod specialty;

use config::{ScoreWeights, ScoringConfig, WeightOverrides};

#[derive(Parser)]
#[command(name = "coach-matcher")]
#[command(about = "Rank coaches for a tournament group from drill history", long_about = None)]
struct Cli {
    /// Log scoring stages at debug level
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScoringArgs {
    /// Drill log CSV (student, coach, date, minutes, drill_type)
    #[arg(long)]
    drills: PathBuf,
    /// Group roster CSV (student)
    #[arg(long)]
    roster: PathBuf,
    /// Coach metadata CSV (coach, specialties, rating)
    #[arg(long)]
    coaches: PathBuf,
    #[arg(long)]
    tournament: String,
    /// Event tag to match against coach specialties, e.g. LD, PF, CX
    #[arg(long)]
    event: Option<String>,
    /// Reference date for recency, defaults to today
    #[arg(long)]
    as_of: Option<String>,
    #[arg(long, default_value_t = config::DEFAULT_HALF_LIFE_DAYS)]
    half_life_days: f64,
    #[arg(long, default_value_t = config::DEFAULT_MIN_SESSIONS)]
    min_sessions: usize,
    /// JSON object of component weights, e.g. '{"recency": 0.5}'
    #[arg(long)]
    weights: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score coaches and write the ranked table as CSV
    Rank {
        #[command(flatten)]
        scoring: ScoringArgs,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown recommendation report
    Report {
        #[command(flatten)]
        scoring: ScoringArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

struct LoadedRun {
    records: Vec<models::InteractionRecord>,
    roster: Vec<models::RosterEntry>,
    rows: Vec<models::CoachScoreRow>,
    as_of: chrono::NaiveDate,
    config: ScoringConfig,
}

fn scoring_config(args: &ScoringArgs) -> anyhow::Result<ScoringConfig> {
    let overrides = match args.weights.as_deref() {
        Some(raw) => WeightOverrides::from_json(raw)?,
        None => WeightOverrides::default(),
    };

    Ok(ScoringConfig {
        half_life_days: args.half_life_days,
        min_sessions: args.min_sessions,
        event: args.event.clone(),
        weights: ScoreWeights::merged(&overrides),
    })
}

fn run_scoring(args: &ScoringArgs) -> anyhow::Result<LoadedRun> {
    let config = scoring_config(args)?;
    let as_of = io::parse_as_of(args.as_of.as_deref())?;

    let records = io::load_drills(&args.drills)?;
    let roster = io::load_roster(&args.roster)?;
    let coaches = io::load_coaches(&args.coaches)?;

    let rows = matcher::score_coaches(&records, &roster, &coaches, as_of, &config);
    info!(coaches = rows.len(), %as_of, "scored coaches");

    Ok(LoadedRun {
        records,
        roster,
        rows,
        as_of,
        config,
    })
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Rank {
            scoring,
            output,
            limit,
        } => {
            let run = run_scoring(&scoring)?;
            io::write_results(&output, &run.rows, &scoring.tournament, scoring.event.as_deref())?;

            if run.rows.is_empty() {
                println!("No eligible coaches for this group.");
                return Ok(());
            }

            println!("Top recommendations for {}:", scoring.tournament);
            for row in run.rows.iter().take(limit) {
                println!(
                    "- {} score {:.3} across {} sessions ({} students, {:.1}% of group) {}",
                    row.coach,
                    row.combined_score,
                    row.sessions,
                    row.students_covered,
                    row.percent_of_group_covered,
                    row.notes
                );
            }
            println!("Results written to {}.", output.display());
        }
        Commands::Report { scoring, out } => {
            let run = run_scoring(&scoring)?;
            let students = matcher::roster_students(&run.roster);
            let filtered = matcher::filter_to_roster(&run.records, &students);
            let report = report::build_report(
                &scoring.tournament,
                run.as_of,
                &run.config,
                &filtered,
                &run.rows,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
