use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use icukpi::config;
use icukpi::db;
use icukpi::models::QueryWindow;
use icukpi::report::{build_patient_report, build_unit_report};

#[derive(Parser)]
#[command(name = config::APP_NAME, version, about = "Intensive-care KPI reports from a clinical record store")]
struct Cli {
    /// Path to the SQLite database (default: ICUKPI_DB or ~/.icukpi/records.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Unit-level KPI document for one sector over [from, to)
    Unit {
        sector_id: String,
        /// Window start (inclusive), YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Window end (exclusive), YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
        /// Persist the computed document to the report cache
        #[arg(long)]
        persist: bool,
    },
    /// Patient-level document for one admission episode
    Patient { admission_id: Uuid },
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(config::database_path);
    let conn = db::open_database(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let now = Utc::now();

    match cli.command {
        Command::Unit { sector_id, from, to, persist } => {
            let window = QueryWindow::new(midnight_utc(from), midnight_utc(to));
            anyhow::ensure!(window.start < window.end, "--from must be before --to");
            let report = build_unit_report(&conn, &sector_id, &window, now)?;
            if persist {
                db::upsert_unit_report(&conn, &report, now)?;
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Patient { admission_id } => {
            let report = build_patient_report(&conn, &admission_id, now)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
