use std::fmt;

use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{CategoryId, PlayerName, ScoreRecord};
use storage::catalog::bundled_catalog;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    records: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidRecords { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidRecords { raw } => write!(f, "invalid --records value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());
        let mut records = std::env::var("QUIZ_SEED_RECORDS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(8);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--records" => {
                    let value = require_value(&mut args, "--records")?;
                    records = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidRecords { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            records,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3)");
    eprintln!("  --records <n>             Number of sample scores to append (default: 8)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED_RECORDS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let catalog = bundled_catalog()?;
    let now = args.now.unwrap_or_else(Utc::now);

    let players = ["Aung", "Hnin", "Kyaw", "Su Su", "Thura"];
    let categories: Vec<(CategoryId, String, u32)> = catalog
        .categories()
        .iter()
        .map(|c| {
            let total = u32::try_from(c.len()).unwrap_or(u32::MAX);
            (c.id().clone(), c.name().to_owned(), total)
        })
        .collect();

    for i in 0..args.records {
        let idx = i as usize;
        let (category_id, category_name, total) = &categories[idx % categories.len()];
        let score = (i * 3 + 1) % (total + 1);
        let elapsed = 20 + (i * 7) % 90;
        let completed_at = now - Duration::hours(i64::from(i));

        let record = ScoreRecord::from_persisted(
            PlayerName::new(players[idx % players.len()])?,
            category_id.clone(),
            category_name.clone(),
            score,
            *total,
            elapsed,
            completed_at,
        )?;
        storage.scores.append_score(&record).await?;
    }

    println!(
        "Seeded {} score records into {}",
        args.records, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
