use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::CategoryId;
use services::{
    Clock, DEFAULT_LEADERBOARD_LIMIT, LeaderboardService, PlayerService, QuizLoopService,
};
use storage::catalog::load_catalog;
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

mod input;
mod play;
mod render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownSubcommand(String),
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLimit { raw: String },
    InvalidCategory { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownSubcommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play] [--db <sqlite_url>] [--catalog <path>] [--player <name>]");
    eprintln!("  quiz leaderboard [--db <sqlite_url>] [--limit <n>] [--category <id>] [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --catalog <bundled health quiz>");
    eprintln!("  --limit {DEFAULT_LEADERBOARD_LIMIT}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CATALOG, QUIZ_PLAYER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Leaderboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "leaderboard" | "scores" => Some(Self::Leaderboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    catalog: Option<PathBuf>,
    player: Option<String>,
    limit: usize,
    category: Option<CategoryId>,
    json: bool,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("QUIZ_DB_URL")
                .ok()
                .map_or_else(|| normalize_sqlite_url("quiz.sqlite3".into()), normalize_sqlite_url),
            catalog: std::env::var_os("QUIZ_CATALOG").map(PathBuf::from),
            player: std::env::var("QUIZ_PLAYER").ok(),
            limit: DEFAULT_LEADERBOARD_LIMIT,
            category: None,
            json: false,
        };

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                (Command::Play, "--catalog") => {
                    parsed.catalog = Some(PathBuf::from(require_value(args, "--catalog")?));
                }
                (Command::Play, "--player") => {
                    parsed.player = Some(require_value(args, "--player")?);
                }
                (Command::Leaderboard, "--limit") => {
                    let value = require_value(args, "--limit")?;
                    parsed.limit = value
                        .parse::<usize>()
                        .ok()
                        .filter(|&n| n > 0)
                        .ok_or(ArgsError::InvalidLimit { raw: value })?;
                }
                (Command::Leaderboard, "--category") => {
                    let value = require_value(args, "--category")?;
                    let id = value
                        .parse::<CategoryId>()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                    parsed.category = Some(id);
                }
                (Command::Leaderboard, "--json") => parsed.json = true,
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg.clone())),
            }
        }

        Ok(parsed)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            print_usage();
            ArgsError::UnknownSubcommand(first.to_owned())
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).inspect_err(|_| print_usage())?;

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    log::debug!("using database {}", parsed.db_url);

    match cmd {
        Command::Play => {
            let catalog = Arc::new(load_catalog(parsed.catalog.as_deref())?);
            let players = PlayerService::new(Arc::clone(&storage.players));
            let quiz = QuizLoopService::new(
                Clock::default_clock(),
                catalog,
                Arc::clone(&storage.scores),
            );

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let Some(player) =
                play::resolve_player(&players, parsed.player.as_deref(), &mut lines).await?
            else {
                return Ok(());
            };
            play::run_session(&quiz, player, &mut lines).await
        }
        Command::Leaderboard => {
            let board = LeaderboardService::new(Arc::clone(&storage.scores));
            let entries = match &parsed.category {
                Some(id) => board.top_in_category(id, parsed.limit).await?,
                None => board.top(parsed.limit).await?,
            };
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", render::leaderboard(&entries));
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
