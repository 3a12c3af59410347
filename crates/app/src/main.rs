use std::fmt;

use challenge_core::model::SettingsDraft;
use challenge_core::pacing::ProgressReport;
use chrono::{Datelike, NaiveDate};
use services::{AppServices, Clock, ProgressService, ReadwiseConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidGoal { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidGoal { raw } => write!(f, "invalid --goal value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

/// Database file used when neither `--db` nor `CHALLENGE_DB_URL` is given.
const DEFAULT_DB_FILE: &str = "challenge.sqlite3";

fn usage() -> String {
    format!(
        "Usage:
  readwise-challenge [status]  [--db <sqlite_url>]
  readwise-challenge refresh   [--db <sqlite_url>]
  readwise-challenge configure [--db <sqlite_url>] [--goal <n>] [--token <t>] [--tag <tag>]

Defaults:
  --db sqlite://{DEFAULT_DB_FILE}
  --goal 365, --tag <year>_READ (configure, when nothing is saved)

Environment:
  CHALLENGE_DB_URL, READWISE_TOKEN, READWISE_BASE_URL,
  READWISE_TIMEOUT_SECS, READWISE_MAX_PAGES, RUST_LOG"
    )
}

fn print_usage() {
    eprintln!("{}", usage());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Refresh,
    Configure,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "status" => Some(Self::Status),
            "refresh" => Some(Self::Refresh),
            "configure" => Some(Self::Configure),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Overrides {
    goal: Option<i64>,
    token: Option<String>,
    tag: Option<String>,
}

impl Overrides {
    fn apply(self, mut draft: SettingsDraft) -> SettingsDraft {
        if let Some(goal) = self.goal {
            draft.goal = goal;
        }
        if let Some(token) = self.token {
            draft.api_token = token;
        }
        if let Some(tag) = self.tag {
            draft.read_tag = tag;
        }
        draft
    }
}

struct Args {
    db_url: String,
    overrides: Overrides,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        allow_settings: bool,
    ) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("CHALLENGE_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url(DEFAULT_DB_FILE.into()), normalize_sqlite_url);
        let mut overrides = Overrides {
            token: std::env::var("READWISE_TOKEN")
                .ok()
                .filter(|_| allow_settings),
            ..Overrides::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--goal" if allow_settings => {
                    let value = require_value(args, "--goal")?;
                    let parsed: i64 = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidGoal { raw: value.clone() })?;
                    overrides.goal = Some(parsed);
                }
                "--token" if allow_settings => {
                    overrides.token = Some(require_value(args, "--token")?);
                }
                "--tag" if allow_settings => {
                    overrides.tag = Some(require_value(args, "--tag")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, overrides })
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_report(report: &ProgressReport) {
    println!("{report}");
}

async fn show_status(
    progress: &ProgressService,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    match progress.report(today).await? {
        Some(report) => print_report(&report),
        None => {
            println!("No challenge set up yet. Get started with:");
            println!("  readwise-challenge configure --token <readwise token> [--goal <n>] [--tag <tag>]");
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Status,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Status,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, cmd == Command::Configure).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::debug!(?cmd, db = %parsed.db_url, "starting");
    prepare_sqlite_file(&parsed.db_url)?;
    let clock = Clock::default_clock();
    let services =
        AppServices::new_sqlite(&parsed.db_url, clock, ReadwiseConfig::from_env()?).await?;
    let progress = services.progress();
    // Same calendar the sync filter uses for its start of year.
    let today = clock.today();

    match cmd {
        Command::Status => show_status(&progress, today).await,
        Command::Refresh => {
            let snapshot = progress.refresh_saved().await?;
            print_report(&ProgressReport::new(&snapshot, today));
            Ok(())
        }
        Command::Configure => {
            let base = progress.load().await?.map_or_else(
                || SettingsDraft::with_defaults(today.year()),
                |snapshot| snapshot.settings().to_draft(),
            );
            let snapshot = progress.configure(parsed.overrides.apply(base)).await?;
            print_report(&ProgressReport::new(&snapshot, today));
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
