use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{Category, Difficulty, ExamSpec};
use services::{AppServices, Clock, ExamComposer, ProgressBackend};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_QUESTIONS: &str = "Data/questions.json";
const DEFAULT_PROGRESS: &str = "Data/progress_data.json";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidExam { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExam { raw } => write!(f, "invalid --exam value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --progress value: {raw}"),
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
    eprintln!("  cfa-quiz categories [options]");
    eprintln!("  cfa-quiz quiz --exam <kind> [options]");
    eprintln!("  cfa-quiz progress   [options]");
    eprintln!("  cfa-quiz register   [options]");
    eprintln!();
    eprintln!("Exam kinds:");
    eprintln!("  easy | medium | hard | super-hard | quick | random");
    eprintln!("  balanced[:N] | category:<name>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --questions <path>            (default {DEFAULT_QUESTIONS})");
    eprintln!("  --progress <path|sqlite-url>  (default {DEFAULT_PROGRESS})");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS, QUIZ_PROGRESS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Categories,
    Quiz,
    Progress,
    Register,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "categories" => Some(Self::Categories),
            "quiz" => Some(Self::Quiz),
            "progress" => Some(Self::Progress),
            "register" => Some(Self::Register),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    questions: PathBuf,
    progress: ProgressBackend,
    exam: Option<ExamSpec>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut questions = std::env::var("QUIZ_QUESTIONS")
            .map_or_else(|_| PathBuf::from(DEFAULT_QUESTIONS), PathBuf::from);
        let mut progress = std::env::var("QUIZ_PROGRESS")
            .ok()
            .map_or_else(|| Ok(ProgressBackend::from_location(DEFAULT_PROGRESS)), parse_progress)?;
        let mut exam = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => {
                    questions = PathBuf::from(require_value(args, "--questions")?);
                }
                "--progress" => {
                    progress = parse_progress(require_value(args, "--progress")?)?;
                }
                "--exam" => {
                    exam = Some(parse_exam(&require_value(args, "--exam")?)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            questions,
            progress,
            exam,
        })
    }
}

fn parse_progress(raw: String) -> Result<ProgressBackend, ArgsError> {
    if raw.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw });
    }
    Ok(match ProgressBackend::from_location(raw.trim()) {
        ProgressBackend::Sqlite(url) => ProgressBackend::Sqlite(normalize_sqlite_url(&url)),
        other => other,
    })
}

/// Parse an exam kind such as `hard`, `balanced:3` or `category:Economics`.
fn parse_exam(raw: &str) -> Result<ExamSpec, ArgsError> {
    let invalid = || ArgsError::InvalidExam {
        raw: raw.to_string(),
    };
    let (kind, param) = match raw.split_once(':') {
        Some((kind, param)) => (kind, Some(param.trim())),
        None => (raw, None),
    };

    match (kind.trim().to_ascii_lowercase().as_str(), param) {
        ("super-hard", None) => Ok(ExamSpec::SuperHard),
        ("quick", None) => Ok(ExamSpec::Quick),
        ("random", None) => Ok(ExamSpec::RandomMix),
        ("balanced", None) => Ok(ExamSpec::Balanced { exam_number: 1 }),
        ("balanced", Some(n)) => n
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(|exam_number| ExamSpec::Balanced { exam_number })
            .ok_or_else(invalid),
        ("category", Some(name)) => Category::from_name_loose(name)
            .map(|category| ExamSpec::ByCategory { category })
            .ok_or_else(invalid),
        (level, None) => level
            .parse::<Difficulty>()
            .map(|difficulty| ExamSpec::ByDifficulty { difficulty })
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn normalize_sqlite_url(raw: &str) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_string();
    }

    let path_str = raw.strip_prefix("sqlite:").unwrap_or(raw);
    let path = std::path::Path::new(path_str);
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

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Binary glue owns filesystem preparation so the services stay storage-agnostic.
    if let ProgressBackend::Sqlite(url) = &parsed.progress {
        prepare_sqlite_file(url)?;
    }

    let mut services = AppServices::open(
        &parsed.questions,
        &parsed.progress,
        ExamComposer::default(),
        Clock::default_clock(),
    )
    .await?;
    tracing::debug!(?cmd, questions = %parsed.questions.display(), "services ready");

    match cmd {
        Command::Categories => commands::categories(&services),
        Command::Quiz => {
            let spec = parsed.exam.ok_or(ArgsError::MissingValue { flag: "--exam" })?;
            commands::quiz(&mut services, spec).await?;
        }
        Command::Progress => commands::progress(&services),
        Command::Register => commands::register(&mut services).await,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_difficulty_kinds() {
        assert_eq!(
            parse_exam("Hard").unwrap(),
            ExamSpec::ByDifficulty {
                difficulty: Difficulty::Hard
            }
        );
        assert_eq!(parse_exam("super-hard").unwrap(), ExamSpec::SuperHard);
        assert_eq!(parse_exam("quick").unwrap(), ExamSpec::Quick);
        assert_eq!(parse_exam("random").unwrap(), ExamSpec::RandomMix);
    }

    #[test]
    fn parses_balanced_number() {
        assert_eq!(
            parse_exam("balanced").unwrap(),
            ExamSpec::Balanced { exam_number: 1 }
        );
        assert_eq!(
            parse_exam("balanced:4").unwrap(),
            ExamSpec::Balanced { exam_number: 4 }
        );
        assert!(parse_exam("balanced:0").is_err());
        assert!(parse_exam("balanced:x").is_err());
    }

    #[test]
    fn parses_category_by_name() {
        assert_eq!(
            parse_exam("category:fixed income").unwrap(),
            ExamSpec::ByCategory {
                category: Category::FixedIncome
            }
        );
        assert!(parse_exam("category:Astrology").is_err());
        assert!(parse_exam("hard:2").is_err());
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/progress.db"),
            "sqlite:///tmp/progress.db"
        );
        assert!(normalize_sqlite_url("sqlite:progress.db").starts_with("sqlite:///"));
    }

    #[test]
    fn json_locations_pass_through() {
        assert_eq!(
            parse_progress("Data/progress_data.json".into()).unwrap(),
            ProgressBackend::JsonFile(PathBuf::from("Data/progress_data.json"))
        );
        assert!(parse_progress("  ".into()).is_err());
    }
}
