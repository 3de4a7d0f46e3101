use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{QuizConfigDraft, ResultFilter, RetakeFilter};

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Extract { files: Vec<PathBuf> },
    /// `-` reads from stdin.
    Text { file: PathBuf },
    Sample,
    Generate(QuizConfigDraft),
    Take,
    Results { filter: ResultFilter },
    Retake {
        filter: RetakeFilter,
        /// One-based, as listed by `history`.
        history: Option<usize>,
    },
    History,
    Review { entry: usize },
    Clear { history: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [--db <sqlite_url>] <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  extract <image|pdf>...       OCR pages into the document text");
    eprintln!("  text <file|->                use a text file as the document");
    eprintln!("  sample                       use the built-in sample document");
    eprintln!("  generate [options]           generate a quiz from the document");
    eprintln!("      --questions N  --options 4|5  --mode per-question|whole-quiz");
    eprintln!("      --timer SECONDS  --difficulty easy|medium|hard");
    eprintln!("      --focus any|facts|concepts|cause-effect  --keywords TEXT");
    eprintln!("      --enrich  --explanations immediate|end");
    eprintln!("  take                         take the active quiz");
    eprintln!("  results [--filter all|correct|incorrect]");
    eprintln!("  retake [--incorrect] [--history N]");
    eprintln!("  history                      list past attempts, newest first");
    eprintln!("  review N                     open history entry N as the last result");
    eprintln!("  clear [--history]            drop the active quiz (and history)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL (default {DEFAULT_DB_URL}), QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL,");
    eprintln!("  QUIZ_AI_MODEL, QUIZ_AI_VISION_MODEL, QUIZ_AI_TIMEOUT_SECS, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidValue { flag, raw })
}

fn parse_entry(raw: &str, flag: &'static str) -> Result<usize, ArgsError> {
    match raw.parse::<usize>() {
        Ok(entry) if entry > 0 => Ok(entry),
        _ => Err(ArgsError::InvalidValue {
            flag,
            raw: raw.to_string(),
        }),
    }
}

impl Args {
    /// `Ok(None)` means help was requested.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut db_url = env_db_url.map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let mut rest = Vec::new();
        let mut argv = argv.into_iter();
        while let Some(arg) = argv.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut argv, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(None),
                _ => rest.push(arg),
            }
        }

        let mut rest = rest.into_iter();
        let name = rest.next().ok_or(ArgsError::MissingCommand)?;
        let command = match name.as_str() {
            "extract" => parse_extract(&mut rest)?,
            "text" => parse_text(&mut rest)?,
            "sample" => no_args(&mut rest, Command::Sample)?,
            "generate" => parse_generate(&mut rest)?,
            "take" => no_args(&mut rest, Command::Take)?,
            "results" => parse_results(&mut rest)?,
            "retake" => parse_retake(&mut rest)?,
            "history" => no_args(&mut rest, Command::History)?,
            "review" => parse_review(&mut rest)?,
            "clear" => parse_clear(&mut rest)?,
            "help" => return Ok(None),
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        Ok(Some(Self { db_url, command }))
    }
}

fn no_args(args: &mut impl Iterator<Item = String>, command: Command) -> Result<Command, ArgsError> {
    match args.next() {
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
        None => Ok(command),
    }
}

fn parse_extract(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let files: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if files.is_empty() {
        return Err(ArgsError::MissingArgument {
            what: "image or PDF path",
        });
    }
    Ok(Command::Extract { files })
}

fn parse_text(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let file = args
        .next()
        .ok_or(ArgsError::MissingArgument { what: "text file" })?;
    no_args(args, Command::Text { file: file.into() })
}

fn parse_generate(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut draft = QuizConfigDraft::with_defaults();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--questions" => draft.question_count = Some(parse_value(args, "--questions")?),
            "--options" => draft.options_per_question = Some(parse_value(args, "--options")?),
            "--mode" => draft.timer_mode = Some(parse_value(args, "--mode")?),
            "--timer" => draft.timer_seconds = Some(parse_value(args, "--timer")?),
            "--difficulty" => draft.difficulty = Some(parse_value(args, "--difficulty")?),
            "--focus" => draft.question_focus = Some(parse_value(args, "--focus")?),
            "--keywords" => draft.keywords = Some(require_value(args, "--keywords")?),
            "--enrich" => draft.explanation_enrichment = true,
            "--explanations" => {
                draft.explanation_timing = Some(parse_value(args, "--explanations")?);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Generate(draft))
}

fn parse_results(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut filter = ResultFilter::All;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--filter" => {
                let raw = require_value(args, "--filter")?;
                filter = match raw.as_str() {
                    "all" => ResultFilter::All,
                    "correct" => ResultFilter::Correct,
                    "incorrect" => ResultFilter::Incorrect,
                    _ => {
                        return Err(ArgsError::InvalidValue {
                            flag: "--filter",
                            raw,
                        });
                    }
                };
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Results { filter })
}

fn parse_retake(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut filter = RetakeFilter::All;
    let mut history = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--incorrect" => filter = RetakeFilter::IncorrectOnly,
            "--history" => {
                let raw = require_value(args, "--history")?;
                history = Some(parse_entry(&raw, "--history")?);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Retake { filter, history })
}

fn parse_review(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let raw = args.next().ok_or(ArgsError::MissingArgument {
        what: "history entry number",
    })?;
    let entry = parse_entry(&raw, "review")?;
    no_args(args, Command::Review { entry })
}

fn parse_clear(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut history = false;
    for arg in args {
        match arg.as_str() {
            "--history" => history = true,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Clear { history })
}

pub fn normalize_sqlite_url(raw: String) -> String {
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
