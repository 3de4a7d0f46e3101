mod args;
mod error;
mod render;
mod take;

use std::path::Path;

use quiz_core::model::{QuizConfigDraft, ResultFilter};
use services::{Clock, ExtractionRequest, QuizContext};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, ArgsError, Command, print_usage};
use crate::error::CliError;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn mime_for(path: &Path) -> Result<&'static str, CliError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        Some("webp") => Ok("image/webp"),
        Some("gif") => Ok("image/gif"),
        Some("pdf") => Ok("application/pdf"),
        _ => Err(CliError::UnsupportedFile(path.display().to_string())),
    }
}

async fn extract(ctx: &QuizContext, files: &[std::path::PathBuf]) -> Result<(), CliError> {
    let mut pages = Vec::with_capacity(files.len());
    for file in files {
        let mime = mime_for(file)?;
        pages.push((tokio::fs::read(file).await?, mime));
    }
    let request =
        ExtractionRequest::from_pages(pages.iter().map(|(bytes, mime)| (bytes.as_slice(), *mime)))?;
    println!("Extracting text from {} file(s)...", files.len());
    let text = ctx.creation().extract_text(&request).await?;
    println!("{text}");
    println!();
    println!("Text extracted. Edit it with `quiz text <file>` or continue with `quiz generate`.");
    Ok(())
}

async fn load_text(file: &Path) -> Result<String, CliError> {
    if file == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        Ok(text)
    } else {
        Ok(tokio::fs::read_to_string(file).await?)
    }
}

async fn generate(ctx: &QuizContext, draft: QuizConfigDraft) -> Result<(), CliError> {
    let config = draft.validate()?;
    println!("Generating {} question(s)...", config.question_count());
    let quiz = ctx.creation().generate(config).await?;
    println!(
        "Generated {} question(s). Run `quiz take` to start.",
        quiz.questions.len()
    );
    Ok(())
}

async fn dispatch(ctx: &QuizContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Extract { files } => extract(ctx, &files).await?,
        Command::Text { file } => {
            let text = load_text(&file).await?;
            ctx.creation().save_document_text(&text).await?;
            println!(
                "Saved {} characters. Run `quiz generate` next.",
                text.trim().chars().count()
            );
        }
        Command::Sample => {
            ctx.creation().use_sample_text().await?;
            println!("Loaded the sample document. Run `quiz generate` next.");
        }
        Command::Generate(draft) => generate(ctx, draft).await?,
        Command::Take => {
            take::run(ctx).await?;
        }
        Command::Results { filter } => {
            let result = ctx.results().last_result().await?;
            print!("{}", render::result(&result, filter));
        }
        Command::Retake { filter, history } => {
            let results = ctx.results();
            let quiz = match history {
                Some(entry) => results.retake_from_history(entry - 1, filter).await?,
                None => {
                    let result = results.last_result().await?;
                    results.retake(&result, filter).await?
                }
            };
            println!(
                "{}: {} question(s). Run `quiz take` to start.",
                quiz.document_text,
                quiz.questions.len()
            );
        }
        Command::History => {
            let history = ctx.results().history().await?;
            print!("{}", render::history(&history));
        }
        Command::Review { entry } => {
            let result = ctx.results().review_from_history(entry - 1).await?;
            print!("{}", render::result(&result, ResultFilter::All));
        }
        Command::Clear { history } => {
            ctx.clear_quiz_state().await?;
            if history {
                ctx.results().clear_history().await?;
            }
            println!("Cleared.");
        }
    }
    Ok(())
}

async fn run() -> Result<(), CliError> {
    let argv = std::env::args().skip(1);
    let parsed = match Args::parse(argv, std::env::var("QUIZ_DB_URL").ok()) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            print_usage();
            return Err(err.into());
        }
    };

    prepare_sqlite_file(&parsed.db_url)?;
    info!(db = %parsed.db_url, "opening quiz database");
    let ctx = QuizContext::sqlite(&parsed.db_url, Clock::default()).await?;
    dispatch(&ctx, parsed.command).await
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), CliError> {
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

    let path = Path::new(path);
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

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
