use std::future::Future;
use std::io::Write as _;
use std::pin::Pin;

use quiz_core::model::{
    ExplanationTiming, Navigation, QuizEvent, QuizResult, QuizSession, ResultFilter,
    Selection, TickOutcome, Transition,
};
use services::{CountdownTicker, QuizContext, QuizFlowError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::CliError;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Event(QuizEvent),
    Simplify,
    Submit,
    Help,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "" | "n" | "next" => Input::Event(QuizEvent::Advance),
        "p" | "prev" | "previous" | "back" => Input::Event(QuizEvent::Retreat),
        "s" | "simplify" => Input::Simplify,
        "submit" | "done" | "q" => Input::Submit,
        "?" | "h" | "help" => Input::Help,
        other => match other.parse::<usize>() {
            Ok(choice) if choice > 0 => Input::Event(QuizEvent::Select(choice - 1)),
            _ => Input::Unknown,
        },
    }
}

/// Announce a countdown value only at a few checkpoints.
fn should_announce(remaining: u32) -> bool {
    remaining <= 5 || remaining % 10 == 0
}

fn show(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

async fn next_tick(ticker: &mut Option<CountdownTicker>) -> Option<()> {
    match ticker {
        Some(ticker) => ticker.recv().await,
        None => std::future::pending().await,
    }
}

/// An in-flight simplification request.
type Simplifying<'a> = Pin<Box<dyn Future<Output = Result<String, QuizFlowError>> + 'a>>;

/// Resolves once the pending request finishes. The request itself stays in
/// `pending` if this future is dropped.
async fn simplified(
    pending: &mut Option<Simplifying<'_>>,
) -> Option<Result<String, QuizFlowError>> {
    match pending {
        Some(request) => Some(request.await),
        None => None,
    }
}

/// Run the active quiz on stdin/stdout until it is submitted or time runs
/// out, then persist and print the result.
pub async fn run(ctx: &QuizContext) -> Result<QuizResult, CliError> {
    drive(ctx, BufReader::new(tokio::io::stdin())).await
}

async fn drive<R>(ctx: &QuizContext, input: R) -> Result<QuizResult, CliError>
where
    R: AsyncBufRead + Unpin,
{
    let taking = ctx.taking();
    let mut session = taking.start().await?;
    let mut lines = input.lines();
    let mut ticker = Some(CountdownTicker::every_second());
    let mut simplifying: Option<Simplifying<'_>> = None;

    println!(
        "Timer: {} ({}s). Type `?` for help.",
        session.config().timer_mode(),
        session.config().timer_seconds()
    );
    show(&render::question(&session));
    show(&render::prompt(&session));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed; submitting");
                    break;
                };
                match parse_input(&line) {
                    Input::Submit => break,
                    Input::Help => println!(
                        "Enter an option number to answer, `n`/Enter for next, `p` for previous, \
                         `s` to simplify the explanation, `submit` to finish."
                    ),
                    Input::Unknown => println!("Unrecognised input: {}", line.trim()),
                    Input::Simplify if simplifying.is_some() => {
                        println!("Still simplifying the previous explanation.");
                    }
                    Input::Simplify => simplifying = simplify(ctx, &session),
                    Input::Event(event) => match session.handle(event) {
                        Ok(transition) => on_transition(&session, transition),
                        Err(err) => println!("{err}"),
                    },
                }
                show(&render::prompt(&session));
            }
            Some(()) = next_tick(&mut ticker) => {
                match session.handle(QuizEvent::Tick) {
                    Ok(Transition::Ticked(TickOutcome::TimeUp)) => {
                        println!("\nTime's up! Submitting your answers.");
                        break;
                    }
                    Ok(transition) => {
                        if on_tick(&session, transition) {
                            show(&render::prompt(&session));
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            Some(outcome) = simplified(&mut simplifying), if simplifying.is_some() => {
                simplifying = None;
                match outcome {
                    Ok(text) => println!("\nIn simple terms: {}", render::markup(&text)),
                    Err(err) => println!("\n{}", err.user_message()),
                }
                show(&render::prompt(&session));
            }
        }
    }

    if let Some(mut ticker) = ticker.take() {
        ticker.cancel();
    }

    let result = taking.submit(session).await?;
    println!();
    show(&render::result(&result, ResultFilter::All));
    Ok(result)
}

fn on_transition(session: &QuizSession, transition: Transition) {
    match transition {
        Transition::Selected(Selection::Recorded(_)) => {
            if session.config().explanation_timing() == ExplanationTiming::Immediate {
                show(&render::feedback(
                    session.current_question(),
                    session.current_answer(),
                ));
            } else {
                println!("Answer recorded.");
            }
        }
        Transition::Selected(Selection::AlreadyAnswered(_)) => {
            println!("This question is already answered.");
        }
        Transition::Navigated(Navigation::Moved(_)) => show(&render::question(session)),
        Transition::Navigated(Navigation::AtBoundary(_)) => {
            if session.is_last() {
                println!("This is the last question. Type `submit` to finish.");
            } else {
                println!("This is the first question.");
            }
        }
        Transition::Ticked(_) => {}
    }
}

/// Returns whether anything was printed.
fn on_tick(session: &QuizSession, transition: Transition) -> bool {
    match transition {
        Transition::Ticked(TickOutcome::Running(remaining)) if should_announce(remaining) => {
            println!("\n[{remaining}s left]");
            true
        }
        Transition::Ticked(TickOutcome::AutoAdvanced(_)) => {
            println!("\nTime's up for that question.");
            show(&render::question(session));
            true
        }
        Transition::Ticked(TickOutcome::TimedOutOnLast) => {
            println!("\nTime's up on the last question. Type `submit` to finish.");
            true
        }
        _ => false,
    }
}

/// Start simplifying the current explanation; the countdown keeps running
/// while the request is out.
fn simplify<'a>(ctx: &'a QuizContext, session: &QuizSession) -> Option<Simplifying<'a>> {
    if session.current_answer().is_none() {
        println!("Answer the question first.");
        return None;
    }
    println!("Simplifying...");
    let question = session.current_question().clone();
    Some(Box::pin(async move {
        ctx.taking().simplify_explanation(&question).await
    }))
}
