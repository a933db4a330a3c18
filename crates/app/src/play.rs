//! Interactive terminal session.
//!
//! One `tokio::select!` loop owns the session and serializes stdin lines with
//! timer ticks, so the session never sees two operations at once.

use quiz_core::model::PlayerName;
use quiz_core::session::{AdvanceOutcome, QuizSession, SessionError, SessionPhase, TickOutcome};
use services::{PlayerService, QuizLoopService, QuizServiceError, Ticker};
use tokio::io::{AsyncBufRead, Lines};

use crate::input::{Input, parse_line};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Resolve the player's name: the flag wins, then a remembered name, then a prompt.
///
/// Returns `None` if stdin closes before a valid name is entered.
///
/// # Errors
///
/// Returns an error on storage or stdin failures, or if `flag` is too short.
pub async fn resolve_player<R>(
    players: &PlayerService,
    flag: Option<&str>,
    lines: &mut Lines<R>,
) -> Result<Option<PlayerName>, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    if let Some(raw) = flag {
        return Ok(Some(players.remember(raw).await?));
    }
    if let Some(name) = players.remembered().await? {
        println!("Welcome back, {name}!");
        return Ok(Some(name));
    }

    loop {
        println!("What's your name?");
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        match players.remember(&line).await {
            Ok(name) => return Ok(Some(name)),
            Err(services::PlayerServiceError::Name(err)) => println!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }
}

/// Run the quiz until the player quits or stdin closes.
///
/// # Errors
///
/// Returns an error only for stdin failures; rejected operations and failed
/// saves are reported to the player and the loop continues.
pub async fn run_session<R>(
    svc: &QuizLoopService,
    player: PlayerName,
    lines: &mut Lines<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut session = svc.start_session(player);
    let mut ticker = Ticker::every_second();
    println!("{}", render::category_menu(svc.catalog()));

    loop {
        ticker.follow(session.timer_token());
        let flow = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(svc, &mut session, &line).await,
                None => Flow::Quit,
            },
            token = ticker.tick() => {
                handle_tick(svc, &mut session, token).await;
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn handle_line(svc: &QuizLoopService, session: &mut QuizSession, line: &str) -> Flow {
    let input = parse_line(
        line,
        session.phase(),
        svc.catalog(),
        session.current_question(),
    );

    let result = match input {
        Input::Quit => return Flow::Quit,
        Input::Help => {
            println!("{}", render::HELP);
            Ok(())
        }
        Input::Ignore => Ok(()),
        Input::Invalid(message) => {
            println!("{message}");
            Ok(())
        }
        Input::Select(id) => svc.select_category(session, &id).map(|_| show_question(session)),
        Input::Update(update) => svc
            .record_draft_update(session, update)
            .map(|()| show_question(session)),
        Input::Submit => svc.submit_answer(session).map(|_| show_feedback(session)),
        Input::Next => svc
            .advance(session)
            .await
            .map(|outcome| show_advance(session, &outcome)),
        Input::Restart => svc.restart_category(session).map(|_| show_question(session)),
        Input::Back => svc.abandon(session).map(|()| {
            println!("{}", render::category_menu(svc.catalog()));
        }),
        Input::Save => svc.persist_completed(session).await.map(|id| {
            println!("Score saved (#{id}).");
        }),
    };

    if let Err(err) = result {
        report(session, &err);
    }
    Flow::Continue
}

async fn handle_tick(
    svc: &QuizLoopService,
    session: &mut QuizSession,
    token: quiz_core::timer::TimerToken,
) {
    match svc.tick(session, token).await {
        Ok(TickOutcome::Running { remaining }) => {
            if remaining % 10 == 0 || remaining <= 5 {
                println!("  {} left", render::format_timer(remaining));
            }
        }
        Ok(TickOutcome::TimedOut { .. }) => show_feedback(session),
        Ok(TickOutcome::Advanced(outcome)) => show_advance(session, &outcome),
        // The session moved on between scheduling and delivery.
        Err(QuizServiceError::Session(SessionError::StaleTick { .. })) => {}
        Err(err) => report(session, &err),
    }
}

fn show_question(session: &QuizSession) {
    println!("{}", render::question_view(&session.snapshot()));
}

fn show_feedback(session: &QuizSession) {
    let snapshot = session.snapshot();
    if let (Some(question), Some(outcome)) = (snapshot.question, snapshot.last_outcome) {
        println!(
            "{}",
            render::feedback(question, &outcome, snapshot.advance_pending)
        );
    }
}

fn show_advance(session: &QuizSession, outcome: &AdvanceOutcome) {
    match outcome {
        AdvanceOutcome::NextQuestion { .. } => show_question(session),
        AdvanceOutcome::Completed(record) => println!("{}", render::final_result(record)),
    }
}

fn report(session: &QuizSession, err: &QuizServiceError) {
    match err {
        QuizServiceError::Storage(_) if session.phase() == SessionPhase::Completed => {
            if let Some(record) = session.record() {
                println!("{}", render::final_result(record));
            }
            println!("Your score could not be saved ({err}). Type :save to try again.");
        }
        QuizServiceError::Session(SessionError::IncompleteAnswer) => {
            println!("Finish your answer before submitting.");
        }
        _ => println!("{err}"),
    }
}
