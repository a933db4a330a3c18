use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::Clock;
use crate::aggregate;
use crate::model::{
    AnswerDraft, Catalog, Category, CategoryId, DraftError, DraftUpdate, PlayerName, Question,
    QuestionOutcome, ScoreRecord, ScoreRecordError,
};
use crate::timer::{Countdown, QuestionTimer, TimerState, TimerToken};
use crate::validator::{is_answer_provided, is_correct};

//
// ─── PHASES & ERRORS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    SelectingCategory,
    Answering,
    ShowingFeedback,
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::SelectingCategory => "selecting a category",
            SessionPhase::Answering => "answering",
            SessionPhase::ShowingFeedback => "showing feedback",
            SessionPhase::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Session operations, named in transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SelectCategory,
    RecordDraft,
    Submit,
    Advance,
    Tick,
    Restart,
    Abandon,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::SelectCategory => "select a category",
            Operation::RecordDraft => "edit the answer",
            Operation::Submit => "submit",
            Operation::Advance => "advance",
            Operation::Tick => "tick",
            Operation::Restart => "restart",
            Operation::Abandon => "abandon",
        };
        f.write_str(label)
    }
}

/// A rejected session operation. The session is unchanged whenever one of
/// these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {operation} while {phase}")]
    InvalidTransition {
        operation: Operation,
        phase: SessionPhase,
    },

    #[error("answer is incomplete")]
    IncompleteAnswer,

    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("tick from timer generation {generation} is stale")]
    StaleTick { generation: u64 },

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Record(#[from] ScoreRecordError),
}

//
// ─── OUTCOMES & SNAPSHOTS ──────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to question `index`; the countdown was re-armed with `token`.
    NextQuestion { index: usize, token: TimerToken },
    /// The last question was passed. Emitted exactly once per run.
    Completed(ScoreRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running {
        remaining: u32,
    },
    /// Time ran out; the draft was submitted as-is and an automatic advance
    /// waits for the tick carrying `advance_token`.
    TimedOut {
        outcome: QuestionOutcome,
        advance_token: TimerToken,
    },
    Advanced(AdvanceOutcome),
}

/// Session-scoped counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub category_id: Option<CategoryId>,
    pub current_question_index: usize,
    pub score: u32,
    pub seconds_remaining_on_question: u32,
    pub total_elapsed_seconds: u32,
    pub phase: SessionPhase,
}

/// Everything a front end needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot<'a> {
    pub state: SessionState,
    pub category_name: Option<&'a str>,
    pub total_questions: usize,
    pub question: Option<&'a Question>,
    pub draft: Option<&'a AnswerDraft>,
    pub answer_provided: bool,
    pub last_outcome: Option<QuestionOutcome>,
    pub advance_pending: bool,
    pub record: Option<&'a ScoreRecord>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

struct Run {
    category: usize,
    current: usize,
    score: u32,
    total_elapsed: u32,
    draft: AnswerDraft,
    outcomes: Vec<QuestionOutcome>,
    record: Option<ScoreRecord>,
    record_id: Option<i64>,
}

/// One player's quiz session over a shared catalog.
///
/// Drives `SelectingCategory → Answering ⇄ ShowingFeedback → Completed`.
/// The session owns its countdown: the timer is disarmed before every
/// transition out of `Answering` and re-armed after every transition into it,
/// so a tick issued for an earlier question can never touch a later one.
pub struct QuizSession {
    catalog: Arc<Catalog>,
    player: PlayerName,
    clock: Clock,
    timer: QuestionTimer,
    phase: SessionPhase,
    run: Option<Run>,
}

impl QuizSession {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, player: PlayerName) -> Self {
        Self {
            catalog,
            player,
            clock: Clock::default_clock(),
            timer: QuestionTimer::default(),
            phase: SessionPhase::SelectingCategory,
            run: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.timer = QuestionTimer::new(secs);
        self
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn category(&self) -> Option<&Category> {
        self.run.as_ref().and_then(|run| self.catalog.get(run.category))
    }

    /// The question being answered or reviewed.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Answering | SessionPhase::ShowingFeedback => {
                let run = self.run.as_ref()?;
                self.catalog.get(run.category)?.question(run.current)
            }
            SessionPhase::SelectingCategory | SessionPhase::Completed => None,
        }
    }

    #[must_use]
    pub fn draft(&self) -> Option<&AnswerDraft> {
        match self.phase {
            SessionPhase::Answering | SessionPhase::ShowingFeedback => {
                self.run.as_ref().map(|run| &run.draft)
            }
            SessionPhase::SelectingCategory | SessionPhase::Completed => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.run.as_ref().map_or(0, |run| run.score)
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        match &self.run {
            Some(run) => &run.outcomes,
            None => &[],
        }
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<QuestionOutcome> {
        match self.phase {
            SessionPhase::ShowingFeedback | SessionPhase::Completed => {
                self.outcomes().last().copied()
            }
            SessionPhase::SelectingCategory | SessionPhase::Answering => None,
        }
    }

    /// The record emitted when this run completed.
    #[must_use]
    pub fn record(&self) -> Option<&ScoreRecord> {
        self.run.as_ref().and_then(|run| run.record.as_ref())
    }

    /// Storage id of the persisted record, once the persistence layer has one.
    #[must_use]
    pub fn record_id(&self) -> Option<i64> {
        self.run.as_ref().and_then(|run| run.record_id)
    }

    /// Remember where the completed record was stored.
    ///
    /// Ignored unless the session is `Completed`.
    pub fn set_record_id(&mut self, id: i64) {
        if self.phase != SessionPhase::Completed {
            return;
        }
        if let Some(run) = self.run.as_mut() {
            run.record_id = Some(id);
        }
    }

    /// Token a tick source must present, if the session accepts ticks now.
    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.timer.remaining_secs()
    }

    #[must_use]
    pub fn is_advance_pending(&self) -> bool {
        self.phase == SessionPhase::ShowingFeedback
            && self.timer.state() == TimerState::AdvancePending
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState {
            category_id: self.category().map(|c| c.id().clone()),
            current_question_index: self.run.as_ref().map_or(0, |run| run.current),
            score: self.score(),
            seconds_remaining_on_question: self.timer.remaining_secs(),
            total_elapsed_seconds: self.run.as_ref().map_or(0, |run| run.total_elapsed),
            phase: self.phase,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        let question = self.current_question();
        let draft = self.draft();
        let answer_provided = match (question, draft) {
            (Some(q), Some(d)) if self.phase == SessionPhase::Answering => {
                is_answer_provided(d, q.question_type())
            }
            _ => false,
        };

        SessionSnapshot {
            state: self.state(),
            category_name: self.category().map(Category::name),
            total_questions: self.category().map_or(0, Category::len),
            question,
            draft,
            answer_provided,
            last_outcome: self.last_outcome(),
            advance_pending: self.is_advance_pending(),
            record: self.record(),
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Start a run over `category_id` from the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `SelectingCategory` and
    /// `Completed`, and `SessionError::UnknownCategory` for an id not in the
    /// catalog.
    pub fn select_category(
        &mut self,
        category_id: &CategoryId,
    ) -> Result<TimerToken, SessionError> {
        self.require(
            Operation::SelectCategory,
            &[SessionPhase::SelectingCategory, SessionPhase::Completed],
        )?;
        let index = self
            .catalog
            .position(category_id)
            .ok_or_else(|| SessionError::UnknownCategory(category_id.clone()))?;
        Ok(self.start_run(index))
    }

    /// Merge a partial answer into the current draft.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Answering` and
    /// `SessionError::Draft` if the update does not fit the current question.
    pub fn record_draft_update(&mut self, update: DraftUpdate) -> Result<(), SessionError> {
        self.require(Operation::RecordDraft, &[SessionPhase::Answering])?;
        let catalog = Arc::clone(&self.catalog);
        let (run, question) = active_run(&catalog, self.run.as_mut(), Operation::RecordDraft)?;
        run.draft.apply(question, update)?;
        Ok(())
    }

    /// Grade the current draft and show feedback.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Answering` and
    /// `SessionError::IncompleteAnswer` if the draft is not complete.
    pub fn submit_answer(&mut self) -> Result<QuestionOutcome, SessionError> {
        self.require(Operation::Submit, &[SessionPhase::Answering])?;
        let provided = match (self.current_question(), self.draft()) {
            (Some(question), Some(draft)) => is_answer_provided(draft, question.question_type()),
            _ => false,
        };
        if !provided {
            return Err(SessionError::IncompleteAnswer);
        }
        self.finalize_answer(false)
    }

    /// Move past the feedback for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `ShowingFeedback`; in
    /// particular a completed session never emits a second record.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        self.require(Operation::Advance, &[SessionPhase::ShowingFeedback])?;
        let catalog = Arc::clone(&self.catalog);
        let run = self.run.as_mut().ok_or(SessionError::InvalidTransition {
            operation: Operation::Advance,
            phase: self.phase,
        })?;
        let category = catalog
            .get(run.category)
            .ok_or(SessionError::InvalidTransition {
                operation: Operation::Advance,
                phase: self.phase,
            })?;

        let next = run.current + 1;
        if let Some(question) = category.question(next) {
            self.timer.disarm();
            run.current = next;
            run.draft = AnswerDraft::empty_for(question);
            self.phase = SessionPhase::Answering;
            let token = self.timer.arm();
            log::debug!("category {}: question {} of {}", category.id(), next + 1, category.len());
            return Ok(AdvanceOutcome::NextQuestion { index: next, token });
        }

        let record = aggregate::finalize(
            &run.outcomes,
            category,
            &self.player,
            run.total_elapsed,
            self.clock.now(),
        )?;
        self.timer.disarm();
        run.record = Some(record.clone());
        self.phase = SessionPhase::Completed;
        log::info!(
            "{} completed {} with {}/{} in {}s",
            record.player_name(),
            record.category_id(),
            record.score(),
            record.total(),
            record.elapsed_seconds()
        );
        Ok(AdvanceOutcome::Completed(record))
    }

    /// Deliver a tick from a serialized host loop.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::tick_with`].
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        let token = self.timer.token().ok_or(SessionError::InvalidTransition {
            operation: Operation::Tick,
            phase: self.phase,
        })?;
        self.tick_with(token)
    }

    /// Deliver a tick issued under `token`.
    ///
    /// While answering, one second is counted down and added to the session's
    /// elapsed time. When the countdown reaches zero the current draft is
    /// submitted regardless of completeness, and the next accepted tick
    /// advances the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleTick` for a token from an earlier timer
    /// generation and `SessionError::InvalidTransition` when the session is
    /// not accepting ticks.
    pub fn tick_with(&mut self, token: TimerToken) -> Result<TickOutcome, SessionError> {
        match (self.phase, self.timer.state()) {
            (SessionPhase::Answering, TimerState::Counting) => {
                self.reject_stale(token)?;
                if let Some(run) = self.run.as_mut() {
                    run.total_elapsed = run.total_elapsed.saturating_add(1);
                }
                match self.timer.countdown() {
                    Countdown::Running { remaining } => Ok(TickOutcome::Running { remaining }),
                    Countdown::Expired => {
                        let outcome = self.finalize_answer(true)?;
                        let advance_token = self.timer.schedule_advance();
                        Ok(TickOutcome::TimedOut {
                            outcome,
                            advance_token,
                        })
                    }
                }
            }
            (SessionPhase::ShowingFeedback, TimerState::AdvancePending) => {
                self.reject_stale(token)?;
                Ok(TickOutcome::Advanced(self.advance()?))
            }
            (phase, _) => Err(SessionError::InvalidTransition {
                operation: Operation::Tick,
                phase,
            }),
        }
    }

    /// Play the same category again from the start.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is `Completed`.
    pub fn restart_category(&mut self) -> Result<TimerToken, SessionError> {
        self.require(Operation::Restart, &[SessionPhase::Completed])?;
        let index = self.run.as_ref().map(|run| run.category).ok_or(
            SessionError::InvalidTransition {
                operation: Operation::Restart,
                phase: self.phase,
            },
        )?;
        Ok(self.start_run(index))
    }

    /// Discard the current run and go back to category selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` if no run is active.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.require(
            Operation::Abandon,
            &[
                SessionPhase::Answering,
                SessionPhase::ShowingFeedback,
                SessionPhase::Completed,
            ],
        )?;
        self.timer.disarm();
        self.run = None;
        self.phase = SessionPhase::SelectingCategory;
        log::debug!("{} returned to category selection", self.player);
        Ok(())
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn require(&self, operation: Operation, allowed: &[SessionPhase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }

    fn reject_stale(&self, token: TimerToken) -> Result<(), SessionError> {
        if self.timer.accepts(token) {
            return Ok(());
        }
        log::warn!(
            "dropping stale tick (generation {}) while {}",
            token.generation(),
            self.phase
        );
        Err(SessionError::StaleTick {
            generation: token.generation(),
        })
    }

    fn start_run(&mut self, category_index: usize) -> TimerToken {
        self.timer.disarm();
        let draft = self
            .catalog
            .get(category_index)
            .and_then(|c| c.question(0))
            .map_or(AnswerDraft::TrueFalse(None), AnswerDraft::empty_for);
        self.run = Some(Run {
            category: category_index,
            current: 0,
            score: 0,
            total_elapsed: 0,
            draft,
            outcomes: Vec::new(),
            record: None,
            record_id: None,
        });
        self.phase = SessionPhase::Answering;
        let token = self.timer.arm();
        if let Some(category) = self.category() {
            log::debug!(
                "{} started {} ({} questions)",
                self.player,
                category.id(),
                category.len()
            );
        }
        token
    }

    /// Single grading path shared by player submission and timer expiry.
    ///
    /// The timer is disarmed before the phase changes.
    fn finalize_answer(&mut self, timed_out: bool) -> Result<QuestionOutcome, SessionError> {
        let catalog = Arc::clone(&self.catalog);
        let (run, question) = active_run(&catalog, self.run.as_mut(), Operation::Submit)?;

        let seconds_spent = self.timer.elapsed_secs();
        self.timer.disarm();

        let correct = is_correct(question, &run.draft);
        if correct {
            run.score = run.score.saturating_add(1);
        }
        let outcome = QuestionOutcome {
            question_id: question.id(),
            correct,
            timed_out,
            seconds_spent,
        };
        run.outcomes.push(outcome);
        self.phase = SessionPhase::ShowingFeedback;

        log::debug!(
            "question {} answered: correct={correct} timed_out={timed_out}",
            question.id()
        );
        Ok(outcome)
    }
}

fn active_run<'c, 'r>(
    catalog: &'c Catalog,
    run: Option<&'r mut Run>,
    operation: Operation,
) -> Result<(&'r mut Run, &'c Question), SessionError> {
    let phase = SessionPhase::Answering;
    let run = run.ok_or(SessionError::InvalidTransition { operation, phase })?;
    let question = catalog
        .get(run.category)
        .and_then(|c| c.question(run.current))
        .ok_or(SessionError::InvalidTransition { operation, phase })?;
    Ok((run, question))
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("player", &self.player)
            .field("phase", &self.phase)
            .field("state", &self.state())
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
