use std::sync::Arc;

use quiz_core::model::{Catalog, CategoryId, DraftUpdate, PlayerName, QuestionOutcome};
use quiz_core::session::{AdvanceOutcome, QuizSession, SessionPhase, TickOutcome};
use quiz_core::timer::{QUESTION_TIME_LIMIT_SECS, TimerToken};
use storage::repository::ScoreRepository;

use crate::Clock;
use crate::error::QuizServiceError;

/// Orchestrates quiz sessions and persists their records on completion.
///
/// Sessions stay owned by the caller; every operation takes `&mut QuizSession`
/// so one host loop can serialize input and ticks.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    catalog: Arc<Catalog>,
    scores: Arc<dyn ScoreRepository>,
    time_limit_secs: u32,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, scores: Arc<dyn ScoreRepository>) -> Self {
        Self {
            clock,
            catalog,
            scores,
            time_limit_secs: QUESTION_TIME_LIMIT_SECS,
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Open a session for `player` at category selection.
    #[must_use]
    pub fn start_session(&self, player: PlayerName) -> QuizSession {
        QuizSession::new(Arc::clone(&self.catalog), player)
            .with_clock(self.clock)
            .with_time_limit(self.time_limit_secs)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the session rejects the selection.
    pub fn select_category(
        &self,
        session: &mut QuizSession,
        category_id: &CategoryId,
    ) -> Result<TimerToken, QuizServiceError> {
        Ok(session.select_category(category_id)?)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the update is rejected.
    pub fn record_draft_update(
        &self,
        session: &mut QuizSession,
        update: DraftUpdate,
    ) -> Result<(), QuizServiceError> {
        Ok(session.record_draft_update(update)?)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the draft is incomplete or the
    /// session is not answering.
    pub fn submit_answer(
        &self,
        session: &mut QuizSession,
    ) -> Result<QuestionOutcome, QuizServiceError> {
        Ok(session.submit_answer()?)
    }

    /// Advance past feedback, persisting the record if the run completes.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` for rejected transitions and
    /// `QuizServiceError::Storage` if the completed record could not be
    /// stored. In the latter case the session is already `Completed`; call
    /// [`QuizLoopService::persist_completed`] to retry.
    pub async fn advance(
        &self,
        session: &mut QuizSession,
    ) -> Result<AdvanceOutcome, QuizServiceError> {
        let outcome = session.advance()?;
        if matches!(outcome, AdvanceOutcome::Completed(_)) {
            self.persist_completed(session).await?;
        }
        Ok(outcome)
    }

    /// Deliver a tick issued under `token`, persisting on a timed completion.
    ///
    /// # Errors
    ///
    /// Same as [`QuizLoopService::advance`], plus stale or unexpected ticks.
    pub async fn tick(
        &self,
        session: &mut QuizSession,
        token: TimerToken,
    ) -> Result<TickOutcome, QuizServiceError> {
        let outcome = session.tick_with(token)?;
        if matches!(outcome, TickOutcome::Advanced(AdvanceOutcome::Completed(_))) {
            self.persist_completed(session).await?;
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` unless the session is `Completed`.
    pub fn restart_category(
        &self,
        session: &mut QuizSession,
    ) -> Result<TimerToken, QuizServiceError> {
        Ok(session.restart_category()?)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if there is no run to abandon.
    pub fn abandon(&self, session: &mut QuizSession) -> Result<(), QuizServiceError> {
        Ok(session.abandon()?)
    }

    /// Store the completed record if it has not been stored yet.
    ///
    /// Returns the existing id when the record was already persisted.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotCompleted` if the session has no record,
    /// or `QuizServiceError::Storage` if the append fails.
    pub async fn persist_completed(
        &self,
        session: &mut QuizSession,
    ) -> Result<i64, QuizServiceError> {
        if let Some(id) = session.record_id() {
            return Ok(id);
        }
        if session.phase() != SessionPhase::Completed {
            return Err(QuizServiceError::NotCompleted);
        }
        let record = session.record().ok_or(QuizServiceError::NotCompleted)?;

        let id = match self.scores.append_score(record).await {
            Ok(id) => id,
            Err(err) => {
                log::error!("failed to persist score for {}: {err}", record.player_name());
                return Err(err.into());
            }
        };
        log::info!("persisted score record {id}");
        session.set_record_id(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Category, Question, QuestionId, QuestionKind};
    use quiz_core::session::SessionError;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn catalog() -> Arc<Catalog> {
        let questions = (1..=2)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Claim {id}"),
                    "",
                    QuestionKind::TrueFalse { correct: true },
                )
                .unwrap()
            })
            .collect();
        let category = Category::new(CategoryId::new("myths"), "Myths", "", questions).unwrap();
        Arc::new(Catalog::new(vec![category]).unwrap())
    }

    fn service(repo: &InMemoryRepository) -> QuizLoopService {
        QuizLoopService::new(Clock::fixed(fixed_now()), catalog(), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn persists_once_on_completion() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut session = svc.start_session(PlayerName::new("Ei Ei").unwrap());

        svc.select_category(&mut session, &CategoryId::new("myths"))
            .unwrap();
        for _ in 0..2 {
            svc.record_draft_update(&mut session, DraftUpdate::Boolean(true))
                .unwrap();
            svc.submit_answer(&mut session).unwrap();
            svc.advance(&mut session).await.unwrap();
        }

        let id = session.record_id().expect("record persisted");
        assert_eq!(repo.count_scores().await.unwrap(), 1);
        assert_eq!(repo.get_score(id).await.unwrap().score(), 2);

        assert_eq!(svc.persist_completed(&mut session).await.unwrap(), id);
        assert_eq!(repo.count_scores().await.unwrap(), 1);

        let err = svc.advance(&mut session).await.unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::Session(SessionError::InvalidTransition { .. })
        ));
        assert_eq!(repo.count_scores().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn persist_requires_completion() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut session = svc.start_session(PlayerName::new("Ko Ko").unwrap());

        let err = svc.persist_completed(&mut session).await.unwrap_err();
        assert!(matches!(err, QuizServiceError::NotCompleted));
    }

    #[tokio::test]
    async fn timed_completion_is_persisted() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo).with_time_limit(1);
        let mut session = svc.start_session(PlayerName::new("Ma Ma").unwrap());

        svc.select_category(&mut session, &CategoryId::new("myths"))
            .unwrap();
        while session.phase() != SessionPhase::Completed {
            let token = session.timer_token().expect("session accepts ticks");
            svc.tick(&mut session, token).await.unwrap();
        }

        let record = repo
            .get_score(session.record_id().unwrap())
            .await
            .unwrap();
        assert_eq!(record.score(), 0);
        assert_eq!(record.elapsed_seconds(), 2);
    }
}
