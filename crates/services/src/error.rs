//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::PlayerNameError;
use quiz_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `QuizLoopService` and `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("session has not completed")]
    NotCompleted,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PlayerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerServiceError {
    #[error(transparent)]
    Name(#[from] PlayerNameError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
