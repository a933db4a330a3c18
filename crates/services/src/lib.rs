#![forbid(unsafe_code)]

pub mod error;
pub mod leaderboard;
pub mod player_service;
pub mod quiz_loop;
pub mod ticker;

pub use quiz_core::Clock;

pub use error::{PlayerServiceError, QuizServiceError};
pub use leaderboard::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardEntry, LeaderboardService};
pub use player_service::PlayerService;
pub use quiz_loop::QuizLoopService;
pub use ticker::Ticker;
