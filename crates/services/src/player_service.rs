use std::sync::Arc;

use quiz_core::model::PlayerName;
use storage::repository::PlayerRepository;

use crate::error::PlayerServiceError;

/// Validates and remembers the player's display name.
#[derive(Clone)]
pub struct PlayerService {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerService {
    #[must_use]
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        Self { players }
    }

    /// The name saved by an earlier run, if any.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Storage` on repository failures.
    pub async fn remembered(&self) -> Result<Option<PlayerName>, PlayerServiceError> {
        Ok(self.players.load_player_name().await?)
    }

    /// Validate `raw` and save it for later runs.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Name` if the trimmed name is too short,
    /// in which case nothing is saved.
    pub async fn remember(&self, raw: &str) -> Result<PlayerName, PlayerServiceError> {
        let name = PlayerName::new(raw)?;
        self.players.save_player_name(&name).await?;
        log::debug!("remembered player name {name}");
        Ok(name)
    }
}
