use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minimum number of characters in a display name, after trimming.
pub const MIN_PLAYER_NAME_CHARS: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerNameError {
    #[error("player name must be at least {min} characters, got {len}")]
    TooShort { min: usize, len: usize },
}

/// Trimmed display name attached to every score record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// # Errors
    ///
    /// Returns `PlayerNameError::TooShort` if the trimmed name has fewer than
    /// [`MIN_PLAYER_NAME_CHARS`] characters.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PlayerNameError> {
        let trimmed = raw.as_ref().trim();
        let len = trimmed.chars().count();
        if len < MIN_PLAYER_NAME_CHARS {
            return Err(PlayerNameError::TooShort {
                min: MIN_PLAYER_NAME_CHARS,
                len,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = PlayerNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlayerName> for String {
    fn from(value: PlayerName) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
