use thiserror::Error;

/// Every failure a caller of the game core can observe.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("You must be logged in to create a character")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("A character already exists for this account")]
    DuplicateCharacter,

    #[error("Character store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("An account with email '{0}' already exists")]
    AccountExists(String),
}

impl GameError {
    /// Stable tag for the error kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::Unauthenticated => "unauthenticated",
            GameError::Validation(_) => "validation_error",
            GameError::DuplicateCharacter => "duplicate_character",
            GameError::StoreUnavailable(_) => "store_unavailable",
            GameError::InvalidCredentials => "invalid_credentials",
            GameError::AccountExists(_) => "account_exists",
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::StoreUnavailable(err.to_string())
    }
}

pub type GameResult<T> = Result<T, GameError>;
