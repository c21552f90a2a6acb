use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardParseError {
    #[error("Empty card token")]
    Empty,

    #[error("Invalid rank in card token: {0}")]
    InvalidRank(String),

    #[error("Invalid suit in card token: {0}")]
    InvalidSuit(String),
}

#[derive(Debug, Error)]
pub enum ShowdownError {
    #[error("Unknown game variant: {0}")]
    UnknownVariant(String),

    #[error("Showdown needs at least two contesting players, found {0}")]
    NotEnoughPlayers(usize),

    #[error("Uncontested award needs exactly one player still in hand, found {0}")]
    NotUncontested(usize),

    #[error("Negative contribution for player {0}")]
    NegativeContribution(String),

    #[error("Duplicate player id: {0}")]
    DuplicatePlayer(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Player not seated in room: {0}")]
    PlayerNotFound(String),

    #[error("Insufficient chips for {0}: needs {1}, has {2}")]
    InsufficientChips(String, i64, i64),

    #[error("Pot mismatch: room holds {0}, hand settled {1}")]
    PotMismatch(i64, i64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(String, String),

    #[error("Invalid config JSON: {0}")]
    Json(String),

    #[error("Variant {0} needs one or two ranking families, found {1}")]
    FamilyCount(String, usize),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e.to_string())
    }
}
