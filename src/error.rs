use std::path::PathBuf;

use crate::cards::Card;

/// Everything the evaluator, estimator and policy can reject.
///
/// All variants except the config ones are caller contract violations: the
/// computations themselves cannot fail on well-formed input.
#[derive(Debug, thiserror::Error)]
pub enum PokerError {
    #[error("invalid card: {0}")]
    InvalidCard(String),
    #[error("expected exactly 2 hole cards, got {0}")]
    WrongHoleCount(usize),
    #[error("board must hold 0, 3, 4 or 5 cards, got {0}")]
    InvalidBoardSize(usize),
    #[error("hand evaluation needs 5 to 7 cards, got {0}")]
    InvalidCardCount(usize),
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("cannot draw {requested} cards from a deck of {remaining}")]
    DeckExhausted { requested: usize, remaining: usize },
    #[error("trial count must be positive")]
    ZeroTrials,
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl PokerError {
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, PokerError::ConfigIo { .. } | PokerError::ConfigParse(_))
    }
}

pub type Result<T, E = PokerError> = std::result::Result<T, E>;
