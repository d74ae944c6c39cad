use thiserror::Error;

use crate::player::PlayerId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("It's not player {actual}'s turn (expected player {expected})")]
    NotPlayersTurn { expected: PlayerId, actual: PlayerId },
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Hand already complete")]
    HandAlreadyComplete,
    #[error("Unknown action type: {0}")]
    UnknownAction(String),
    #[error("Deck exhausted")]
    DeckExhausted,
    #[error("Board has {0} cards, showdown needs 5")]
    IncompleteBoard(usize),
}
