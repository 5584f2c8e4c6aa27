use crate::game_result::GameResult;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the strict FEN parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected between 4 and 6 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid piece placement '{0}'")]
    Placement(String),
    #[error("more than {} pieces of kind '{0}'", crate::piece_list::MAX_PIECES)]
    TooManyPieces(char),
    #[error("position needs exactly one king per side")]
    Kings,
    #[error("invalid side to move '{0}'")]
    SideToMove(String),
    #[error("invalid castling rights '{0}'")]
    Castling(String),
    #[error("invalid en passant square '{0}'")]
    EnPassant(String),
    #[error("invalid move counter '{0}'")]
    Counter(String),
}

#[derive(Error, Debug)]
pub enum BookError {
    #[error("opening book not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not read opening book: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid position: {0}")]
    InvalidFen(#[from] FenError),
    #[error("malformed move '{0}'")]
    MalformedMove(String),
    #[error("illegal move '{0}'")]
    IllegalMove(String),
    #[error("game is over ({0})")]
    GameOver(GameResult),
    #[error("a search is already running")]
    SearchInProgress,
    #[error(transparent)]
    Book(#[from] BookError),
}

pub type EngineResult<T> = Result<T, EngineError>;
