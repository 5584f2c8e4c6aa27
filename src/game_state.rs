use crate::castling::CastlingRights;
use crate::piece::{Color, PieceType};
use crate::zob_hash::Hash;

/// Irreversible part of a position. The board keeps a stack of these,
/// one frame per move played, popped back on unmake.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GameState {
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    /// File of the pawn that just double pushed, if any
    pub ep_file: Option<usize>,
    /// Type of the piece captured by the move that led here
    pub captured: Option<PieceType>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub hash: Hash,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            ep_file: None,
            captured: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }
}
