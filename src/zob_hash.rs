use crate::castling::CastlingRights;
use crate::piece::{Color, Piece};
use crate::square::Square;

pub type Hash = u64;

pub struct ZobristHasher {}

// Keys are initialized at compile time for reproducibility and
// to avoid init functions
include!(concat!(env!("OUT_DIR"), "/zobrist_keys.rs"));

impl ZobristHasher {
    pub const CASTLING_OFFSET: usize = Piece::CODES * 64;
    pub const EP_FILE_OFFSET: usize = Self::CASTLING_OFFSET + 16;
    pub const BLACK_TO_MOVE_INDEX: usize = Self::EP_FILE_OFFSET + 9;

    pub fn hash_for_piece_sq(piece: Piece, sq: Square) -> Hash {
        Self::ZOBRIST_KEYS[piece.code() * 64 + sq]
    }

    pub fn side_to_move_hash(color: Color) -> Hash {
        if color == Color::Black {
            Self::ZOBRIST_KEYS[Self::BLACK_TO_MOVE_INDEX]
        } else {
            0u64
        }
    }

    /// The key toggled whenever the side to move changes
    pub fn side_toggle() -> Hash {
        Self::ZOBRIST_KEYS[Self::BLACK_TO_MOVE_INDEX]
    }

    /// One key per castling mask, so updating rights is a single pair of XORs
    pub fn castling_rights_hash(castling_rights: CastlingRights) -> Hash {
        Self::ZOBRIST_KEYS[Self::CASTLING_OFFSET + castling_rights.bits()]
    }

    /// Slot 0 stands for "no en passant file"
    pub fn en_passant_hash(ep_file: Option<usize>) -> Hash {
        Self::ZOBRIST_KEYS[Self::EP_FILE_OFFSET + ep_file.map_or(0, |f| f + 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_distinct() {
        let keys: HashSet<Hash> = ZobristHasher::ZOBRIST_KEYS.iter().copied().collect();
        assert_eq!(keys.len(), ZobristHasher::ZOBRIST_KEYS.len());
        assert_eq!(ZobristHasher::BLACK_TO_MOVE_INDEX + 1, ZobristHasher::ZOBRIST_KEYS.len());
    }
}
