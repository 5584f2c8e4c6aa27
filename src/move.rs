use crate::piece::PieceType::{self, Bishop, Knight, Queen, Rook};
use crate::square::{self, square_representation, Square};
use std::fmt::{Display, Formatter};

/// Moves are stored as a 2bytes word, with the following alignment:
/// - bits 0..6 for the origin square, bits 6..12 for the target square
/// - bits 12..16 for the flag
///
/// The all-zero word is the null move.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    pub const NULL: Move = Move(0);

    const NO_FLAG: u16 = 0b0000;
    const EN_PASSANT_FLAG: u16 = 0b0001;
    const CASTLE_FLAG: u16 = 0b0010;
    const DOUBLE_PUSH_FLAG: u16 = 0b0011;
    const PROMOTE_QUEEN_FLAG: u16 = 0b0100;
    const PROMOTE_KNIGHT_FLAG: u16 = 0b0101;
    const PROMOTE_ROOK_FLAG: u16 = 0b0110;
    const PROMOTE_BISHOP_FLAG: u16 = 0b0111;

    fn new(origin: Square, target: Square, flags: u16) -> Move {
        Move((flags << 12) | ((target as u16 & 0x3f) << 6) | (origin as u16 & 0x3f))
    }
    pub fn new_quiet(origin: Square, target: Square) -> Move {
        Self::new(origin, target, Self::NO_FLAG)
    }
    pub fn new_double_push(origin: Square, target: Square) -> Move {
        Self::new(origin, target, Self::DOUBLE_PUSH_FLAG)
    }
    pub fn new_en_passant(origin: Square, target: Square) -> Move {
        Self::new(origin, target, Self::EN_PASSANT_FLAG)
    }
    pub fn new_castle(origin: Square, target: Square) -> Move {
        Self::new(origin, target, Self::CASTLE_FLAG)
    }
    pub fn new_promotion(origin: Square, target: Square, promote_to: PieceType) -> Move {
        Self::new(
            origin,
            target,
            match promote_to {
                Knight => Self::PROMOTE_KNIGHT_FLAG,
                Bishop => Self::PROMOTE_BISHOP_FLAG,
                Rook => Self::PROMOTE_ROOK_FLAG,
                _ => Self::PROMOTE_QUEEN_FLAG,
            },
        )
    }

    pub fn from_raw(raw: u16) -> Move {
        Move(raw)
    }
    pub fn raw(&self) -> u16 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
    pub fn origin(&self) -> Square {
        (self.0 & 0x3f) as Square
    }
    pub fn target(&self) -> Square {
        ((self.0 >> 6) & 0x3f) as Square
    }
    pub fn flags(&self) -> MoveFlags {
        match self.0 >> 12 {
            Self::EN_PASSANT_FLAG => MoveFlags::EnPassant,
            Self::CASTLE_FLAG => MoveFlags::Castle,
            Self::DOUBLE_PUSH_FLAG => MoveFlags::DoublePush,
            Self::PROMOTE_QUEEN_FLAG => MoveFlags::Promotion(Queen),
            Self::PROMOTE_KNIGHT_FLAG => MoveFlags::Promotion(Knight),
            Self::PROMOTE_ROOK_FLAG => MoveFlags::Promotion(Rook),
            Self::PROMOTE_BISHOP_FLAG => MoveFlags::Promotion(Bishop),
            _ => MoveFlags::Quiet,
        }
    }

    pub fn is_en_passant(&self) -> bool {
        self.0 >> 12 == Self::EN_PASSANT_FLAG
    }
    pub fn is_castle(&self) -> bool {
        self.0 >> 12 == Self::CASTLE_FLAG
    }
    pub fn is_double_push(&self) -> bool {
        self.0 >> 12 == Self::DOUBLE_PUSH_FLAG
    }
    pub fn is_promotion(&self) -> bool {
        self.0 >> 12 >= Self::PROMOTE_QUEEN_FLAG
    }

    pub fn promotion_target(&self) -> Option<PieceType> {
        match self.flags() {
            MoveFlags::Promotion(p) => Some(p),
            _ => None,
        }
    }

    /// Parses a move formatted in long algebraic notation.
    /// Since no information can be given on flags, it simply returns origin, target and potential
    /// piece type to promote to
    /// ```
    /// use corvid::r#move::Move;
    /// use corvid::piece::PieceType;
    /// assert_eq!(Move::parse("e2e4"), Some((12, 28, None)));
    /// assert_eq!(Move::parse("a7a8n"), Some((48, 56, Some(PieceType::Knight))));
    /// assert_eq!(Move::parse("e2"), None);
    /// ```
    pub fn parse(mv: &str) -> Option<(Square, Square, Option<PieceType>)> {
        let origin = square::parse_square(mv.get(0..2)?)?;
        let target = square::parse_square(mv.get(2..4)?)?;
        let promotion_target = match mv.get(4..) {
            Some("b") => Some(Bishop),
            Some("n") => Some(Knight),
            Some("r") => Some(Rook),
            Some("q") => Some(Queen),
            Some("") | None => None,
            Some(_) => return None,
        };
        Some((origin, target, promotion_target))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        let o = square_representation(self.origin()).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.target()).unwrap_or_else(|| String::from("**"));
        if let Some(p) = self.promotion_target() {
            write!(f, "{}{}{}", o, t, p)
        } else {
            write!(f, "{}{}", o, t)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveFlags {
    Quiet,
    EnPassant,
    Castle,
    DoublePush,
    Promotion(PieceType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let m = Move::new_promotion(52, 60, Knight);
        assert_eq!(m.origin(), 52);
        assert_eq!(m.target(), 60);
        assert_eq!(m.flags(), MoveFlags::Promotion(Knight));
        assert!(m.is_promotion());
        assert_eq!(m.to_string(), "e7e8n");

        let castle = Move::new_castle(4, 6);
        assert!(castle.is_castle());
        assert!(!castle.is_promotion());
        assert_eq!(castle, Move::from_raw(castle.raw()));
        assert!(Move::NULL.is_null());
        assert!(!Move::new_quiet(0, 1).is_null());

        let push = Move::new_double_push(12, 28);
        assert!(push.is_double_push());
        assert!(!push.is_en_passant());
        assert_eq!(push.to_string(), "e2e4");
    }
}
