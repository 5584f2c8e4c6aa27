use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use std::fmt::{Display, Formatter};

/// A piece is packed in a single byte: the low 3 bits hold its type (0 meaning no piece)
/// and bit 3 its color.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Piece(u8);

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}
impl PieceType {
    pub const ALL: [PieceType; 6] = [Pawn, Knight, Bishop, Rook, Queen, King];

    pub fn from_determinant(i: u8) -> Option<PieceType> {
        match i {
            1 => Some(Pawn),
            2 => Some(Knight),
            3 => Some(Bishop),
            4 => Some(Rook),
            5 => Some(Queen),
            6 => Some(King),
            _ => None,
        }
    }
    /// Zero-based index, handy for tables that have no slot for "no piece"
    pub fn index(&self) -> usize {
        *self as usize - 1
    }
    pub fn is_bishop_like(&self) -> bool {
        matches!(self, Bishop | Queen)
    }
    pub fn is_rook_like(&self) -> bool {
        matches!(self, Queen | Rook)
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Pawn => "p",
                Knight => "n",
                Bishop => "b",
                Rook => "r",
                Queen => "q",
                King => "k",
            }
        )
    }
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}
impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
    pub fn index(&self) -> usize {
        *self as usize
    }
    /// Direction pawns of this color walk in, in ranks
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self == &Color::Black { "b" } else { "w" })
    }
}

impl Piece {
    pub const NONE: Piece = Piece(0);
    /// Number of distinct piece codes, "no piece" included
    pub const CODES: usize = 16;

    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece(piece_type as u8 | (color as u8) << 3)
    }

    pub fn piece_type(&self) -> Option<PieceType> {
        PieceType::from_determinant(self.0 & 0b111)
    }
    pub fn color(&self) -> Color {
        if self.0 & 0b1000 != 0 {
            Color::Black
        } else {
            Color::White
        }
    }
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
    pub fn is(&self, piece_type: PieceType, color: Color) -> bool {
        *self == Piece::new(piece_type, color)
    }
    /// Raw code, used to index per-piece tables
    pub fn code(&self) -> usize {
        self.0 as usize
    }

    /// Same piece type, other color
    pub fn flipped(&self) -> Piece {
        if self.is_none() {
            *self
        } else {
            Piece(self.0 ^ 0b1000)
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = match c.to_ascii_lowercase() {
            'p' => Pawn,
            'n' => Knight,
            'b' => Bishop,
            'r' => Rook,
            'q' => Queen,
            'k' => King,
            _ => return None,
        };
        let color = if c.is_ascii_lowercase() {
            Color::Black
        } else {
            Color::White
        };
        Some(Piece::new(piece_type, color))
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self.piece_type() {
            Some(p) => p.to_string(),
            None => return write!(f, "."),
        };
        write!(
            f,
            "{}",
            if self.color() == Color::White {
                s.to_uppercase()
            } else {
                s
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_masks() {
        let black_rook = Piece::new(Rook, Color::Black);
        assert_eq!(black_rook.code(), 12);
        assert_eq!(black_rook.piece_type(), Some(Rook));
        assert_eq!(black_rook.color(), Color::Black);
        assert_eq!(black_rook.flipped(), Piece::new(Rook, Color::White));
        assert_eq!(Piece::NONE.piece_type(), None);
        assert_eq!(Piece::from_char('N'), Some(Piece::new(Knight, Color::White)));
        assert_eq!(Piece::from_char('x'), None);
    }
}
