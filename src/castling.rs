use crate::piece::Color;
use crate::piece::Color::{Black, White};
use crate::square::{self, Square};
use std::fmt::{Display, Formatter};

/// 4 bits mask: white kingside, white queenside, black kingside, black queenside
/// from the least significant bit up.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    const WHITE_KINGSIDE: u8 = 0b0001;
    const WHITE_QUEENSIDE: u8 = 0b0010;
    const BLACK_KINGSIDE: u8 = 0b0100;
    const BLACK_QUEENSIDE: u8 = 0b1000;

    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    pub fn new() -> CastlingRights {
        Self::ALL
    }

    /// Parses the castling field of a FEN string, returning None on any unexpected character
    /// ```
    /// use corvid::castling::CastlingRights;
    /// assert_eq!(CastlingRights::parse("KQkq"), Some(CastlingRights::ALL));
    /// assert_eq!(CastlingRights::parse("-"), Some(CastlingRights::NONE));
    /// assert_eq!(CastlingRights::parse("Kx"), None);
    /// ```
    pub fn parse(s: &str) -> Option<CastlingRights> {
        let mut res = CastlingRights(0);
        if s == "-" {
            return Some(res);
        }
        for c in s.chars() {
            res.0 |= match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            }
        }
        Some(res)
    }

    pub fn bits(&self) -> usize {
        self.0 as usize
    }

    /// Returns the castling rights of a given color, as (kingside, queenside)
    pub fn get(&self, side: Color) -> (bool, bool) {
        match side {
            White => (
                self.0 & Self::WHITE_KINGSIDE != 0,
                self.0 & Self::WHITE_QUEENSIDE != 0,
            ),
            Black => (
                self.0 & Self::BLACK_KINGSIDE != 0,
                self.0 & Self::BLACK_QUEENSIDE != 0,
            ),
        }
    }
    /// Marks the given side as unable to castle
    pub fn uncastle(&mut self, side: Color) {
        self.0 &= match side {
            White => !(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE),
            Black => !(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE),
        }
    }

    /// Revokes whatever right depends on a rook standing on `sq`.
    /// Called for both the origin and the target of every move.
    pub fn touch(&mut self, sq: Square) {
        self.0 &= match sq {
            square::H1 => !Self::WHITE_KINGSIDE,
            square::A1 => !Self::WHITE_QUEENSIDE,
            square::H8 => !Self::BLACK_KINGSIDE,
            square::A8 => !Self::BLACK_QUEENSIDE,
            _ => 0b1111,
        }
    }

    /// Same rights with colors swapped
    pub fn flipped(&self) -> CastlingRights {
        CastlingRights(((self.0 & 0b0011) << 2) | ((self.0 & 0b1100) >> 2))
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let (wking, wqueen) = self.get(White);
        let (bking, bqueen) = self.get(Black);
        write!(
            f,
            "{}{}{}{}",
            if wking { "K" } else { "" },
            if wqueen { "Q" } else { "" },
            if bking { "k" } else { "" },
            if bqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}
