pub type Square = usize;

pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
pub fn file_of(sq: Square) -> usize {
    sq % 8
}
pub fn vertical_symmetry(sq: Square) -> Square {
    sq ^ 56
}

/// Returns the square sitting `file_delta` files and `rank_delta` ranks away from `sq`,
/// or None if that would leave the board.
/// ```
/// use corvid::square::offset;
/// assert_eq!(offset(12, 0, 2), Some(28));
/// assert_eq!(offset(7, 1, 0), None);
/// assert_eq!(offset(8, -1, 1), None);
/// ```
#[inline]
pub fn offset(sq: Square, file_delta: i32, rank_delta: i32) -> Option<Square> {
    let file = file_of(sq) as i32 + file_delta;
    let rank = rank_of(sq) as i32 + rank_delta;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use corvid::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2someotherstuff"), Some(11));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars_iter = s.chars();
    let file = match chars_iter.next()? {
        c @ 'a'..='h' => c as usize - 'a' as usize,
        _ => return None,
    };
    let rank = match chars_iter.next()?.to_digit(10) {
        Some(i) if (1..=8).contains(&i) => i as usize - 1,
        _ => return None,
    };
    Some(rank * 8 + file)
}

/// Returns the string representation of a square
/// ```
/// use corvid::square::square_representation;
/// assert_eq!(square_representation(28), Some(String::from("e4")));
/// assert_eq!(square_representation(11), Some(String::from("d2")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    if !is_valid(sq) {
        return None;
    }
    let rank = ('1'..='8').nth(rank_of(sq))?;
    let file = ('a'..='h').nth(file_of(sq))?;
    let mut repr = file.to_string();
    repr.push(rank);
    Some(repr)
}

/// Checks whether a given square is in bounds (0..64) or not
/// ```
/// use corvid::square::is_valid;
/// assert!(is_valid(12));
/// ```
pub fn is_valid(sq: Square) -> bool {
    sq < 64
}

pub const A1: Square = 0;
pub const C1: Square = 2;
pub const D1: Square = 3;
pub const E1: Square = 4;
pub const F1: Square = 5;
pub const G1: Square = 6;
pub const H1: Square = 7;
pub const A8: Square = 56;
pub const C8: Square = 58;
pub const D8: Square = 59;
pub const E8: Square = 60;
pub const F8: Square = 61;
pub const G8: Square = 62;
pub const H8: Square = 63;
