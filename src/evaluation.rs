use crate::board::Board;
use crate::game_result::insufficient_material;
use crate::move_generator::{DIAGONALS, KNIGHT_OFFSETS, ORTHOGONALS};
use crate::piece::Color::{self, Black, White};
use crate::piece::PieceType::{self, Bishop, Knight, Pawn, Queen, Rook};
use crate::square::{file_of, offset, rank_of, Square};

pub type Score = i32;

// Build script to calculate evaluation constants at compile time
include!(concat!(env!("OUT_DIR"), "/evaluation_constants.rs"));

pub struct Evaluation {}
impl Evaluation {
    pub const MIDGAME_PIECE_VALUE: [Score; 6] = [82, 337, 365, 477, 1025, 0];
    pub const ENDGAME_PIECE_VALUE: [Score; 6] = [94, 281, 297, 512, 936, 0];
    pub const MATE_SCORE: Score = 1_000_000;
    pub const INFINITY: Score = 2 * Self::MATE_SCORE;
    pub const DRAW_SCORE: Score = 0;
    pub const PHASE_VALUE: [Score; 6] = [0, 1, 1, 2, 4, 0];
    pub const MAX_PHASE: Score = 24;

    const BISHOP_PAIR: Score = 30;
    const KNIGHT_PAIR: Score = -8;
    const ROOK_PAIR: Score = -16;
    // Per own pawn above five: knights like closed positions, rooks open ones
    const KNIGHT_PAWN_ADJUSTMENT: Score = 6;
    const ROOK_PAWN_ADJUSTMENT: Score = -12;

    const ROOK_OPEN_FILE: Score = 20;
    const ROOK_HALF_OPEN_FILE: Score = 10;
    const SHIELD_CLOSE: Score = 10;
    const SHIELD_FAR: Score = 5;
    const BLOCKED_CENTRAL_PAWN: Score = -20;
    const TRAPPED_ROOK: Score = -40;

    // Knight, bishop, rook, queen
    const EXPECTED_MOBILITY: [Score; 4] = [4, 7, 7, 14];
    const MIDGAME_MOBILITY_WEIGHT: [Score; 4] = [4, 5, 2, 1];
    const ENDGAME_MOBILITY_WEIGHT: [Score; 4] = [4, 5, 4, 2];

    /// Piece, its square and the enemy pawns that lock it in, all from the owner's
    /// point of view (a1 = 0), with the associated penalty
    const TRAPPED_PATTERNS: [(PieceType, Square, &'static [Square], Score); 10] = [
        (Knight, 56, &[48], -150),
        (Knight, 56, &[50], -150),
        (Knight, 63, &[55], -150),
        (Knight, 63, &[53], -150),
        (Knight, 48, &[40, 49], -100),
        (Knight, 55, &[47, 54], -100),
        (Bishop, 48, &[41], -100),
        (Bishop, 55, &[46], -100),
        (Bishop, 40, &[33], -50),
        (Bishop, 47, &[38], -50),
    ];

    pub fn is_mate_score(score: Score) -> bool {
        score.abs() >= Self::MATE_SCORE - 1000
    }
}

/// Midgame and endgame halves of a score, blended by game phase at the end
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Tapered {
    mg: Score,
    eg: Score,
}
impl Tapered {
    fn add(&mut self, mg: Score, eg: Score) {
        self.mg += mg;
        self.eg += eg;
    }
    fn add_both(&mut self, s: Score) {
        self.add(s, s)
    }
}

/// Static evaluation of a position, positive when the side to move is better.
/// Every term is computed per color from that color's point of view, so mirroring the
/// board and swapping colors exactly negates the result.
pub fn evaluate(board: &Board) -> Score {
    if insufficient_material(board) {
        return Evaluation::DRAW_SCORE;
    }
    let phase = game_phase(board);
    let white = side_terms(board, White);
    let black = side_terms(board, Black);
    let mg = white.mg - black.mg;
    let eg = white.eg - black.eg;
    let score = (mg * phase + eg * (Evaluation::MAX_PHASE - phase)) / Evaluation::MAX_PHASE;

    match board.side_to_move() {
        White => score,
        Black => -score,
    }
}

/// Remaining non-pawn material, from 24 (all pieces on the board) down to 0
pub fn game_phase(board: &Board) -> Score {
    let mut phase = 0;
    for color in [White, Black] {
        for piece_type in PieceType::ALL {
            phase += Evaluation::PHASE_VALUE[piece_type.index()] * board.count(piece_type, color) as Score;
        }
    }
    phase.min(Evaluation::MAX_PHASE)
}

/// Square as seen by `color`, its own back rank being rank 1.
/// The mapping is its own inverse.
fn relative(color: Color, sq: Square) -> Square {
    match color {
        White => sq,
        Black => sq ^ 56,
    }
}

fn has_pawn(board: &Board, color: Color, relative_sq: Square) -> bool {
    board.piece_on(relative(color, relative_sq)).is(Pawn, color)
}

fn side_terms(board: &Board, color: Color) -> Tapered {
    let mut terms = Tapered::default();

    for piece_type in PieceType::ALL {
        let i = piece_type.index();
        for sq in board.squares_of(piece_type, color) {
            // Tables are written a8 first
            let table_index = relative(color, *sq) ^ 56;
            terms.add(
                Evaluation::MIDGAME_PIECE_VALUE[i] + MIDGAME_PIECE_SQUARE_TABLE[i][table_index],
                Evaluation::ENDGAME_PIECE_VALUE[i] + ENDGAME_PIECE_SQUARE_TABLE[i][table_index],
            );
            if matches!(piece_type, Knight | Bishop | Rook | Queen) {
                let m = mobility(board, *sq, piece_type, color) - Evaluation::EXPECTED_MOBILITY[i - 1];
                terms.add(
                    m * Evaluation::MIDGAME_MOBILITY_WEIGHT[i - 1],
                    m * Evaluation::ENDGAME_MOBILITY_WEIGHT[i - 1],
                );
            }
        }
    }

    material_adjustments(board, color, &mut terms);
    rook_files(board, color, &mut terms);
    king_shield(board, color, &mut terms);
    blocked_central_pawns(board, color, &mut terms);
    trapped_rooks(board, color, &mut terms);
    trapped_minor_pieces(board, color, &mut terms);
    terms
}

/// Pseudo-legal destinations of a knight or slider, empty or enemy-occupied
fn mobility(board: &Board, sq: Square, piece_type: PieceType, color: Color) -> Score {
    let reachable = |t: Square| {
        let p = board.piece_on(t);
        p.is_none() || p.color() != color
    };
    let slide = |directions: &[(i32, i32)]| {
        let mut count = 0;
        for (file_delta, rank_delta) in directions {
            let mut current = sq;
            while let Some(target) = offset(current, *file_delta, *rank_delta) {
                if reachable(target) {
                    count += 1;
                }
                if !board.piece_on(target).is_none() {
                    break;
                }
                current = target;
            }
        }
        count
    };
    match piece_type {
        Knight => KNIGHT_OFFSETS
            .iter()
            .filter_map(|(f, r)| offset(sq, *f, *r))
            .filter(|t| reachable(*t))
            .count() as Score,
        Bishop => slide(&DIAGONALS),
        Rook => slide(&ORTHOGONALS),
        Queen => slide(&DIAGONALS) + slide(&ORTHOGONALS),
        _ => 0,
    }
}

fn material_adjustments(board: &Board, color: Color, terms: &mut Tapered) {
    if board.count(Bishop, color) >= 2 {
        terms.add_both(Evaluation::BISHOP_PAIR);
    }
    if board.count(Knight, color) >= 2 {
        terms.add_both(Evaluation::KNIGHT_PAIR);
    }
    if board.count(Rook, color) >= 2 {
        terms.add_both(Evaluation::ROOK_PAIR);
    }
    let extra_pawns = board.count(Pawn, color) as Score - 5;
    terms.add_both(board.count(Knight, color) as Score * extra_pawns * Evaluation::KNIGHT_PAWN_ADJUSTMENT);
    terms.add_both(board.count(Rook, color) as Score * extra_pawns * Evaluation::ROOK_PAWN_ADJUSTMENT);
}

fn rook_files(board: &Board, color: Color, terms: &mut Tapered) {
    let pawns_on_file = |c: Color, file: usize| {
        board
            .squares_of(Pawn, c)
            .iter()
            .any(|sq| file_of(*sq) == file)
    };
    for sq in board.squares_of(Rook, color) {
        let file = file_of(*sq);
        if pawns_on_file(color, file) {
            continue;
        }
        terms.add_both(if pawns_on_file(color.opposite(), file) {
            Evaluation::ROOK_HALF_OPEN_FILE
        } else {
            Evaluation::ROOK_OPEN_FILE
        });
    }
}

/// Pawns standing in front of a king that went to a flank
fn king_shield(board: &Board, color: Color, terms: &mut Tapered) {
    let king = match board.king_square(color) {
        Some(sq) => relative(color, sq),
        None => return,
    };
    if rank_of(king) != 0 {
        return;
    }
    let files = match file_of(king) {
        0..=2 => 0..3,
        5..=7 => 5..8,
        _ => return,
    };
    for file in files {
        if has_pawn(board, color, 8 + file) {
            terms.add(Evaluation::SHIELD_CLOSE, 0);
        } else if has_pawn(board, color, 16 + file) {
            terms.add(Evaluation::SHIELD_FAR, 0);
        }
    }
}

/// d2/e2 pawns that cannot move because something sits in front of them
fn blocked_central_pawns(board: &Board, color: Color, terms: &mut Tapered) {
    for (pawn, front) in [(11, 19), (12, 20)] {
        if has_pawn(board, color, pawn) && !board.piece_on(relative(color, front)).is_none() {
            terms.add(Evaluation::BLOCKED_CENTRAL_PAWN, 0);
        }
    }
}

/// A king stepping aside without castling walls its own rook into the corner
fn trapped_rooks(board: &Board, color: Color, terms: &mut Tapered) {
    let king = match board.king_square(color) {
        Some(sq) => relative(color, sq),
        None => return,
    };
    let corner: &[Square] = match king {
        5 | 6 => &[6, 7, 15],
        1 | 2 => &[0, 1, 8],
        _ => return,
    };
    for sq in board.squares_of(Rook, color) {
        if corner.contains(&relative(color, *sq)) {
            terms.add(Evaluation::TRAPPED_ROOK, 0);
        }
    }
}

fn trapped_minor_pieces(board: &Board, color: Color, terms: &mut Tapered) {
    let enemy = color.opposite();
    for piece_type in [Knight, Bishop] {
        for sq in board.squares_of(piece_type, color) {
            let here = relative(color, *sq);
            let trap = Evaluation::TRAPPED_PATTERNS.iter().find(|(p, at, pawns, _)| {
                *p == piece_type
                    && *at == here
                    && pawns
                        .iter()
                        .all(|pawn| board.piece_on(relative(color, *pawn)).is(Pawn, enemy))
            });
            if let Some((_, _, _, penalty)) = trap {
                terms.add_both(*penalty);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::STARTING_POSITION;

    const POSITIONS: [&str; 8] = [
        STARTING_POSITION,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        "N3k3/p7/8/8/8/8/8/4K2R b K - 0 1",
        "4k3/8/8/8/8/8/3PP3/3NBKR1 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ];

    #[test]
    fn antisymmetry() {
        for fen in POSITIONS {
            let board = Board::new(fen);
            assert_eq!(evaluate(&board), -evaluate(&board.color_mirrored()), "{}", fen);
        }
    }

    #[test]
    fn symmetric_start_is_balanced() {
        assert_eq!(evaluate(&Board::new(STARTING_POSITION)), 0);
    }

    #[test]
    fn side_to_move_only_flips_sign() {
        let white = Board::new("4k3/8/8/8/8/8/PPP5/1K1Q4 w - - 0 1");
        let black = Board::new("4k3/8/8/8/8/8/PPP5/1K1Q4 b - - 0 1");
        assert!(evaluate(&white) > 500);
        assert_eq!(evaluate(&white), -evaluate(&black));
        assert_eq!(evaluate(&white), evaluate(&white));
    }

    #[test]
    fn phase_counts_non_pawn_material() {
        assert_eq!(game_phase(&Board::new(STARTING_POSITION)), 24);
        assert_eq!(game_phase(&Board::new("4k3/8/8/8/8/8/8/3QK3 w - - 0 1")), 4);
    }

    #[test]
    fn positional_patterns() {
        // White knight on a8 behind the a7 pawn
        let board = Board::new("N3k3/p7/8/8/8/8/8/4K3 w - - 0 1");
        let mut terms = Tapered::default();
        trapped_minor_pieces(&board, White, &mut terms);
        assert_eq!(terms, Tapered { mg: -150, eg: -150 });

        // Same pattern for black, seen from its own side
        let board = board.color_mirrored();
        let mut terms = Tapered::default();
        trapped_minor_pieces(&board, Black, &mut terms);
        assert_eq!(terms.mg, -150);

        // Castled king with an intact shield
        let board = Board::new("4k3/8/8/8/8/8/5PPP/6K1 w - - 0 1");
        let mut terms = Tapered::default();
        king_shield(&board, White, &mut terms);
        assert_eq!(terms, Tapered { mg: 30, eg: 0 });

        // King on f1 walls in the h1 rook, e2 pawn blocked by the bishop
        let board = Board::new("4k3/8/8/8/8/4B3/4P3/5K1R w - - 0 1");
        let mut terms = Tapered::default();
        trapped_rooks(&board, White, &mut terms);
        blocked_central_pawns(&board, White, &mut terms);
        assert_eq!(terms.mg, -60);

        // Open and half-open files
        let board = Board::new("4k3/p7/8/8/8/8/1P6/R1R1K3 w - - 0 1");
        let mut terms = Tapered::default();
        rook_files(&board, White, &mut terms);
        assert_eq!(terms.mg, 30);
    }
}
