use crate::{
    board::Board,
    movelist::MoveList,
    piece::{
        Color::{self, White},
        Piece,
        PieceType::{self, Bishop, King, Knight, Pawn, Queen, Rook},
    },
    r#move::Move,
    square::{self, offset, rank_of, Square},
};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub enum GenType {
    Legal,
    /// Captures, en passant and capturing promotions only
    Captures,
}

/// Which under-promotions get generated alongside the queen promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PromotionMode {
    All,
    QueenOnly,
    QueenAndKnight,
}

impl Default for PromotionMode {
    fn default() -> Self {
        PromotionMode::QueenAndKnight
    }
}

pub(crate) const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];
pub(crate) const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub(crate) const ORTHOGONALS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Generates a subset of all legal moves for a given position
pub fn generate(board: &mut Board, gen_type: GenType, promotions: PromotionMode) -> MoveList {
    let us = board.side_to_move();
    let mut pseudo_legal = MoveList::default();
    for piece_type in PieceType::ALL {
        for sq in board.squares_of(piece_type, us) {
            piece_moves(board, *sq, gen_type, promotions, &mut pseudo_legal);
        }
    }
    filter_legal(board, &pseudo_legal)
}

/// Legal moves of the piece standing on `sq`, if it belongs to the side to move
pub fn generate_from(board: &mut Board, sq: Square, promotions: PromotionMode) -> MoveList {
    if !square::is_valid(sq) {
        return MoveList::default();
    }
    let piece = board.piece_on(sq);
    if piece.is_none() || piece.color() != board.side_to_move() {
        return MoveList::default();
    }
    let mut pseudo_legal = MoveList::default();
    piece_moves(board, sq, GenType::Legal, promotions, &mut pseudo_legal);
    filter_legal(board, &pseudo_legal)
}

fn filter_legal(board: &mut Board, pseudo_legal: &MoveList) -> MoveList {
    let us = board.side_to_move();
    let mut legal = MoveList::default();
    for mv in pseudo_legal {
        if is_legal(board, *mv, us) {
            legal.push(*mv)
        }
    }
    legal
}

fn is_legal(board: &mut Board, mv: Move, us: Color) -> bool {
    if mv.is_castle() {
        // The king may not castle out of, through or into check
        let them = us.opposite();
        let transit = (mv.origin() + mv.target()) / 2;
        return !board.is_king_in_check(us)
            && !is_square_under_attack(board, transit, them)
            && !is_square_under_attack(board, mv.target(), them);
    }
    board.make_move(mv, false, false);
    let in_check = board.is_king_in_check(us);
    board.unmake_move(mv, false, false);
    !in_check
}

fn piece_moves(
    board: &Board,
    sq: Square,
    gen_type: GenType,
    promotions: PromotionMode,
    list: &mut MoveList,
) {
    let piece_type = match board.piece_type_on(sq) {
        Some(p) => p,
        None => return,
    };
    let captures_only = gen_type == GenType::Captures;
    match piece_type {
        Pawn => pawn_moves(board, sq, captures_only, promotions, list),
        Knight => jump_moves(board, sq, &KNIGHT_OFFSETS, captures_only, list),
        Bishop => slider_moves(board, sq, &DIAGONALS, captures_only, list),
        Rook => slider_moves(board, sq, &ORTHOGONALS, captures_only, list),
        Queen => {
            slider_moves(board, sq, &DIAGONALS, captures_only, list);
            slider_moves(board, sq, &ORTHOGONALS, captures_only, list);
        }
        King => {
            jump_moves(board, sq, &KING_OFFSETS, captures_only, list);
            if !captures_only {
                castling_moves(board, sq, list);
            }
        }
    }
}

fn pawn_moves(
    board: &Board,
    origin: Square,
    captures_only: bool,
    promotions: PromotionMode,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let forward = us.forward();
    let (start_rank, last_rank) = if us == White { (1, 7) } else { (6, 0) };

    if !captures_only {
        if let Some(target) = offset(origin, 0, forward).filter(|t| board.piece_on(*t).is_none()) {
            if rank_of(target) == last_rank {
                push_promotions(origin, target, promotions, list);
            } else {
                list.push(Move::new_quiet(origin, target));
                if rank_of(origin) == start_rank {
                    if let Some(double) =
                        offset(target, 0, forward).filter(|t| board.piece_on(*t).is_none())
                    {
                        list.push(Move::new_double_push(origin, double));
                    }
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        let target = match offset(origin, file_delta, forward) {
            Some(t) => t,
            None => continue,
        };
        let victim = board.piece_on(target);
        if !victim.is_none() && victim.color() != us {
            if rank_of(target) == last_rank {
                push_promotions(origin, target, promotions, list);
            } else {
                list.push(Move::new_quiet(origin, target));
            }
        } else if board.en_passant_square() == Some(target) {
            list.push(Move::new_en_passant(origin, target));
        }
    }
}

fn push_promotions(origin: Square, target: Square, promotions: PromotionMode, list: &mut MoveList) {
    list.push(Move::new_promotion(origin, target, Queen));
    match promotions {
        PromotionMode::All => {
            for p in [Knight, Rook, Bishop] {
                list.push(Move::new_promotion(origin, target, p));
            }
        }
        PromotionMode::QueenAndKnight => list.push(Move::new_promotion(origin, target, Knight)),
        PromotionMode::QueenOnly => (),
    }
}

/// Knight and king moves, single steps from a table of offsets
fn jump_moves(
    board: &Board,
    origin: Square,
    offsets: &[(i32, i32)],
    captures_only: bool,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    for (file_delta, rank_delta) in offsets {
        if let Some(target) = offset(origin, *file_delta, *rank_delta) {
            let occupant = board.piece_on(target);
            if occupant.is_none() {
                if !captures_only {
                    list.push(Move::new_quiet(origin, target));
                }
            } else if occupant.color() != us {
                list.push(Move::new_quiet(origin, target));
            }
        }
    }
}

/// Walks each direction until the edge of the board or the first blocker
fn slider_moves(
    board: &Board,
    origin: Square,
    directions: &[(i32, i32)],
    captures_only: bool,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    for (file_delta, rank_delta) in directions {
        let mut current = origin;
        while let Some(target) = offset(current, *file_delta, *rank_delta) {
            let occupant = board.piece_on(target);
            if occupant.is_none() {
                if !captures_only {
                    list.push(Move::new_quiet(origin, target));
                }
            } else {
                if occupant.color() != us {
                    list.push(Move::new_quiet(origin, target));
                }
                break;
            }
            current = target;
        }
    }
}

/// Castles are generated when rights remain and the squares between king and rook are empty;
/// attacked squares are dealt with by the legality filter
fn castling_moves(board: &Board, origin: Square, list: &mut MoveList) {
    let us = board.side_to_move();
    let home = if us == White { square::E1 } else { square::E8 };
    if origin != home {
        return;
    }
    let rook = Piece::new(Rook, us);
    let empty = |sq: Square| board.piece_on(sq).is_none();
    let (kingside, queenside) = board.castling_rights().get(us);

    if kingside && empty(home + 1) && empty(home + 2) && board.piece_on(home + 3) == rook {
        list.push(Move::new_castle(home, home + 2));
    }
    if queenside
        && empty(home - 1)
        && empty(home - 2)
        && empty(home - 3)
        && board.piece_on(home - 4) == rook
    {
        list.push(Move::new_castle(home, home - 2));
    }
}

/// Checks whether a piece of color `by` attacks the given square
pub fn is_square_under_attack(board: &Board, sq: Square, by: Color) -> bool {
    let is = |target: Option<Square>, piece_type: PieceType| {
        target.map_or(false, |t| board.piece_on(t).is(piece_type, by))
    };

    // Pawns of `by` attack forward, so look backward from the target square
    for file_delta in [-1, 1] {
        if is(offset(sq, file_delta, -by.forward()), Pawn) {
            return true;
        }
    }
    for (file_delta, rank_delta) in KNIGHT_OFFSETS {
        if is(offset(sq, file_delta, rank_delta), Knight) {
            return true;
        }
    }
    for (file_delta, rank_delta) in KING_OFFSETS {
        if is(offset(sq, file_delta, rank_delta), King) {
            return true;
        }
    }

    for (file_delta, rank_delta) in DIAGONALS {
        if first_blocker(board, sq, file_delta, rank_delta)
            .map_or(false, |p| p.color() == by && p.piece_type().map_or(false, |t| t.is_bishop_like()))
        {
            return true;
        }
    }
    for (file_delta, rank_delta) in ORTHOGONALS {
        if first_blocker(board, sq, file_delta, rank_delta)
            .map_or(false, |p| p.color() == by && p.piece_type().map_or(false, |t| t.is_rook_like()))
        {
            return true;
        }
    }
    false
}

fn first_blocker(board: &Board, sq: Square, file_delta: i32, rank_delta: i32) -> Option<Piece> {
    let mut current = sq;
    while let Some(target) = offset(current, file_delta, rank_delta) {
        let occupant = board.piece_on(target);
        if !occupant.is_none() {
            return Some(occupant);
        }
        current = target;
    }
    None
}
