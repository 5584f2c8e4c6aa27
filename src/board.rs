use crate::castling::CastlingRights;
use crate::error::FenError;
use crate::game_result::{self, GameResult};
use crate::game_state::GameState;
use crate::move_generator::is_square_under_attack;
use crate::piece::Color::{self, Black, White};
use crate::piece::PieceType::{self, King, Pawn};
use crate::piece::Piece;
use crate::piece_list::{PieceList, MAX_PIECES};
use crate::r#move::{Move, MoveFlags};
use crate::square::{self, file_of, offset, parse_square, rank_of, square_representation, Square};
use crate::zob_hash::{Hash, ZobristHasher};
use std::fmt::{Display, Formatter};
use tracing::warn;

pub const STARTING_POSITION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone)]
pub struct Board {
    squares: [Piece; 64],
    // Indexed by piece code
    piece_lists: [PieceList; Piece::CODES],
    kings: [Option<Square>; 2],

    state: GameState,
    history: Vec<GameState>,

    repetition: Vec<Hash>, // Enables repetition detection
    moves_played: Vec<Move>,
    captured: Vec<Piece>,
    result: GameResult,
}

/// Every field of a FEN string, once parsed
struct FenFields {
    squares: [Piece; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_file: Option<usize>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Board {
    fn empty() -> Board {
        Board {
            squares: [Piece::NONE; 64],
            piece_lists: Default::default(),
            kings: [None; 2],
            state: GameState::default(),
            history: Vec::with_capacity(128),
            repetition: Vec::with_capacity(128),
            moves_played: Vec::with_capacity(128),
            captured: Vec::with_capacity(32),
            result: GameResult::InProgress,
        }
    }

    /// Creates a new board given its FEN representation.
    /// Malformed fields are replaced by their default value, see `set_fen`
    pub fn new(fen: &str) -> Board {
        let mut b = Board::empty();
        b.set_fen(fen);
        b
    }

    /// Strict counterpart of `new`, refusing any malformed field
    /// ```
    /// use corvid::board::{Board, STARTING_POSITION};
    /// assert!(Board::try_from_fen(STARTING_POSITION).is_ok());
    /// assert!(Board::try_from_fen("8/8/8/8/8/8/8/8 w - -").is_err());
    /// assert!(Board::try_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
    /// ```
    pub fn try_from_fen(fen: &str) -> Result<Board, FenError> {
        let sections: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&sections.len()) {
            return Err(FenError::FieldCount(sections.len()));
        }
        let squares = parse_placement(sections[0])?;
        for color in [White, Black] {
            let kings = squares
                .iter()
                .filter(|p| p.is(King, color))
                .count();
            if kings != 1 {
                return Err(FenError::Kings);
            }
        }
        let side_to_move = parse_side(sections[1])?;
        let fields = FenFields {
            squares,
            side_to_move,
            castling_rights: CastlingRights::parse(sections[2])
                .ok_or_else(|| FenError::Castling(sections[2].to_owned()))?,
            ep_file: parse_ep(sections[3], side_to_move)?,
            halfmove_clock: parse_counter(sections.get(4).copied(), 0)?,
            fullmove_number: parse_counter(sections.get(5).copied(), 1)?,
        };

        let mut b = Board::empty();
        b.load(fields);
        Ok(b)
    }

    /// Loads a FEN string. Fields that cannot be understood fall back to
    /// an empty board, white to move, no castling, no en passant and fresh counters
    pub fn set_fen(&mut self, fen: &str) {
        let mut sections = fen.split_whitespace();
        let squares = parse_placement(sections.next().unwrap_or("")).unwrap_or_else(|e| {
            warn!(%e, fen, "falling back to an empty board");
            [Piece::NONE; 64]
        });
        let side_to_move = parse_side(sections.next().unwrap_or("w")).unwrap_or_else(|e| {
            warn!(%e, fen, "falling back to white to move");
            White
        });
        let castling = sections.next().unwrap_or("-");
        let castling_rights = CastlingRights::parse(castling).unwrap_or_else(|| {
            warn!(castling, fen, "ignoring invalid castling rights");
            CastlingRights::NONE
        });
        let ep_file = parse_ep(sections.next().unwrap_or("-"), side_to_move).unwrap_or_else(|e| {
            warn!(%e, fen, "ignoring en passant square");
            None
        });
        let halfmove_clock = parse_counter(sections.next(), 0).unwrap_or_else(|e| {
            warn!(%e, fen, "resetting halfmove clock");
            0
        });
        let fullmove_number = parse_counter(sections.next(), 1).unwrap_or_else(|e| {
            warn!(%e, fen, "resetting fullmove number");
            1
        });

        self.load(FenFields {
            squares,
            side_to_move,
            castling_rights,
            ep_file,
            halfmove_clock,
            fullmove_number,
        });
    }

    fn load(&mut self, fields: FenFields) {
        *self = Board::empty();
        for (sq, piece) in fields.squares.iter().enumerate() {
            if !piece.is_none() {
                self.add_piece(*piece, sq);
            }
        }
        self.state = GameState {
            side_to_move: fields.side_to_move,
            castling_rights: fields.castling_rights,
            ep_file: fields.ep_file,
            captured: None,
            halfmove_clock: fields.halfmove_clock,
            fullmove_number: fields.fullmove_number,
            hash: 0,
        };
        self.state.hash = self.cold_hash();
        self.repetition.push(self.state.hash);
        self.result = game_result::classify(self);
    }

    /// Makes a move on the board.
    /// The move is expected to be at least pseudo-legal, anything else breaks the position.
    /// `record` marks a move actually played in the game: it is logged and the game result is
    /// fully recomputed. `in_search` keeps repetition tracking alive inside the search tree.
    pub fn make_move(&mut self, mv: Move, record: bool, in_search: bool) {
        let origin = mv.origin();
        let target = mv.target();
        let moved = self.squares[origin];
        let moved_type = match moved.piece_type() {
            Some(p) => p,
            None => {
                debug_assert!(false, "no piece to move on {}", origin);
                return;
            }
        };
        let us = self.state.side_to_move;

        self.history.push(self.state);
        self.state.captured = None;
        self.state.halfmove_clock += 1;
        if us == Black {
            self.state.fullmove_number += 1;
        }
        self.state.hash ^= ZobristHasher::en_passant_hash(self.state.ep_file);
        self.state.ep_file = None;

        let capture_square = if mv.is_en_passant() {
            target_behind(target, us)
        } else {
            target
        };
        let captured = self.remove_piece(capture_square);
        if !captured.is_none() {
            self.state.captured = captured.piece_type();
            self.state.halfmove_clock = 0;
            if record {
                self.captured.push(captured);
            }
        }
        self.move_piece(origin, target);

        match mv.flags() {
            MoveFlags::DoublePush => self.state.ep_file = Some(file_of(origin)),
            MoveFlags::Castle => {
                let (rook_origin, rook_target) = castle_rook_squares(target);
                self.move_piece(rook_origin, rook_target);
            }
            MoveFlags::Promotion(p) => {
                self.remove_piece(target);
                self.add_piece(Piece::new(p, us), target);
            }
            _ => (),
        }
        if moved_type == Pawn {
            self.state.halfmove_clock = 0;
        }

        self.state.hash ^= ZobristHasher::castling_rights_hash(self.state.castling_rights);
        if moved_type == King {
            self.state.castling_rights.uncastle(us);
        }
        self.state.castling_rights.touch(origin);
        self.state.castling_rights.touch(target);
        self.state.hash ^= ZobristHasher::castling_rights_hash(self.state.castling_rights);

        self.state.hash ^= ZobristHasher::en_passant_hash(self.state.ep_file);
        self.state.hash ^= ZobristHasher::side_toggle();
        self.state.side_to_move = us.opposite();

        if record {
            self.moves_played.push(mv);
            self.repetition.push(self.state.hash);
            self.result = game_result::classify(self);
        } else if in_search {
            self.repetition.push(self.state.hash);
            self.result = game_result::draw_state(self);
        }
    }

    /// Exact inverse of `make_move`, called with the same flags
    pub fn unmake_move(&mut self, mv: Move, record: bool, in_search: bool) {
        let previous = match self.history.pop() {
            Some(s) => s,
            None => return,
        };
        let origin = mv.origin();
        let target = mv.target();
        let us = previous.side_to_move;

        if mv.is_promotion() {
            self.remove_piece(target);
            self.add_piece(Piece::new(Pawn, us), target);
        }
        self.move_piece(target, origin);
        if mv.is_castle() {
            let (rook_origin, rook_target) = castle_rook_squares(target);
            self.move_piece(rook_target, rook_origin);
        }
        if let Some(captured) = self.state.captured {
            let capture_square = if mv.is_en_passant() {
                target_behind(target, us)
            } else {
                target
            };
            self.add_piece(Piece::new(captured, us.opposite()), capture_square);
            if record {
                self.captured.pop();
            }
        }

        // Piece moves above touched the hash, the restored frame overrides it
        self.state = previous;

        if record {
            self.moves_played.pop();
            self.repetition.pop();
            self.result = game_result::classify(self);
        } else if in_search {
            self.repetition.pop();
            self.result = game_result::draw_state(self);
        }
    }

    /// Places a new piece on a given (empty) square
    fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.squares[sq] = piece;
        self.piece_lists[piece.code()].add(sq);
        if piece.piece_type() == Some(King) {
            self.kings[piece.color().index()] = Some(sq);
        }
        self.state.hash ^= ZobristHasher::hash_for_piece_sq(piece, sq);
    }

    /// Clears the given square, returning the piece that has been removed (possibly none)
    fn remove_piece(&mut self, sq: Square) -> Piece {
        let removed = self.squares[sq];
        if !removed.is_none() {
            self.squares[sq] = Piece::NONE;
            self.piece_lists[removed.code()].remove(sq);
            if removed.piece_type() == Some(King) {
                self.kings[removed.color().index()] = None;
            }
            self.state.hash ^= ZobristHasher::hash_for_piece_sq(removed, sq);
        }
        removed
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        let piece = self.squares[from];
        if piece.is_none() {
            return;
        }
        self.squares[from] = Piece::NONE;
        self.squares[to] = piece;
        self.piece_lists[piece.code()].relocate(from, to);
        if piece.piece_type() == Some(King) {
            self.kings[piece.color().index()] = Some(to);
        }
        self.state.hash ^= ZobristHasher::hash_for_piece_sq(piece, from);
        self.state.hash ^= ZobristHasher::hash_for_piece_sq(piece, to);
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color {
        self.state.side_to_move
    }
    pub fn castling_rights(&self) -> CastlingRights {
        self.state.castling_rights
    }
    pub fn ep_file(&self) -> Option<usize> {
        self.state.ep_file
    }
    /// Square a pawn of the side to move would land on when capturing en passant
    pub fn en_passant_square(&self) -> Option<Square> {
        let file = self.state.ep_file?;
        Some(match self.state.side_to_move {
            White => 40 + file,
            Black => 16 + file,
        })
    }
    pub fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }
    pub fn fullmove_number(&self) -> u32 {
        self.state.fullmove_number
    }
    pub fn game_state(&self) -> &GameState {
        &self.state
    }
    /// Number of moves made since the position was loaded
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    pub fn piece_on(&self, sq: Square) -> Piece {
        self.squares[sq]
    }
    pub fn piece_type_on(&self, sq: Square) -> Option<PieceType> {
        self.squares[sq].piece_type()
    }
    /// Squares holding the given piece
    pub fn squares_of(&self, piece_type: PieceType, color: Color) -> &[Square] {
        self.piece_lists[Piece::new(piece_type, color).code()].squares()
    }
    pub fn count(&self, piece_type: PieceType, color: Color) -> usize {
        self.piece_lists[Piece::new(piece_type, color).code()].len()
    }
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.kings[color.index()] {
            Some(sq) => is_square_under_attack(self, sq, color.opposite()),
            None => false,
        }
    }

    /// Whether `mv`, not yet played, takes something
    pub fn is_capture(&self, mv: Move) -> bool {
        mv.is_en_passant() || !self.squares[mv.target()].is_none()
    }

    pub fn moves_played(&self) -> &[Move] {
        &self.moves_played
    }
    pub fn last_move(&self) -> Option<Move> {
        self.moves_played.last().copied()
    }
    pub fn captured_pieces(&self) -> &[Piece] {
        &self.captured
    }
    /// Type of the piece the last move captured
    pub fn last_captured(&self) -> Option<PieceType> {
        self.state.captured
    }

    pub fn game_result(&self) -> GameResult {
        self.result
    }

    /// Occurrences of the current position since the last irreversible move
    pub fn repetitions(&self) -> usize {
        let window = self.state.halfmove_clock as usize + 1;
        self.repetition
            .iter()
            .rev()
            .take(window)
            .filter(|h| **h == self.state.hash)
            .count()
    }

    /*
    FEN STRING OPERATIONS
     */
    pub fn get_fen(&self) -> String {
        let mut fen = self.placement();
        fen.push_str(&format!(
            " {} {} {} {} {}",
            self.state.side_to_move,
            self.state.castling_rights,
            self.en_passant_square()
                .and_then(square_representation)
                .unwrap_or_else(|| String::from("-")),
            self.state.halfmove_clock,
            self.state.fullmove_number
        ));
        fen
    }

    /// Key used by the opening book: FEN without move counters, where the en passant
    /// square only appears if some legal en passant capture exists
    pub fn book_key(&mut self) -> String {
        let ep = match self.en_passant_square() {
            Some(sq) if self.en_passant_is_legal(sq) => square_representation(sq),
            _ => None,
        };
        format!(
            "{} {} {} {}",
            self.placement(),
            self.state.side_to_move,
            self.state.castling_rights,
            ep.unwrap_or_else(|| String::from("-"))
        )
    }

    fn en_passant_is_legal(&mut self, ep_square: Square) -> bool {
        let us = self.state.side_to_move;
        let pawn = Piece::new(Pawn, us);
        for file_delta in [-1, 1] {
            let origin = match offset(ep_square, file_delta, -us.forward()) {
                Some(sq) if self.squares[sq] == pawn => sq,
                _ => continue,
            };
            let mv = Move::new_en_passant(origin, ep_square);
            self.make_move(mv, false, false);
            let legal = !self.is_king_in_check(us);
            self.unmake_move(mv, false, false);
            if legal {
                return true;
            }
        }
        false
    }

    fn placement(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty_counter = 0;
            for file in 0..8 {
                let p = self.squares[rank * 8 + file];
                if p.is_none() {
                    empty_counter += 1;
                    continue;
                }
                if empty_counter != 0 {
                    fen.push_str(&empty_counter.to_string());
                }
                empty_counter = 0;
                fen.push_str(&p.to_string());
            }
            if empty_counter != 0 {
                fen.push_str(&empty_counter.to_string());
            }
            if rank != 0 {
                fen.push('/');
            }
        }
        fen
    }

    /// Same position with colors swapped and ranks mirrored, side to move unchanged.
    /// The en passant file is dropped since it would belong to the wrong side.
    pub fn color_mirrored(&self) -> Board {
        let mut squares = [Piece::NONE; 64];
        for (sq, p) in self.squares.iter().enumerate() {
            squares[square::vertical_symmetry(sq)] = p.flipped();
        }
        let mut b = Board::empty();
        b.load(FenFields {
            squares,
            side_to_move: self.state.side_to_move,
            castling_rights: self.state.castling_rights.flipped(),
            ep_file: None,
            halfmove_clock: self.state.halfmove_clock,
            fullmove_number: self.state.fullmove_number,
        });
        b
    }

    /*
    HASHING
     */
    pub fn hash(&self) -> Hash {
        self.state.hash
    }

    /// Hash computed from scratch, should always match the incremental one
    pub fn cold_hash(&self) -> Hash {
        let mut hash = 0u64;
        for (sq, piece) in self.squares.iter().enumerate() {
            if !piece.is_none() {
                hash ^= ZobristHasher::hash_for_piece_sq(*piece, sq)
            }
        }
        hash ^= ZobristHasher::side_to_move_hash(self.state.side_to_move);
        hash ^= ZobristHasher::castling_rights_hash(self.state.castling_rights);
        hash ^= ZobristHasher::en_passant_hash(self.state.ep_file);
        hash
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(STARTING_POSITION)
    }
}

/// Square of the pawn captured en passant when landing on `target`
fn target_behind(target: Square, us: Color) -> Square {
    match us {
        White => target - 8,
        Black => target + 8,
    }
}

/// Rook origin and target for a king castling onto `king_target`
fn castle_rook_squares(king_target: Square) -> (Square, Square) {
    if file_of(king_target) == 6 {
        (king_target + 1, king_target - 1)
    } else {
        (king_target - 2, king_target + 1)
    }
}

fn parse_placement(placement: &str) -> Result<[Piece; 64], FenError> {
    let error = || FenError::Placement(placement.to_owned());
    let mut squares = [Piece::NONE; 64];
    let mut counts = [0usize; Piece::CODES];
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(error());
    }
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else {
                let piece = Piece::from_char(c).ok_or_else(error)?;
                if file >= 8 {
                    return Err(error());
                }
                counts[piece.code()] += 1;
                if counts[piece.code()] > MAX_PIECES {
                    return Err(FenError::TooManyPieces(c));
                }
                squares[rank * 8 + file] = piece;
                file += 1;
            }
        }
        if file != 8 {
            return Err(error());
        }
    }
    Ok(squares)
}

fn parse_side(side: &str) -> Result<Color, FenError> {
    match side {
        "w" => Ok(White),
        "b" => Ok(Black),
        _ => Err(FenError::SideToMove(side.to_owned())),
    }
}

/// En passant squares sit on the sixth rank when white is to move, the third otherwise
fn parse_ep(ep: &str, side_to_move: Color) -> Result<Option<usize>, FenError> {
    if ep == "-" {
        return Ok(None);
    }
    let expected_rank = if side_to_move == White { 5 } else { 2 };
    match parse_square(ep) {
        Some(sq) if ep.len() == 2 && rank_of(sq) == expected_rank => Ok(Some(file_of(sq))),
        _ => Err(FenError::EnPassant(ep.to_owned())),
    }
}

fn parse_counter(counter: Option<&str>, default: u32) -> Result<u32, FenError> {
    match counter {
        None => Ok(default),
        Some(c) => c.parse::<u32>().map_err(|_| FenError::Counter(c.to_owned())),
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ranks: Vec<String> = (0..8)
            .rev()
            .map(|rank| {
                (0..8)
                    .map(|file| self.squares[rank * 8 + file].to_string() + " ")
                    .collect()
            })
            .collect();
        let summary = [
            String::new(),
            format!("  side to move: {}", self.state.side_to_move),
            format!("  castling_rights: {}", self.state.castling_rights),
            format!(
                "  en passant: {}",
                self.en_passant_square()
                    .and_then(square_representation)
                    .unwrap_or_else(|| String::from("-"))
            ),
            format!(
                "  move: {} ({} reversible plies)",
                self.state.fullmove_number, self.state.halfmove_clock
            ),
            format!("  hash: {:#0x}", self.state.hash),
            format!("  fen: {}", self.get_fen()),
            format!("  result: {}", self.result),
        ];
        for (rank, info) in ranks.iter().zip(summary.iter()) {
            writeln!(f, "{}{}", rank, info)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generator::{generate, GenType, PromotionMode};
    use crate::piece::PieceType::Rook;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn walk(board: &mut Board, depth: u32) {
        if depth == 0 {
            return;
        }
        let before_fen = board.get_fen();
        let before_hash = board.hash();
        for mv in &generate(board, GenType::Legal, PromotionMode::All) {
            board.make_move(*mv, false, false);
            assert_eq!(board.hash(), board.cold_hash(), "hash drift after {}", mv);
            walk(board, depth - 1);
            board.unmake_move(*mv, false, false);
            assert_eq!(board.get_fen(), before_fen);
            assert_eq!(board.hash(), before_hash);
        }
    }

    #[test]
    fn make_unmake_restores_position() {
        for fen in [
            STARTING_POSITION,
            KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ] {
            let mut board = Board::new(fen);
            assert_eq!(board.hash(), board.cold_hash());
            walk(&mut board, 3);
        }
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            STARTING_POSITION,
            KIWIPETE,
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "4k3/8/8/8/8/8/8/4K3 b - - 37 80",
        ] {
            assert_eq!(Board::new(fen).get_fen(), fen);
        }
    }

    #[test]
    fn crowded_placement_is_rejected() {
        assert_eq!(
            Board::try_from_fen("QQQQQQQQ/QQQQQQQQ/Q7/8/8/8/8/K6k w - - 0 1").err(),
            Some(FenError::TooManyPieces('Q'))
        );
        // Sixteen of a kind is still a position
        assert!(Board::try_from_fen("QQQQQQQQ/QQQQQQQQ/8/8/8/8/8/K6k w - - 0 1").is_ok());
    }

    #[test]
    fn lenient_parsing_falls_back() {
        let board = Board::new("4k3/8/8/8/8/8/8/4K3 x KQzz e9 foo");
        assert_eq!(board.side_to_move(), White);
        assert_eq!(board.castling_rights(), CastlingRights::NONE);
        assert_eq!(board.ep_file(), None);
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
        assert_eq!(board.king_square(Black), Some(60));

        let crowded = Board::new("QQQQQQQQ/QQQQQQQQ/Q7/8/8/8/8/K6k w - - 0 1");
        assert_eq!(crowded.count(King, White), 0);
        assert_eq!(crowded.hash(), crowded.cold_hash());

        let garbage = Board::new("not a fen at all");
        assert_eq!(garbage.count(King, White), 0);
        assert_eq!(garbage.hash(), garbage.cold_hash());
    }

    #[test]
    fn recorded_moves_keep_logs() {
        let mut board = Board::default();
        let e4 = Move::new_double_push(12, 28);
        let d5 = Move::new_double_push(51, 35);
        let exd5 = Move::new_quiet(28, 35);
        for mv in [e4, d5, exd5] {
            board.make_move(mv, true, false);
        }
        assert_eq!(board.moves_played(), &[e4, d5, exd5]);
        assert_eq!(board.captured_pieces(), &[Piece::new(Pawn, Black)]);
        assert_eq!(board.last_captured(), Some(Pawn));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 2);

        board.unmake_move(exd5, true, false);
        assert!(board.captured_pieces().is_empty());
        assert_eq!(board.ep_file(), Some(3));
        assert_eq!(board.ply(), 2);
    }

    #[test]
    fn castling_moves_rook_and_revokes_rights() {
        let mut board = Board::new(KIWIPETE);
        let castle = Move::new_castle(square::E1, square::G1);
        board.make_move(castle, false, false);
        assert!(board.piece_on(square::F1).is(Rook, White));
        assert!(board.piece_on(square::H1).is_none());
        assert_eq!(board.king_square(White), Some(square::G1));
        assert_eq!(board.castling_rights().to_string(), "kq");
        board.unmake_move(castle, false, false);
        assert_eq!(board.get_fen(), KIWIPETE);
    }

    #[test]
    fn book_key_hides_uncapturable_en_passant() {
        let mut board = Board::default();
        board.make_move(Move::new_double_push(12, 28), true, false);
        assert_eq!(
            board.book_key(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq -"
        );
        assert!(board.get_fen().contains(" e3 "));

        let mut capturable = Board::new("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        assert!(capturable.book_key().ends_with(" w KQkq f6"));
    }

    #[test]
    fn mirrored_position() {
        let board = Board::new("4k3/8/8/8/8/8/4P3/4K2R w K - 0 1");
        let mirrored = board.color_mirrored();
        assert_eq!(mirrored.get_fen(), "4k2r/4p3/8/8/8/8/8/4K3 w k - 0 1");
        assert_eq!(mirrored.hash(), mirrored.cold_hash());
    }
}
