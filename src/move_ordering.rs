use crate::board::Board;
use crate::evaluation::Score;
use crate::movelist::{MoveList, MAX_MOVES};
use crate::piece::Color;
use crate::piece::PieceType::{self, Knight, Pawn, Queen};
use crate::r#move::Move;

pub const MAX_HISTORY: Score = 1000;
pub const MAX_KILLER_PLY: usize = 32;

// Bands, each above anything the next one can reach:
// captures [20_100, 40_800], promotions 15_000, killers 12_000,
// counter-moves 11_000, history [-MAX_HISTORY, MAX_HISTORY]
const PV_BONUS: Score = 100_000;
const CAPTURE_BASE: Score = 40_000;
const PROMOTION_BONUS: Score = 15_000;
const KILLER_BONUS: Score = 12_000;
const COUNTER_BONUS: Score = 11_000;
/// Indexed by `PieceType::index`
const PIECE_VALUE: [Score; 6] = [100, 300, 320, 500, 900, 20_000];

/// Killer, counter-move and history tables, owned by one searcher
pub struct MoveOrderer {
    killers: [[Move; 2]; MAX_KILLER_PLY],
    counters: Box<[[Move; 64]; 64]>,
    history: Box<[[[Score; 64]; 64]; 2]>,
}

impl Default for MoveOrderer {
    fn default() -> Self {
        MoveOrderer {
            killers: [[Move::NULL; 2]; MAX_KILLER_PLY],
            counters: Box::new([[Move::NULL; 64]; 64]),
            history: Box::new([[[0; 64]; 64]; 2]),
        }
    }
}

impl MoveOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts `moves` best first. `pv_move` and `previous_move` may be null.
    pub fn order(&self, board: &Board, moves: &mut MoveList, pv_move: Move, ply: usize, previous_move: Move) {
        let mut scores = [0; MAX_MOVES];
        for (i, mv) in moves.iter().enumerate() {
            scores[i] = self.score(board, *mv, pv_move, ply, previous_move);
        }
        let len = moves.len();
        moves.sort_by_scores(&mut scores[..len]);
    }

    fn score(&self, board: &Board, mv: Move, pv_move: Move, ply: usize, previous_move: Move) -> Score {
        if !pv_move.is_null() && mv == pv_move {
            return PV_BONUS;
        }
        let mut score = 0;
        if board.is_capture(mv) {
            let victim = if mv.is_en_passant() {
                Some(Pawn)
            } else {
                board.piece_type_on(mv.target())
            };
            score += value_of(victim) - value_of(board.piece_type_on(mv.origin())) + CAPTURE_BASE;
        } else if self.is_killer(mv, ply) {
            score += KILLER_BONUS;
        } else if self.counter_move(previous_move) == Some(mv) {
            score += COUNTER_BONUS;
        } else {
            score += self.history[board.side_to_move().index()][mv.origin()][mv.target()];
        }
        if matches!(mv.promotion_target(), Some(Queen | Knight)) {
            score += PROMOTION_BONUS;
        }
        score
    }

    /// Killers of this ply and of two plies back, when our side was also to move
    fn is_killer(&self, mv: Move, ply: usize) -> bool {
        let at = |p: usize| p < MAX_KILLER_PLY && self.killers[p].contains(&mv);
        at(ply) || (ply >= 2 && at(ply - 2))
    }

    fn counter_move(&self, previous_move: Move) -> Option<Move> {
        if previous_move.is_null() {
            return None;
        }
        let counter = self.counters[previous_move.origin()][previous_move.target()];
        (!counter.is_null()).then(|| counter)
    }

    pub fn add_killer(&mut self, mv: Move, ply: usize) {
        if ply >= MAX_KILLER_PLY {
            return;
        }
        let killers = &mut self.killers[ply];
        if killers[0] != mv {
            killers[1] = killers[0];
            killers[0] = mv;
        }
    }

    pub fn set_counter(&mut self, previous_move: Move, mv: Move) {
        if !previous_move.is_null() {
            self.counters[previous_move.origin()][previous_move.target()] = mv;
        }
    }

    /// Moves a history score towards `bonus`, the step shrinking as the score nears the bound
    pub fn update_history(&mut self, color: Color, mv: Move, bonus: Score) {
        let clamped = bonus.clamp(-MAX_HISTORY, MAX_HISTORY);
        let entry = &mut self.history[color.index()][mv.origin()][mv.target()];
        *entry += clamped - *entry * clamped.abs() / MAX_HISTORY;
    }

    pub fn history(&self, color: Color, mv: Move) -> Score {
        self.history[color.index()][mv.origin()][mv.target()]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn value_of(piece_type: Option<PieceType>) -> Score {
    piece_type.map_or(0, |p| PIECE_VALUE[p.index()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generator::{generate, GenType, PromotionMode};
    use crate::piece::Color::White;

    #[test]
    fn priorities() {
        // Pawn takes queen, knight takes queen, promotion, quiet king moves
        let mut board = Board::new("k7/4P3/8/3q4/2P2N2/8/8/K7 w - - 0 1");
        let mut moves = generate(&mut board, GenType::Legal, PromotionMode::QueenOnly);
        let mut orderer = MoveOrderer::new();

        let pawn_takes = Move::new_quiet(26, 35);
        let knight_takes = Move::new_quiet(29, 35);
        let promotion = Move::new_promotion(52, 60, Queen);
        let killer = Move::new_quiet(0, 1);
        let pv = Move::new_quiet(0, 8);
        orderer.add_killer(killer, 4);

        orderer.order(&board, &mut moves, pv, 4, Move::NULL);
        assert_eq!(moves.as_slice()[..5], [pv, pawn_takes, knight_takes, promotion, killer]);

        // Killers from two plies back still count, other plies do not
        orderer.order(&board, &mut moves, Move::NULL, 6, Move::NULL);
        assert_eq!(moves.as_slice()[..4], [pawn_takes, knight_takes, promotion, killer]);
        assert_eq!(orderer.score(&board, killer, Move::NULL, 5, Move::NULL), 0);
    }

    #[test]
    fn captures_outrank_quiet_heuristics() {
        let mut board = Board::new("k7/3p4/8/8/8/8/5n2/3QK3 w - - 0 1");
        let mut moves = generate(&mut board, GenType::Legal, PromotionMode::QueenOnly);
        let mut orderer = MoveOrderer::new();

        let queen_takes = Move::new_quiet(3, 51);
        let king_takes = Move::new_quiet(4, 13);
        let killer = Move::new_quiet(3, 19);
        let counter = Move::new_quiet(3, 11);
        let favourite = Move::new_quiet(3, 2);
        let previous = Move::new_quiet(57, 56);
        orderer.add_killer(killer, 2);
        orderer.set_counter(previous, counter);
        for _ in 0..10 {
            orderer.update_history(White, favourite, MAX_HISTORY);
        }
        assert_eq!(orderer.history(White, favourite), MAX_HISTORY);

        orderer.order(&board, &mut moves, Move::NULL, 2, previous);
        assert_eq!(
            moves.as_slice()[..5],
            [queen_takes, king_takes, killer, counter, favourite]
        );
    }

    #[test]
    fn counter_moves() {
        let mut board = Board::new("k7/8/8/8/8/8/8/K6R w - - 0 1");
        let generated = generate(&mut board, GenType::Legal, PromotionMode::QueenOnly);
        let mut orderer = MoveOrderer::new();
        let reply = Move::new_quiet(7, 63);
        let previous = Move::new_quiet(57, 56);
        orderer.set_counter(previous, reply);

        // Without a matching previous move every score ties and the order is kept
        let mut moves = generated.clone();
        orderer.order(&board, &mut moves, Move::NULL, 0, Move::new_quiet(56, 57));
        assert_eq!(moves.as_slice(), generated.as_slice());

        orderer.order(&board, &mut moves, Move::NULL, 0, previous);
        assert_eq!(moves.as_slice()[0], reply);
    }

    #[test]
    fn history_stays_bounded() {
        let mut orderer = MoveOrderer::new();
        let mv = Move::new_quiet(12, 28);
        for _ in 0..100 {
            orderer.update_history(White, mv, 5000);
        }
        assert_eq!(orderer.history(White, mv), MAX_HISTORY);
        for _ in 0..100 {
            orderer.update_history(White, mv, -400);
        }
        assert!(orderer.history(White, mv) >= -MAX_HISTORY);
        assert!(orderer.history(White, mv) < 0);

        orderer.clear();
        assert_eq!(orderer.history(White, mv), 0);
    }
}
