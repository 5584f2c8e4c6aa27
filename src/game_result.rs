use crate::board::Board;
use crate::move_generator::{generate, GenType, PromotionMode};
use crate::piece::Color::{self, Black, White};
use crate::piece::PieceType::{Bishop, Knight, Pawn, Queen, Rook};
use crate::square::{file_of, rank_of};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameResult {
    InProgress,
    WhiteIsMated,
    BlackIsMated,
    Stalemate,
    Repetition,
    FiftyMoveRule,
    InsufficientMaterial,
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        *self != GameResult::InProgress
    }
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GameResult::Stalemate
                | GameResult::Repetition
                | GameResult::FiftyMoveRule
                | GameResult::InsufficientMaterial
        )
    }
}

impl Display for GameResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GameResult::InProgress => "in progress",
                GameResult::WhiteIsMated => "white is mated",
                GameResult::BlackIsMated => "black is mated",
                GameResult::Stalemate => "stalemate",
                GameResult::Repetition => "draw by repetition",
                GameResult::FiftyMoveRule => "draw by the fifty move rule",
                GameResult::InsufficientMaterial => "draw by insufficient material",
            }
        )
    }
}

/// Full classification of the current position, legal move enumeration included
pub fn classify(board: &mut Board) -> GameResult {
    let side = board.side_to_move();
    if generate(board, GenType::Legal, PromotionMode::QueenOnly).is_empty() {
        return if !board.is_king_in_check(side) {
            GameResult::Stalemate
        } else if side == White {
            GameResult::WhiteIsMated
        } else {
            GameResult::BlackIsMated
        };
    }
    draw_state(board)
}

/// Draw rules that can be decided without generating moves
pub fn draw_state(board: &Board) -> GameResult {
    if board.repetitions() >= 3 {
        GameResult::Repetition
    } else if board.halfmove_clock() >= 100 {
        GameResult::FiftyMoveRule
    } else if insufficient_material(board) {
        GameResult::InsufficientMaterial
    } else {
        GameResult::InProgress
    }
}

/// K v K, K + minor v K, and K + B v K + B with both bishops on the same square color
pub fn insufficient_material(board: &Board) -> bool {
    for color in [White, Black] {
        if board.count(Pawn, color) + board.count(Rook, color) + board.count(Queen, color) > 0 {
            return false;
        }
    }
    let minors = |c: Color| board.count(Knight, c) + board.count(Bishop, c);
    match (minors(White), minors(Black)) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => {
            let square_color = |c: Color| {
                board
                    .squares_of(Bishop, c)
                    .first()
                    .map(|sq| (rank_of(*sq) + file_of(*sq)) % 2)
            };
            match (square_color(White), square_color(Black)) {
                (Some(w), Some(b)) => w == b,
                _ => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r#move::Move;

    #[test]
    fn mates_and_stalemates() {
        // Fool's mate
        let board = Board::new("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(board.game_result(), GameResult::WhiteIsMated);
        let board = Board::new("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert_eq!(board.game_result(), GameResult::Stalemate);
        let board = Board::new("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert_eq!(board.game_result(), GameResult::BlackIsMated);
    }

    #[test]
    fn threefold_repetition() {
        let mut board = Board::new("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let shuffle = [
            Move::new_quiet(0, 1),
            Move::new_quiet(60, 59),
            Move::new_quiet(1, 0),
            Move::new_quiet(59, 60),
        ];
        for mv in shuffle.iter().chain(shuffle.iter()) {
            assert_eq!(board.game_result(), GameResult::InProgress);
            board.make_move(*mv, true, false);
        }
        assert_eq!(board.game_result(), GameResult::Repetition);
        board.unmake_move(shuffle[3], true, false);
        assert_eq!(board.game_result(), GameResult::InProgress);
    }

    #[test]
    fn fifty_move_rule() {
        let board = Board::new("4k3/8/8/8/8/8/8/R3K3 w - - 100 80");
        assert_eq!(board.game_result(), GameResult::FiftyMoveRule);
    }

    #[test]
    fn material_draws() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ] {
            assert_eq!(Board::new(fen).game_result(), GameResult::InsufficientMaterial, "{}", fen);
        }
        for fen in [
            "4k3/8/8/8/8/8/8/3BKB2 w - - 0 1",
            "4kb2/8/8/8/8/8/8/3BK3 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
        ] {
            assert_eq!(Board::new(fen).game_result(), GameResult::InProgress, "{}", fen);
        }
    }
}
