use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::board::Board;
use crate::error::{EngineError, EngineResult};
use crate::evaluation::{evaluate, Score};
use crate::game_result::GameResult;
use crate::move_generator::{generate, generate_from, GenType, PromotionMode};
use crate::movelist::MoveList;
use crate::opening_book::OpeningBook;
use crate::piece::Color::Black;
use crate::r#move::Move;
use crate::search::{SearchConfig, SearchLimits, SearchReport, Searcher};
use crate::square::Square;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub search: SearchConfig,
    /// Used when no explicit budget is given
    pub default_budget: Duration,
    /// 0 plays the most frequent book move, 1 any book move
    pub book_weight: f64,
    /// Book lookups stop after this many plies of the game
    pub book_max_ply: u32,
}
impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            search: SearchConfig::default(),
            default_budget: Duration::from_millis(1000),
            book_weight: 0.5,
            book_max_ply: 30,
        }
    }
}
impl EngineConfig {
    pub fn set_default_budget(&mut self, value: Duration) -> &mut Self {
        self.default_budget = value;
        self
    }
    pub fn set_book_weight(&mut self, value: f64) -> &mut Self {
        self.book_weight = value.clamp(0.0, 1.0);
        self
    }
    pub fn set_book_max_ply(&mut self, value: u32) -> &mut Self {
        self.book_max_ply = value;
        self
    }
}

/// Everything a game loop or front-end needs: one game, one searcher, an optional book.
/// Each player should own its own engine.
pub struct Engine {
    board: Board,
    searcher: Searcher,
    config: EngineConfig,
    book: Option<OpeningBook>,
    in_opening: bool,
    search_in_progress: bool,
    rng: StdRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Engine {
        Engine {
            board: Board::default(),
            searcher: Searcher::new(config.search.clone()),
            config,
            book: None,
            in_opening: true,
            search_in_progress: false,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
    /// Changes apply from the next search on
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn set_book(&mut self, book: OpeningBook) {
        self.book = Some(book);
        self.in_opening = true;
    }
    pub fn clear_book(&mut self) {
        self.book = None;
    }
    /// Makes book choices reproducible
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Starts a new game from the standard position
    pub fn new_position(&mut self) {
        self.board = Board::default();
        self.reset_game_state();
    }

    /// Loads a FEN. This parse is strict: any malformed field is an error and the
    /// current position is kept. `Board::new` is the lenient alternative, replacing
    /// malformed fields by their defaults with a warning.
    /// ```
    /// use corvid::board::{Board, STARTING_POSITION};
    /// use corvid::{Engine, EngineConfig};
    ///
    /// let mut engine = Engine::new(EngineConfig::default());
    /// let fen = "4k3/8/8/8/8/8/8/4K3 x - - 0 1";
    /// assert!(engine.load_position(fen).is_err());
    /// assert_eq!(engine.current_position_text(), STARTING_POSITION);
    ///
    /// let lenient = Board::new(fen);
    /// assert_eq!(lenient.get_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    /// ```
    pub fn load_position(&mut self, fen: &str) -> EngineResult<()> {
        self.board = Board::try_from_fen(fen)?;
        self.reset_game_state();
        Ok(())
    }

    fn reset_game_state(&mut self) {
        *self.searcher.config_mut() = self.config.search.clone();
        self.searcher.clear();
        self.in_opening = true;
    }

    pub fn current_position_text(&self) -> String {
        self.board.get_fen()
    }

    /// Every legal move, under-promotions included
    pub fn legal_moves(&mut self) -> MoveList {
        generate(&mut self.board, GenType::Legal, PromotionMode::All)
    }

    pub fn legal_moves_from(&mut self, sq: Square) -> MoveList {
        generate_from(&mut self.board, sq, PromotionMode::All)
    }

    /// Plays a move for real. Anything not in `legal_moves` is rejected and the position
    /// stays as it was.
    pub fn make_recorded_move(&mut self, mv: Move) -> EngineResult<GameResult> {
        let result = self.board.game_result();
        if result.is_over() {
            return Err(EngineError::GameOver(result));
        }
        if !self.legal_moves().contains(&mv) {
            return Err(EngineError::IllegalMove(mv.to_string()));
        }
        self.board.make_move(mv, true, false);
        Ok(self.board.game_result())
    }

    /// Same as `make_recorded_move` with a long algebraic move, e.g. `e7e8q`
    pub fn make_move_text(&mut self, text: &str) -> EngineResult<GameResult> {
        let mv = self.find_legal(text)?;
        self.make_recorded_move(mv)
    }

    /// Takes back the last recorded move, if any
    pub fn undo_recorded_move(&mut self) -> Option<Move> {
        let mv = self.board.last_move()?;
        self.board.unmake_move(mv, true, false);
        Some(mv)
    }

    fn find_legal(&mut self, text: &str) -> EngineResult<Move> {
        let (origin, target, promotion) =
            Move::parse(text).ok_or_else(|| EngineError::MalformedMove(text.to_string()))?;
        self.legal_moves()
            .iter()
            .find(|m| m.origin() == origin && m.target() == target && m.promotion_target() == promotion)
            .copied()
            .ok_or_else(|| EngineError::IllegalMove(text.to_string()))
    }

    pub fn game_result(&self) -> GameResult {
        self.board.game_result()
    }

    /// Static evaluation of the current position, from the side to move's point of view
    pub fn evaluate(&self) -> Score {
        evaluate(&self.board)
    }

    /// Best move within `budget_ms` milliseconds. The move is not played.
    pub fn request_best_move(&mut self, budget_ms: u64) -> EngineResult<Move> {
        self.search(SearchLimits::time(Duration::from_millis(budget_ms)))
            .map(|report| report.best_move)
    }

    /// Book move if one applies, full search otherwise
    pub fn search(&mut self, limits: SearchLimits) -> EngineResult<SearchReport> {
        if self.search_in_progress {
            return Err(EngineError::SearchInProgress);
        }
        let result = self.board.game_result();
        if result.is_over() {
            return Err(EngineError::GameOver(result));
        }

        if let Some(mv) = self.book_move() {
            info!(book_move = %mv, "playing from the opening book");
            return Ok(SearchReport {
                best_move: mv,
                score: 0,
                depth: 0,
                nodes: 0,
                elapsed: Duration::ZERO,
            });
        }

        let limits = if limits.time.is_none() && limits.depth.is_none() {
            SearchLimits::time(self.config.default_budget)
        } else {
            limits
        };
        self.search_in_progress = true;
        *self.searcher.config_mut() = self.config.search.clone();
        let report = self.searcher.search_best(&mut self.board, limits);
        self.search_in_progress = false;
        Ok(report)
    }

    /// Plies since the initial position of the game, counters included
    fn game_ply(&self) -> u32 {
        let ply = self.board.fullmove_number().saturating_sub(1) * 2;
        if self.board.side_to_move() == Black {
            ply + 1
        } else {
            ply
        }
    }

    /// Leaves the opening for good as soon as the book has nothing to say
    fn book_move(&mut self) -> Option<Move> {
        if !self.in_opening || self.game_ply() >= self.config.book_max_ply {
            return None;
        }
        let key = self.board.book_key();
        let text = match &self.book {
            Some(book) => book
                .choose_move(&key, self.config.book_weight, &mut self.rng)
                .map(|m| m.text.clone()),
            None => return None,
        };
        let text = match text {
            Some(text) => text,
            None => {
                self.in_opening = false;
                return None;
            }
        };
        match self.find_legal(&text) {
            Ok(mv) => Some(mv),
            Err(e) => {
                warn!("ignoring book move: {}", e);
                None
            }
        }
    }

    pub fn perft(&mut self, depth: u32) -> u64 {
        crate::perft(&mut self.board, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::STARTING_POSITION;

    #[test]
    fn book_moves_come_first() {
        let book = OpeningBook::parse(
            "pos rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -\ne2e4 10\nd2d4 2\n\
             pos rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq -\ne2e4 1\n",
        );
        let mut engine = Engine::default();
        engine.config_mut().set_book_weight(0.0);
        engine.set_book(book);

        let mv = engine.search(SearchLimits::depth(1)).map(|r| (r.best_move, r.depth));
        assert_eq!(mv.ok(), Some((Move::new_double_push(12, 28), 0)));

        // Illegal book entries fall back to searching
        assert!(engine.make_move_text("e2e4").is_ok());
        let report = engine.search(SearchLimits::depth(2));
        assert_eq!(report.map(|r| r.depth).ok(), Some(2));
    }

    #[test]
    fn book_is_limited_to_the_opening() {
        let book = OpeningBook::parse(&format!("pos {}\ne2e4 10\n", "4k3/8/8/8/8/8/4P3/4K3 w - -"));
        let mut engine = Engine::default();
        engine.set_book(book);
        assert!(engine.load_position("4k3/8/8/8/8/8/4P3/4K3 w - - 0 40").is_ok());
        let report = engine.search(SearchLimits::depth(1));
        assert_eq!(report.map(|r| r.depth).ok(), Some(1));
    }

    #[test]
    fn undo() {
        let mut engine = Engine::default();
        assert!(engine.make_move_text("g1f3").is_ok());
        assert_eq!(engine.undo_recorded_move(), Some(Move::new_quiet(6, 21)));
        assert_eq!(engine.current_position_text(), STARTING_POSITION);
        assert_eq!(engine.undo_recorded_move(), None);
    }
}
