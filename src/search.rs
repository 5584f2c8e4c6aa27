use std::fmt::Display;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::board::Board;
use crate::evaluation::{evaluate, Evaluation, Score};
use crate::game_result::GameResult;
use crate::move_generator::{generate, GenType, PromotionMode};
use crate::move_ordering::{MoveOrderer, MAX_HISTORY};
use crate::movelist::MoveList;
use crate::piece::Color::White;
use crate::piece::PieceType::Pawn;
use crate::r#move::Move;
use crate::square::rank_of;
use crate::transposition_table::{Entry, NodeType, TranspositionTable, DEFAULT_SIZE_LOG2};

/// Which forcing situations earn one extra ply, and how many a single line may collect
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    pub check: bool,
    pub capture: bool,
    pub pawn_seventh: bool,
    pub max_extensions: u32,
}
impl Default for ExtensionPolicy {
    fn default() -> Self {
        ExtensionPolicy {
            check: true,
            capture: false,
            pawn_seventh: true,
            max_extensions: 4,
        }
    }
}
impl ExtensionPolicy {
    pub fn none() -> Self {
        ExtensionPolicy {
            check: false,
            capture: false,
            pawn_seventh: false,
            max_extensions: 0,
        }
    }
}

/// Groups together every knob of the searcher
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u32,
    pub promotions: PromotionMode,
    pub extensions: ExtensionPolicy,
    pub late_move_reduction: bool,
    pub quiescence: bool,
    pub tt_size_log2: u32,
}
impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: 100,
            promotions: PromotionMode::default(),
            extensions: ExtensionPolicy::default(),
            late_move_reduction: true,
            quiescence: false,
            tt_size_log2: DEFAULT_SIZE_LOG2,
        }
    }
}
impl SearchConfig {
    pub fn set_max_depth(&mut self, value: u32) -> &mut Self {
        self.max_depth = value.max(1);
        self
    }
    pub fn set_promotions(&mut self, value: PromotionMode) -> &mut Self {
        self.promotions = value;
        self
    }
    pub fn set_extensions(&mut self, value: ExtensionPolicy) -> &mut Self {
        self.extensions = value;
        self
    }
    pub fn set_late_move_reduction(&mut self, value: bool) -> &mut Self {
        self.late_move_reduction = value;
        self
    }
    pub fn set_quiescence(&mut self, value: bool) -> &mut Self {
        self.quiescence = value;
        self
    }
    pub fn set_tt_size_log2(&mut self, value: u32) -> &mut Self {
        self.tt_size_log2 = value;
        self
    }
}

/// Bounds of one search. With neither set, only `SearchConfig::max_depth` stops it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    pub time: Option<Duration>,
    pub depth: Option<u32>,
}
impl SearchLimits {
    pub fn time(budget: Duration) -> Self {
        SearchLimits {
            time: Some(budget),
            depth: None,
        }
    }
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            time: None,
            depth: Some(depth),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub best_move: Move,
    pub score: Score,
    /// Last completed iteration
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
}
impl Display for SearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nps = (self.nodes as f64 / self.elapsed.as_secs_f64().max(1e-6)) as u64;
        let score = if Evaluation::is_mate_score(self.score) {
            let plies = Evaluation::MATE_SCORE - self.score.abs();
            let moves = (plies + 1) / 2;
            format!("mate {}", if self.score < 0 { -moves } else { moves })
        } else {
            format!("cp {}", self.score)
        };
        write!(
            f,
            "depth {} score {} nodes {} nps {} time {} pv {}",
            self.depth,
            score,
            self.nodes,
            nps,
            self.elapsed.as_millis(),
            self.best_move
        )
    }
}

/// Iterative deepening alpha-beta searcher.
/// Owns its transposition table and ordering heuristics, one per player.
pub struct Searcher {
    config: SearchConfig,
    table: TranspositionTable,
    orderer: MoveOrderer,
    nodes: u64,
    deadline: Option<Instant>,
    cancelled: bool,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Searcher {
        Searcher {
            table: TranspositionTable::new(config.tt_size_log2),
            orderer: MoveOrderer::new(),
            config,
            nodes: 0,
            deadline: None,
            cancelled: false,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
    /// Changing the table size through this takes effect on the next `clear`
    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// Forgets everything learnt so far, e.g. for a new game
    pub fn clear(&mut self) {
        if self.table.capacity() != 1 << self.config.tt_size_log2 {
            self.table = TranspositionTable::new(self.config.tt_size_log2);
        } else {
            self.table.clear();
        }
        self.orderer.clear();
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Runs iterative deepening on `board` and returns the result of the deepest completed
    /// iteration. The board is left as it was given.
    /// With no legal moves, the report holds the null move.
    pub fn search_best(&mut self, board: &mut Board, limits: SearchLimits) -> SearchReport {
        let start = Instant::now();
        self.nodes = 0;
        self.cancelled = false;
        self.deadline = limits.time.map(|budget| start + budget);
        let max_depth = limits
            .depth
            .unwrap_or(self.config.max_depth)
            .min(self.config.max_depth)
            .max(1);

        let root_moves = generate(board, GenType::Legal, self.config.promotions);
        let mut report = SearchReport {
            best_move: root_moves.get(0).copied().unwrap_or(Move::NULL),
            score: 0,
            depth: 0,
            nodes: 0,
            elapsed: Duration::ZERO,
        };
        if root_moves.is_empty() {
            return report;
        }

        for depth in 1..=max_depth {
            let (best_move, score) = match self.search_root(board, depth, &root_moves, report.best_move) {
                Some(result) => result,
                None => break,
            };
            report.best_move = best_move;
            report.score = score;
            report.depth = depth;
            debug!(depth, score, nodes = self.nodes, best_move = %best_move, "iteration complete");

            if Evaluation::is_mate_score(score) || self.out_of_time() {
                break;
            }
        }

        report.nodes = self.nodes;
        report.elapsed = start.elapsed();
        info!("{}", report);
        report
    }

    fn out_of_time(&mut self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.cancelled = true;
            }
        }
        self.cancelled
    }

    /// One full-window pass over the root moves, `None` when cancelled midway.
    /// An exact table entry at least `depth` deep is taken as the result of the pass.
    fn search_root(&mut self, board: &mut Board, depth: u32, root_moves: &MoveList, pv: Move) -> Option<(Move, Score)> {
        if let Some(entry) = self.table.get(board.hash()) {
            if entry.node_type == NodeType::Exact
                && entry.depth as u32 >= depth
                && root_moves.contains(&entry.best_move)
            {
                return Some((entry.best_move, from_table(entry.score, 0)));
            }
        }

        let mut moves = root_moves.clone();
        let previous = board.last_move().unwrap_or(Move::NULL);
        self.orderer.order(board, &mut moves, pv, 0, previous);

        let mut alpha = -Evaluation::INFINITY;
        let beta = Evaluation::INFINITY;
        let mut best = None;
        for mv in &moves {
            board.make_move(*mv, false, true);
            let score = -self.search(board, depth - 1, 1, -beta, -alpha, 0, *mv);
            board.unmake_move(*mv, false, true);
            if self.out_of_time() {
                return None;
            }
            if score > alpha {
                alpha = score;
                best = Some((*mv, score));
            }
        }

        if let Some((best_move, score)) = best {
            self.table.set(Entry {
                position_hash: board.hash(),
                best_move,
                depth: depth.min(u8::MAX as u32) as u8,
                score,
                node_type: NodeType::Exact,
            });
        }
        best
    }

    /// The core alpha beta function
    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        board: &mut Board,
        depth: u32,
        ply: usize,
        mut alpha: Score,
        mut beta: Score,
        extensions: u32,
        previous: Move,
    ) -> Score {
        if self.out_of_time() {
            return 0;
        }
        self.nodes += 1;

        if matches!(
            board.game_result(),
            GameResult::Repetition | GameResult::FiftyMoveRule | GameResult::InsufficientMaterial
        ) {
            return Evaluation::DRAW_SCORE;
        }

        let original_alpha = alpha;
        let mut hash_move = Move::NULL;
        if let Some(entry) = self.table.get(board.hash()) {
            hash_move = entry.best_move;
            if entry.depth as u32 >= depth {
                let score = from_table(entry.score, ply);
                match entry.node_type {
                    NodeType::Exact => return score,
                    NodeType::LowerBound => alpha = alpha.max(score),
                    NodeType::UpperBound => beta = beta.min(score),
                }
                if alpha >= beta {
                    return score;
                }
            }
        }

        if depth == 0 {
            return if self.config.quiescence {
                self.quiescence(board, alpha, beta, ply)
            } else {
                evaluate(board)
            };
        }

        let us = board.side_to_move();
        let in_check = board.is_king_in_check(us);
        let mut moves = generate(board, GenType::Legal, self.config.promotions);
        if moves.is_empty() {
            return if in_check {
                -Evaluation::MATE_SCORE + ply as Score
            } else {
                Evaluation::DRAW_SCORE
            };
        }
        self.orderer.order(board, &mut moves, hash_move, ply, previous);

        let policy = self.config.extensions;
        let mut best_score = -Evaluation::INFINITY;
        let mut best_move = Move::NULL;
        for (i, mv) in moves.iter().enumerate() {
            let mv = *mv;
            let capture = board.is_capture(mv);
            let extension = if extensions < policy.max_extensions
                && ((policy.check && in_check)
                    || (policy.capture && capture)
                    || (policy.pawn_seventh && reaches_seventh(board, mv)))
            {
                1
            } else {
                0
            };
            let child_depth = depth - 1 + extension;

            board.make_move(mv, false, true);
            let reduce = self.config.late_move_reduction
                && extension == 0
                && depth >= 3
                && i >= 3
                && !capture
                && !in_check;
            let mut full_search = true;
            let mut score = 0;
            if reduce {
                score = -self.search(board, depth - 2, ply + 1, -beta, -alpha, extensions, mv);
                full_search = score > alpha;
            }
            if full_search {
                score = -self.search(board, child_depth, ply + 1, -beta, -alpha, extensions + extension, mv);
            }
            board.unmake_move(mv, false, true);
            if self.out_of_time() {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            if score > alpha {
                alpha = score;
            } else if !capture {
                self.orderer.update_history(us, mv, -history_bonus(depth));
            }
            if alpha >= beta {
                if !capture {
                    self.orderer.update_history(us, mv, history_bonus(depth));
                    self.orderer.add_killer(mv, ply);
                    self.orderer.set_counter(previous, mv);
                }
                break;
            }
        }

        let node_type = if alpha >= beta {
            NodeType::LowerBound
        } else if alpha <= original_alpha {
            NodeType::UpperBound
        } else {
            NodeType::Exact
        };
        self.table.set(Entry {
            position_hash: board.hash(),
            best_move,
            depth: depth.min(u8::MAX as u32) as u8,
            score: to_table(alpha, ply),
            node_type,
        });
        alpha
    }

    /// Captures-only search below the horizon, standing pat on the static evaluation
    fn quiescence(&mut self, board: &mut Board, mut alpha: Score, beta: Score, ply: usize) -> Score {
        if self.out_of_time() {
            return 0;
        }
        self.nodes += 1;
        if board.game_result().is_draw() {
            return Evaluation::DRAW_SCORE;
        }

        let stand_pat = evaluate(board);
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);

        let mut captures = generate(board, GenType::Captures, PromotionMode::QueenOnly);
        self.orderer.order(board, &mut captures, Move::NULL, ply, Move::NULL);
        for mv in &captures {
            board.make_move(*mv, false, true);
            let score = -self.quiescence(board, -beta, -alpha, ply + 1);
            board.unmake_move(*mv, false, true);
            if self.cancelled {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }
        alpha
    }
}

fn history_bonus(depth: u32) -> Score {
    ((depth * depth) as Score).min(MAX_HISTORY)
}

fn reaches_seventh(board: &Board, mv: Move) -> bool {
    let relative_rank = match board.side_to_move() {
        White => rank_of(mv.target()),
        _ => 7 - rank_of(mv.target()),
    };
    relative_rank == 6 && board.piece_type_on(mv.origin()) == Some(Pawn)
}

/// Mate scores are stored relative to the node, not to the root
fn to_table(score: Score, ply: usize) -> Score {
    if Evaluation::is_mate_score(score) {
        score + score.signum() * ply as Score
    } else {
        score
    }
}
fn from_table(score: Score, ply: usize) -> Score {
    if Evaluation::is_mate_score(score) {
        score - score.signum() * ply as Score
    } else {
        score
    }
}

/// Plain fixed-depth alpha-beta without any table or ordering heuristic.
/// Slow, only useful as a reference for the real searcher.
pub fn fixed_depth_negamax(board: &mut Board, depth: u32) -> Option<(Move, Score)> {
    fn negamax(board: &mut Board, depth: u32, ply: usize, mut alpha: Score, beta: Score) -> Score {
        if ply > 0 && board.game_result().is_draw() {
            return Evaluation::DRAW_SCORE;
        }
        if depth == 0 {
            return evaluate(board);
        }
        let moves = generate(board, GenType::Legal, PromotionMode::QueenOnly);
        if moves.is_empty() {
            return if board.is_king_in_check(board.side_to_move()) {
                -Evaluation::MATE_SCORE + ply as Score
            } else {
                Evaluation::DRAW_SCORE
            };
        }
        for mv in &moves {
            board.make_move(*mv, false, true);
            let score = -negamax(board, depth - 1, ply + 1, -beta, -alpha);
            board.unmake_move(*mv, false, true);
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }
        alpha
    }

    let moves = generate(board, GenType::Legal, PromotionMode::QueenOnly);
    let mut best: Option<(Move, Score)> = None;
    let mut alpha = -Evaluation::INFINITY;
    for mv in &moves {
        board.make_move(*mv, false, true);
        let score = -negamax(board, depth.max(1) - 1, 1, -Evaluation::INFINITY, -alpha);
        board.unmake_move(*mv, false, true);
        if score > alpha {
            alpha = score;
            best = Some((*mv, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::STARTING_POSITION;

    fn searcher() -> Searcher {
        let mut config = SearchConfig::default();
        config.set_tt_size_log2(16);
        Searcher::new(config)
    }

    #[test]
    fn finds_mate_in_one() {
        // Back rank mate
        let mut board = Board::new("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let report = searcher().search_best(&mut board, SearchLimits::depth(3));
        assert_eq!(report.best_move, Move::new_quiet(0, 56));
        assert_eq!(report.score, Evaluation::MATE_SCORE - 1);
        assert_eq!(report.to_string().split_whitespace().nth(4), Some("1"));

        let baseline = fixed_depth_negamax(&mut board, 2);
        assert_eq!(baseline, Some((Move::new_quiet(0, 56), Evaluation::MATE_SCORE - 1)));
    }

    #[test]
    fn finds_mate_in_two() {
        // Two rooks ladder
        let mut board = Board::new("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1");
        let report = searcher().search_best(&mut board, SearchLimits::depth(4));
        assert_eq!(report.score, Evaluation::MATE_SCORE - 3);
        let baseline = fixed_depth_negamax(&mut board, 4);
        assert_eq!(baseline.map(|(_, score)| score), Some(Evaluation::MATE_SCORE - 3));
    }

    #[test]
    fn takes_hanging_queen() {
        let mut board = Board::new("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
        let report = searcher().search_best(&mut board, SearchLimits::depth(3));
        assert_eq!(report.best_move, Move::new_quiet(11, 35));
        assert!(report.score > 300);
    }

    #[test]
    fn search_leaves_board_untouched() {
        let mut board = Board::new(STARTING_POSITION);
        let (fen, hash) = (board.get_fen(), board.hash());
        let report = searcher().search_best(&mut board, SearchLimits::depth(4));
        assert_eq!(report.depth, 4);
        assert!(report.nodes > 0);
        assert!(!report.best_move.is_null());
        assert_eq!(board.get_fen(), fen);
        assert_eq!(board.hash(), hash);
    }

    #[test]
    fn respects_time_budget() {
        let mut board = Board::new("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let start = Instant::now();
        let report = searcher().search_best(&mut board, SearchLimits::time(Duration::from_millis(200)));
        assert!(start.elapsed() < Duration::from_millis(700));
        assert!(!report.best_move.is_null());
    }

    #[test]
    fn no_moves_gives_null_move() {
        let mut board = Board::new("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let report = searcher().search_best(&mut board, SearchLimits::depth(2));
        assert!(report.best_move.is_null());
    }

    #[test]
    fn configuration_variants_agree_on_mate() {
        let mut config = SearchConfig::default();
        config
            .set_tt_size_log2(12)
            .set_late_move_reduction(false)
            .set_quiescence(true)
            .set_extensions(ExtensionPolicy::none())
            .set_promotions(PromotionMode::All);
        let mut board = Board::new("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let report = Searcher::new(config).search_best(&mut board, SearchLimits::depth(3));
        assert_eq!(report.best_move, Move::new_quiet(0, 56));
    }

    #[test]
    fn mate_scores_shift_with_ply() {
        let score = Evaluation::MATE_SCORE - 5;
        assert_eq!(from_table(to_table(score, 3), 3), score);
        assert_eq!(to_table(-score, 2), -score - 2);
        assert_eq!(to_table(120, 9), 120);
    }

    #[test]
    fn node_types_follow_the_window() {
        // White is a queen up
        let fen = "k7/8/8/8/8/8/8/KQ6 w - - 0 1";
        let stored = |alpha: Score, beta: Score| {
            let mut board = Board::new(fen);
            let mut searcher = searcher();
            let score = searcher.search(&mut board, 2, 1, alpha, beta, 0, Move::NULL);
            let entry = searcher.table().get(board.hash()).map(|e| (e.node_type, e.score));
            (score, entry)
        };

        let (score, entry) = stored(-100, -50);
        assert!(score >= -50);
        assert_eq!(entry.map(|e| e.0), Some(NodeType::LowerBound));

        let (score, entry) = stored(50_000, 50_100);
        assert_eq!(score, 50_000);
        assert_eq!(entry, Some((NodeType::UpperBound, 50_000)));

        let (score, entry) = stored(-Evaluation::INFINITY, Evaluation::INFINITY);
        assert!(score > 500);
        assert_eq!(entry, Some((NodeType::Exact, score)));
    }

    #[test]
    fn root_adopts_deep_exact_entries() {
        let mut board = Board::default();
        let mut searcher = searcher();
        let report = searcher.search_best(&mut board, SearchLimits::depth(3));
        let root_moves = generate(&mut board, GenType::Legal, PromotionMode::QueenOnly);

        // The last pass stored its result, asking again costs no node
        let nodes = searcher.nodes;
        let adopted = searcher.search_root(&mut board, 3, &root_moves, Move::NULL);
        assert_eq!(adopted, Some((report.best_move, report.score)));
        assert_eq!(searcher.nodes, nodes);

        // A deeper pass still has to search
        assert!(searcher.search_root(&mut board, 4, &root_moves, Move::NULL).is_some());
        assert!(searcher.nodes > nodes);
    }
}
