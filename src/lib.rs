use std::time::Instant;

use crate::board::Board;
use crate::move_generator::{generate, GenType, PromotionMode};
use crate::r#move::Move;

pub mod board;
pub mod castling;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod game_result;
pub mod game_state;
pub mod r#move;
pub mod move_generator;
pub mod move_ordering;
pub mod movelist;
pub mod opening_book;
pub mod piece;
pub mod piece_list;
pub mod search;
pub mod square;
pub mod transposition_table;
pub mod uci;
pub mod zob_hash;

pub use engine::{Engine, EngineConfig};
pub use error::{EngineError, EngineResult};

/// Prints node counts for every depth up to `depth`, then the per-move split of the last one
pub fn perft_report(depth: u32, fen: Option<String>) {
    println!("perft");
    let mut board = match fen {
        None => Board::default(),
        Some(f) => Board::new(&f),
    };
    println!("{}\n", board);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = perft(&mut board, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
    if depth > 0 {
        println!("\nmove nodes\n--------");
        for (mv, nodes) in perft_divide(&mut board, depth) {
            println!("{}  {}", mv, nodes);
        }
    }
}

/// Number of leaf nodes of the legal move tree, every promotion included
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(board, GenType::Legal, PromotionMode::All);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in &moves {
        board.make_move(*mv, false, false);
        nodes += perft(board, depth - 1);
        board.unmake_move(*mv, false, false);
    }
    nodes
}

/// Leaf counts below each root move
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let moves = generate(board, GenType::Legal, PromotionMode::All);
    let mut split = Vec::with_capacity(moves.len());
    for mv in &moves {
        board.make_move(*mv, false, false);
        split.push((*mv, perft(board, depth.saturating_sub(1))));
        board.unmake_move(*mv, false, false);
    }
    split
}
