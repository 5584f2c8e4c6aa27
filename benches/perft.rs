use corvid::board::Board;
use corvid::move_generator::{generate, GenType, PromotionMode};
use corvid::search::{SearchConfig, SearchLimits, Searcher};
use criterion::{criterion_group, criterion_main, Criterion};

// A pure perft function, with no node counting, simply make/unmake and
// move generation
fn perft(board: &mut Board, depth: u64) {
    if depth == 0 {
        return;
    }
    for m in &generate(board, GenType::Legal, PromotionMode::All) {
        board.make_move(*m, false, false);
        perft(board, depth - 1);
        board.unmake_move(*m, false, false);
    }
}

fn perft_bench(c: &mut Criterion) {
    // The positions are taken from the chess programming wiki
    // https://www.chessprogramming.org/Perft_Results
    let mut board = Board::new("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    c.bench_function("perft initial 4", |b| b.iter(|| perft(&mut board, 4)));
    board = Board::new("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    c.bench_function("perft kiwipete 3", |b| b.iter(|| perft(&mut board, 3)));
    board = Board::new("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10");
    c.bench_function("perft alternative 3", |b| b.iter(|| perft(&mut board, 3)));
}

fn search_bench(c: &mut Criterion) {
    let mut board = Board::new("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10");
    let mut config = SearchConfig::default();
    config.set_tt_size_log2(16);
    c.bench_function("search alternative depth 4", |b| {
        b.iter(|| {
            // Cold tables on every run
            let mut searcher = Searcher::new(config.clone());
            searcher.search_best(&mut board, SearchLimits::depth(4))
        })
    });
}

criterion_group!(benches, perft_bench, search_bench);
criterion_main!(benches);
