use checkers_engine::{
    legal_moves, movable_pieces_for, utils::perft, Board, Color, GameSession, MatchInterface,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

fn all_legal_moves(board: &Board) -> usize {
    board
        .iter_pieces()
        .map(|((x, y), _)| legal_moves(board, x, y).len())
        .sum()
}

fn random_game(mut game: GameSession, max_steps: usize, rng: &mut StdRng) -> GameSession {
    for _ in 0..max_steps {
        let Some(&_move) = game.available_moves().choose(rng) else {
            break;
        };
        game.execute_move(_move);
    }
    game
}

fn utils_benchmark(c: &mut Criterion) {
    c.bench_function("legal moves of every piece", |b| {
        b.iter(|| all_legal_moves(black_box(&Board::default())))
    });
    c.bench_function("movable pieces", |b| {
        b.iter(|| movable_pieces_for(black_box(&Board::default()), Color::White))
    });
    c.bench_function("reset", |b| {
        let mut game = GameSession::new();
        b.iter(|| black_box(&mut game).reset())
    });
    c.bench_function("random game 100", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| random_game(GameSession::new(), 100, &mut rng))
    });
}

fn perft_benchmark(c: &mut Criterion) {
    let game = GameSession::new();
    for (depth, expected) in [(5, 7361), (6, 36768)] {
        c.bench_function(&format!("perft start - depth {depth}"), |b| {
            b.iter(|| assert_eq!(perft(black_box(&game), depth).all, expected))
        });
    }
}

criterion_group!(benches, utils_benchmark, perft_benchmark);
criterion_main!(benches);
