use std::{fmt::Display, ops::AddAssign};

use log::info;

use crate::core::definitions::{GameState, MatchInterface, Move};
use crate::core::engine::Piece;
use crate::core::game::GameSession;

/** Node counters of a move generation walk, one jump of a chain is one ply */
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PERFResult {
    pub all: usize,
    pub captures: usize,
    pub promotions: usize,
    pub continuations: usize,
    pub wins: usize,
}

impl PERFResult {
    pub fn combine(self, other: PERFResult) -> Self {
        PERFResult {
            all: self.all + other.all,
            captures: self.captures + other.captures,
            promotions: self.promotions + other.promotions,
            continuations: self.continuations + other.continuations,
            wins: self.wins + other.wins,
        }
    }
}

impl AddAssign for PERFResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.combine(rhs);
    }
}

impl Display for PERFResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - cp: {:<4} pr: {:<4} ch: {:<4} W: {:4}",
            self.all, self.captures, self.promotions, self.continuations, self.wins
        )
    }
}

fn count_move(game: &GameSession, _move: Move) -> (GameSession, PERFResult) {
    let (x0, y0) = _move.from;
    let (x1, y1) = _move.to;
    let was_king = game.board().get(x0, y0).is_some_and(Piece::is_king);
    let mut next = game.clone();
    let state = next.execute_move(_move);
    let crowned = next.board().get(x1, y1).is_some_and(Piece::is_king);
    let result = PERFResult {
        all: 1,
        captures: _move.capture as usize,
        promotions: (!was_king && crowned) as usize,
        continuations: matches!(state, GameState::Continuation(_)) as usize,
        wins: matches!(state, GameState::Finished { .. }) as usize,
    };
    (next, result)
}

fn expand(game: &GameSession, _move: Move, depth: usize) -> PERFResult {
    let (next, counted) = count_move(game, _move);
    if depth == 1 {
        counted
    } else if next.game_ended() {
        PERFResult {
            wins: 1,
            ..Default::default()
        }
    } else {
        perf_test_step(&next, depth - 1)
    }
}

fn perf_test_step(game: &GameSession, depth: usize) -> PERFResult {
    if depth == 0 {
        return PERFResult {
            all: 1,
            ..Default::default()
        };
    }
    game.available_moves()
        .into_iter()
        .map(|_move| expand(game, _move, depth))
        .fold(PERFResult::default(), PERFResult::combine)
}

pub fn perft(game: &GameSession, depth: usize) -> PERFResult {
    perf_test_step(game, depth)
}

pub fn perf_test(game: &GameSession, depth: usize, expected: usize, detailed: bool) -> bool {
    #[cfg(test)]
    println!(" - setup: depth: {depth} detailed: {detailed}\n{}", game.board());
    if detailed && depth > 0 {
        let mut total = PERFResult::default();
        for _move in game.available_moves() {
            let result = expand(game, _move, depth);
            println!(" {_move} : {result}");
            total += result;
        }
        println!("+ total: {total}");
        total.all == expected
    } else {
        let result = perft(game, depth);
        info!("perft {depth}: {result}");
        result.all == expected
    }
}
