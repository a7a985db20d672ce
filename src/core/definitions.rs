use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::core::engine::Color;

#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub color: Color,
    pub king: bool,
    pub selected: bool,
    pub can_move: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Figure(Figure),
}

/** Single step of a piece, a jump when `capture` is set */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Move {
    pub from: (u8, u8),
    pub to: (u8, u8),
    pub capture: bool,
}

impl Move {
    pub fn quiet(from: (u8, u8), to: (u8, u8)) -> Move {
        Move {
            from,
            to,
            capture: false,
        }
    }

    pub fn capture(from: (u8, u8), to: (u8, u8)) -> Move {
        Move {
            from,
            to,
            capture: true,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (x0, y0) = self.from;
        let (x1, y1) = self.to;
        let sep = if self.capture { 'x' } else { '-' };
        write!(f, "({x0},{y0}){sep}({x1},{y1})")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    /** Player is free to pick any movable piece */
    PlayerMove(Color),
    /** Player has to keep jumping with the selected piece */
    Continuation(Color),
    Finished { winner: Color },
}

/** What a presentation layer needs from a running match */
pub trait MatchInterface {
    fn current_board(&self) -> Vec<Vec<Cell>>;
    fn cell(&self, x: usize, y: usize) -> Option<Cell>;
    fn possible_moves(&self, x: usize, y: usize) -> Option<Vec<Move>>;
    fn execute_move(&mut self, _move: Move) -> GameState;
    fn wait_move(&mut self) -> GameState;
    // info
    fn current_player(&self) -> Color;
    fn game_ended(&self) -> bool;
}
