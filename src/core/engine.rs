use std::collections::BTreeSet;
use std::fmt::{Debug, Display};

use log::trace;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::core::utils::{compact_pos, is_on_board, unpack_pos};

/** Index of a piece inside the board's arena */
pub type PieceId = usize;

/** Players are identified by the colour they play */
pub type PlayerId = Color;

/** Squares occupied in the starting layout, `(x, y)` */
#[rustfmt::skip]
const WHITE_SETUP: [(u8, u8); 12] = [
    (0, 0), (2, 0), (4, 0), (6, 0),
    (1, 1), (3, 1), (5, 1), (7, 1),
    (0, 2), (2, 2), (4, 2), (6, 2),
];
#[rustfmt::skip]
const BLACK_SETUP: [(u8, u8); 12] = [
    (1, 5), (3, 5), (5, 5), (7, 5),
    (0, 6), (2, 6), (4, 6), (6, 6),
    (1, 7), (3, 7), (5, 7), (7, 7),
];

pub const PIECES_PER_PLAYER: usize = WHITE_SETUP.len();

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub enum Color {
    #[default]
    White = 0,
    Black = 1,
}

impl Color {
    pub fn opposite(self) -> Color {
        if self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    /** Row direction in which men of this colour advance */
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn setup(self) -> &'static [(u8, u8)] {
        match self {
            Color::White => &WHITE_SETUP,
            Color::Black => &BLACK_SETUP,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(if self == &Self::White {
            "White"
        } else {
            "Black"
        })
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    color: Color,
    direction: i8,
    kinged: bool,
    owner: PlayerId,
}

impl Piece {
    pub fn new(color: Color) -> Piece {
        Piece {
            color,
            direction: color.forward(),
            kinged: false,
            owner: color,
        }
    }

    pub fn king(color: Color) -> Piece {
        Piece {
            kinged: true,
            ..Piece::new(color)
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn is_king(&self) -> bool {
        self.kinged
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    /** Kinging is permanent, there is no way back */
    fn make_king(&mut self) {
        self.kinged = true;
    }

    fn symbol(&self) -> char {
        match (self.color, self.kinged) {
            (Color::White, false) => 'w',
            (Color::White, true) => 'W',
            (Color::Black, false) => 'b',
            (Color::Black, true) => 'B',
        }
    }
}

impl Debug for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Piece")
            .field("color", &self.color)
            .field("direction", &self.direction)
            .field("kinged", &self.kinged)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    pieces: BTreeSet<PieceId>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Player {
        Player {
            id,
            name: name.into(),
            pieces: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pieces(&self) -> &BTreeSet<PieceId> {
        &self.pieces
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn owns(&self, id: PieceId) -> bool {
        self.pieces.contains(&id)
    }

    pub(crate) fn add_piece(&mut self, id: PieceId) {
        self.pieces.insert(id);
    }

    pub(crate) fn remove_piece(&mut self, id: PieceId) -> bool {
        self.pieces.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.pieces.clear();
    }
}

/** 8x8 draughts board stored as a 0x88 array of arena indices */
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde_as(as = "[_; 128]")]
    cells: [Option<PieceId>; 128],
    pieces: Vec<Piece>,
}

impl Board {
    /** Empty board */
    pub fn new() -> Board {
        Board {
            cells: [None; 128],
            pieces: Vec::with_capacity(2 * PIECES_PER_PLAYER),
        }
    }

    /** Adds `piece` to the arena and puts it on `(x, y)` */
    pub fn place(&mut self, x: u8, y: u8, piece: Piece) -> PieceId {
        debug_assert!(is_on_board(x, y), "Placing piece outside of board!");
        let id = self.pieces.len();
        self.pieces.push(piece);
        self.cells[compact_pos(x, y) as usize] = Some(id);
        id
    }

    pub fn remove(&mut self, x: u8, y: u8) -> Option<PieceId> {
        self.cells[compact_pos(x, y) as usize].take()
    }

    pub fn id_at(&self, x: u8, y: u8) -> Option<PieceId> {
        self.cells[compact_pos(x, y) as usize]
    }

    pub fn get(&self, x: u8, y: u8) -> Option<&Piece> {
        self.id_at(x, y).map(|id| &self.pieces[id])
    }

    pub(crate) fn at_pos(&self, pos: u8) -> Option<&Piece> {
        self.cells[pos as usize].map(|id| &self.pieces[id])
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id]
    }

    /** Relocates occupant of `(x0, y0)`, the source must not be empty */
    pub fn move_piece(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) {
        let id = self.remove(x0, y0);
        assert!(id.is_some(), "Trying to move from empty square!");
        trace!("Moving {:?} from ({x0}, {y0}) to ({x1}, {y1})", id);
        self.cells[compact_pos(x1, y1) as usize] = id;
    }

    pub fn make_king(&mut self, x: u8, y: u8) {
        if let Some(id) = self.id_at(x, y) {
            self.pieces[id].make_king();
        }
    }

    pub fn reset(&mut self) {
        self.cells = [None; 128];
        self.pieces.clear();
    }

    /** Occupied squares, row by row */
    pub fn iter_pieces(&self) -> impl Iterator<Item = ((u8, u8), PieceId)> + '_ {
        ITER_INDEX
            .iter()
            .filter_map(|&pos| self.cells[pos as usize].map(|id| (unpack_pos(pos), id)))
    }

    /** Puts the starting layout of `color` on the board, returns new ids */
    pub(crate) fn set_up(&mut self, color: Color) -> Vec<PieceId> {
        color
            .setup()
            .iter()
            .map(|&(x, y)| self.place(x, y, Piece::new(color)))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        let mut board = Board::new();
        board.set_up(Color::White);
        board.set_up(Color::Black);
        board
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..8 {
            let row: String = (0..8)
                .map(|x| self.get(x, y).map(Piece::symbol).unwrap_or('.'))
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

const ITER_INDEX: [u8; 64] = {
    let mut arr = [0; 64];
    let mut i = 0;
    while i < 64 {
        arr[i] = ((i / 8) << 4 | i % 8) as u8;
        i += 1;
    }
    arr
};
