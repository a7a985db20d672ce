pub mod core;
pub mod utils;

// module re-exports
pub use crate::core::definitions::{Cell, Figure, GameState, MatchInterface, Move};
pub use crate::core::engine::{Board, Color, Piece, PieceId, Player, PlayerId};
pub use crate::core::game::GameSession;
pub use crate::core::rules::{legal_moves, movable_pieces_for, promote_kings};
