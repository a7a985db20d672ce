use log::trace;

use crate::core::definitions::Move;
use crate::core::engine::{Board, PieceId, PlayerId};
use crate::core::utils::{compact_pos, diagonal_steps, in_direction, unpack_pos};

/// Moves of the piece standing on `(x, y)`.
///
/// Men look only forward, kings forward and then backward; inside each
/// direction the left diagonal comes before the right one. Captures
/// suppress every quiet move of the same piece, so the first element tells
/// whether the piece can capture at all.
pub fn legal_moves(board: &Board, x: u8, y: u8) -> Vec<Move> {
    let Some(piece) = board.get(x, y) else {
        return Vec::new();
    };
    let mut directions = vec![piece.direction()];
    if piece.is_king() {
        directions.push(-piece.direction());
    }
    let from = compact_pos(x, y);
    let mut moves = Vec::with_capacity(4);
    for direction in directions {
        let (left, right) = diagonal_steps(direction);
        for step in [left, right] {
            let mut diagonal = in_direction(from, step);
            let Some(near) = diagonal.next() else {
                continue;
            };
            match board.at_pos(near) {
                None => moves.push(Move::quiet((x, y), unpack_pos(near))),
                Some(neighbour) if neighbour.owner() != piece.owner() => {
                    if let Some(landing) = diagonal.next() {
                        if board.at_pos(landing).is_none() {
                            moves.push(Move::capture((x, y), unpack_pos(landing)));
                        }
                    }
                }
                Some(_) => (),
            }
        }
    }
    if moves.iter().any(|_move| _move.capture) {
        moves.retain(|_move| _move.capture);
    }
    trace!("Moves from ({x}, {y}): {moves:?}");
    moves
}

/// Pieces of `player` that may move this turn.
///
/// As soon as one piece is able to capture, pieces collected before it are
/// dropped and only capturing pieces are collected from then on.
pub fn movable_pieces_for(board: &Board, player: PlayerId) -> Vec<PieceId> {
    let mut capture_seen = false;
    let mut movable = Vec::new();
    for ((x, y), id) in board.iter_pieces() {
        if board.piece(id).owner() != player {
            continue;
        }
        let Some(first) = legal_moves(board, x, y).into_iter().next() else {
            continue;
        };
        if first.capture {
            if !capture_seen {
                capture_seen = true;
                movable.clear();
            }
            movable.push(id);
        } else if !capture_seen {
            movable.push(id);
        }
    }
    movable
}

/// Kings every man standing on the far row of its direction.
///
/// Both back rows are scanned after each move, not only the moved piece.
pub fn promote_kings(board: &mut Board) {
    for x in 0..8 {
        if board.get(x, 0).is_some_and(|piece| piece.direction() < 0) {
            board.make_king(x, 0);
        }
        if board.get(x, 7).is_some_and(|piece| piece.direction() > 0) {
            board.make_king(x, 7);
        }
    }
}
