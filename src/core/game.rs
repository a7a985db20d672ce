use anyhow::bail;
use log::{debug, info, trace};

use crate::core::definitions::{Cell, Figure, GameState, MatchInterface, Move};
use crate::core::engine::{Board, Color, Piece, PieceId, Player, PlayerId, PIECES_PER_PLAYER};
use crate::core::rules::{legal_moves, movable_pieces_for, promote_kings};
use crate::core::utils::{is_on_board, skewed_midpoint};

/// Running match: board, both players and the turn state around them.
///
/// The presentation layer owns one session, feeds clicks into
/// [`GameSession::select_or_move`] and reads everything else through the
/// accessors.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    players: [Player; 2],
    current_turn: Color,
    selected: Option<(u8, u8)>,
    movable: Vec<PieceId>,
    forced: bool,
    winner: Option<PlayerId>,
}

impl GameSession {
    pub fn new() -> GameSession {
        GameSession::with_names("White", "Black")
    }

    pub fn with_names(white: &str, black: &str) -> GameSession {
        let mut session = GameSession::empty(white, black);
        session.reset();
        session
    }

    fn empty(white: &str, black: &str) -> GameSession {
        GameSession {
            board: Board::new(),
            players: [
                Player::new(Color::White, white),
                Player::new(Color::Black, black),
            ],
            current_turn: Color::White,
            selected: None,
            movable: Vec::new(),
            forced: false,
            winner: None,
        }
    }

    /// Builds a session from a board diagram.
    ///
    /// Eight rows, row 0 first; `.` is an empty square, `w`/`b` are men and
    /// `W`/`B` are kings. Blank lines and surrounding whitespace are ignored,
    /// so `board.to_string()` is accepted back.
    pub fn from_diagram(diagram: &str, to_move: Color) -> anyhow::Result<GameSession> {
        let rows: Vec<&str> = diagram
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != 8 {
            bail!("Board diagram must have 8 rows, found {}", rows.len());
        }
        let mut session = GameSession::empty("White", "Black");
        for (y, row) in rows.into_iter().enumerate() {
            let squares: Vec<char> = row.chars().collect();
            if squares.len() != 8 {
                bail!("Row {y} must have 8 squares, found {}", squares.len());
            }
            for (x, symbol) in squares.into_iter().enumerate() {
                let piece = match symbol {
                    '.' => continue,
                    'w' => Piece::new(Color::White),
                    'W' => Piece::king(Color::White),
                    'b' => Piece::new(Color::Black),
                    'B' => Piece::king(Color::Black),
                    other => bail!("Unknown square '{other}' at ({x}, {y})"),
                };
                let owner = piece.owner();
                let id = session.board.place(x as u8, y as u8, piece);
                session.players[owner.index()].add_piece(id);
            }
        }
        session.current_turn = to_move;
        session.set_up_turn();
        Ok(session)
    }

    /** Back to the starting position, White to move */
    pub fn reset(&mut self) {
        self.board.reset();
        for color in [Color::White, Color::Black] {
            let player = &mut self.players[color.index()];
            player.clear();
            for id in self.board.set_up(color) {
                player.add_piece(id);
            }
        }
        self.current_turn = Color::White;
        self.deselect();
        self.movable.clear();
        self.winner = None;
        info!("New game, {} to move", self.current_turn);
        self.set_up_turn();
    }

    /// Reacts to a click on board square `(x, y)`.
    ///
    /// With a piece selected, a click on one of its destinations plays the
    /// move; any other click drops the selection unless a jump chain is in
    /// progress. A click on a piece of the side to move selects it.
    pub fn select_or_move(&mut self, x: u8, y: u8) -> GameState {
        if !is_on_board(x, y) || self.winner.is_some() {
            return self.state();
        }
        if let Some((sx, sy)) = self.selected {
            let moves = self.actual_moves(sx, sy);
            let chosen = moves
                .iter()
                .find(|_move| _move.to == (x, y) && _move.capture)
                .or_else(|| moves.iter().find(|_move| _move.to == (x, y)))
                .copied();
            if let Some(_move) = chosen {
                return self.apply_move(_move);
            }
            if self.forced {
                trace!("({x}, {y}) ignored, jump chain from ({sx}, {sy}) must go on");
                return self.state();
            }
            self.selected = None;
        }
        match self.board.get(x, y) {
            Some(piece) if piece.owner() == self.current_turn => {
                debug!("{} selected ({x}, {y})", self.current_turn);
                self.selected = Some((x, y));
            }
            _ => (),
        }
        self.state()
    }

    /// Plays `_move` for the selected piece.
    ///
    /// The move must come from [`GameSession::selected_moves`]; anything
    /// else is a logic error and panics.
    pub fn apply_move(&mut self, _move: Move) -> GameState {
        assert!(self.winner.is_none(), "Trying to move after the game ended!");
        assert!(
            self.selected == Some(_move.from),
            "Move {_move} doesn't start from the selected square!"
        );
        assert!(
            self.actual_moves(_move.from.0, _move.from.1).contains(&_move),
            "Illegal move {_move}!"
        );
        debug!("{} plays {_move}", self.current_turn);
        let ((x0, y0), (x1, y1)) = (_move.from, _move.to);
        if !_move.capture {
            self.board.move_piece(x0, y0, x1, y1);
            promote_kings(&mut self.board);
            self.start_new_turn();
            return self.state();
        }
        let (mx, my) = skewed_midpoint(_move.from, _move.to);
        let Some(captured) = self.board.remove(mx, my) else {
            panic!("Jumped over empty square ({mx}, {my})!");
        };
        let owner = self.board.piece(captured).owner();
        self.players[owner.index()].remove_piece(captured);
        self.board.move_piece(x0, y0, x1, y1);
        promote_kings(&mut self.board);
        let can_jump_again = legal_moves(&self.board, x1, y1)
            .first()
            .is_some_and(|next| next.capture);
        if can_jump_again {
            debug!("{} continues jumping from ({x1}, {y1})", self.current_turn);
            self.selected = Some(_move.to);
            self.forced = true;
        } else {
            self.start_new_turn();
        }
        self.state()
    }

    fn deselect(&mut self) {
        self.selected = None;
        self.forced = false;
    }

    fn start_new_turn(&mut self) {
        self.deselect();
        self.current_turn = self.current_turn.opposite();
        info!("{} to move", self.current_turn);
        self.set_up_turn();
    }

    fn set_up_turn(&mut self) {
        self.movable = movable_pieces_for(&self.board, self.current_turn);
        if self.movable.is_empty() {
            let winner = self.current_turn.opposite();
            info!(
                "{} has no moves, {} wins",
                self.current_turn,
                self.player(winner).name()
            );
            self.winner = Some(winner);
        } else {
            trace!("Movable pieces: {:?}", self.movable);
        }
    }

    /// Moves the side to move may play with the piece on `(x, y)`.
    ///
    /// Empty unless the piece is among this turn's movable pieces; during a
    /// jump chain only the jumping piece has moves.
    pub fn actual_moves(&self, x: u8, y: u8) -> Vec<Move> {
        if !is_on_board(x, y) || (self.forced && self.selected != Some((x, y))) {
            return Vec::new();
        }
        match self.board.id_at(x, y) {
            Some(id) if self.movable.contains(&id) => legal_moves(&self.board, x, y),
            _ => Vec::new(),
        }
    }

    /** Every move the side to move can play right now */
    pub fn available_moves(&self) -> Vec<Move> {
        if self.winner.is_some() {
            return Vec::new();
        }
        if let (true, Some((x, y))) = (self.forced, self.selected) {
            return self.actual_moves(x, y);
        }
        self.board
            .iter_pieces()
            .filter(|(_, id)| self.movable.contains(id))
            .flat_map(|((x, y), _)| self.actual_moves(x, y))
            .collect()
    }

    pub fn selected_moves(&self) -> Vec<Move> {
        self.selected
            .map(|(x, y)| self.actual_moves(x, y))
            .unwrap_or_default()
    }

    /** Square worth highlighting under the cursor, if any */
    pub fn highlight(&self, x: u8, y: u8) -> Option<(u8, u8)> {
        if self.selected.is_some() || !is_on_board(x, y) {
            return None;
        }
        self.board
            .get(x, y)
            .filter(|piece| piece.owner() == self.current_turn)
            .map(|_| (x, y))
    }

    pub fn state(&self) -> GameState {
        match (self.winner, self.forced) {
            (Some(winner), _) => GameState::Finished { winner },
            (None, true) => GameState::Continuation(self.current_turn),
            (None, false) => GameState::PlayerMove(self.current_turn),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color.index()]
    }

    pub fn piece_count(&self, color: Color) -> usize {
        self.player(color).piece_count()
    }

    /** Pieces of `color` taken off the board so far */
    pub fn captured_count(&self, color: Color) -> usize {
        PIECES_PER_PLAYER.saturating_sub(self.piece_count(color))
    }

    pub fn selected(&self) -> Option<(u8, u8)> {
        self.selected
    }

    pub fn movable_pieces(&self) -> &[PieceId] {
        &self.movable
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn cells(&self) -> Vec<Vec<Cell>> {
        (0..8u8)
            .map(|y| (0..8u8).map(|x| self.cell_at(x, y)).collect())
            .collect()
    }

    fn cell_at(&self, x: u8, y: u8) -> Cell {
        match self.board.id_at(x, y) {
            None => Cell::Empty,
            Some(id) => {
                let piece = self.board.piece(id);
                Cell::Figure(Figure {
                    color: piece.color(),
                    king: piece.is_king(),
                    selected: self.selected == Some((x, y)),
                    can_move: self.movable.contains(&id),
                })
            }
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new()
    }
}

impl MatchInterface for GameSession {
    fn current_board(&self) -> Vec<Vec<Cell>> {
        self.cells()
    }

    fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < 8 && y < 8 {
            Some(self.cell_at(x as u8, y as u8))
        } else {
            None
        }
    }

    fn possible_moves(&self, x: usize, y: usize) -> Option<Vec<Move>> {
        if self.winner.is_some() || x >= 8 || y >= 8 {
            return None;
        }
        let moves = self.actual_moves(x as u8, y as u8);
        if moves.is_empty() {
            None
        } else {
            Some(moves)
        }
    }

    fn execute_move(&mut self, _move: Move) -> GameState {
        let (x, y) = _move.from;
        let legal = self
            .possible_moves(x as usize, y as usize)
            .is_some_and(|moves| moves.contains(&_move));
        assert!(legal, "Trying to execute illegal move {_move}!");
        self.selected = Some(_move.from);
        self.apply_move(_move)
    }

    fn wait_move(&mut self) -> GameState {
        // nothing
        self.state()
    }

    fn current_player(&self) -> Color {
        self.current_turn
    }

    fn game_ended(&self) -> bool {
        self.winner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(diagram: &str, to_move: Color) -> GameSession {
        GameSession::from_diagram(diagram, to_move).expect("valid diagram")
    }

    const DOUBLE_JUMP: &str = "
        ........
        .w......
        ..b.....
        ........
        ....b...
        ........
        ........
        .......b
    ";

    #[test]
    fn starting_session() {
        let game = GameSession::new();
        assert_eq!(game.state(), GameState::PlayerMove(Color::White));
        assert_eq!(game.piece_count(Color::White), PIECES_PER_PLAYER);
        assert_eq!(game.piece_count(Color::Black), PIECES_PER_PLAYER);
        assert_eq!(game.captured_count(Color::Black), 0);
        assert_eq!(game.movable_pieces().len(), 4);
        assert_eq!(game.player(Color::Black).name(), "Black");
        assert!(game.selected().is_none());
    }

    #[test]
    fn select_and_deselect() {
        let mut game = GameSession::new();
        game.select_or_move(5, 5);
        assert!(game.selected().is_none(), "Opponent piece got selected");
        game.select_or_move(2, 2);
        assert_eq!(game.selected(), Some((2, 2)));
        assert_eq!(game.selected_moves().len(), 2);
        game.select_or_move(0, 0);
        assert_eq!(game.selected(), Some((0, 0)));
        assert!(game.selected_moves().is_empty());
        game.select_or_move(4, 4);
        assert!(game.selected().is_none());
        game.select_or_move(9, 2);
        assert!(game.selected().is_none());
    }

    #[test]
    fn quiet_move_passes_turn() {
        let mut game = GameSession::new();
        game.select_or_move(2, 2);
        let state = game.select_or_move(3, 3);
        assert_eq!(state, GameState::PlayerMove(Color::Black));
        assert!(game.board().get(2, 2).is_none());
        assert_eq!(game.board().get(3, 3).map(Piece::color), Some(Color::White));
        assert!(game.selected().is_none());
    }

    #[test]
    fn chain_keeps_piece_selected() {
        let mut game = session(DOUBLE_JUMP, Color::White);
        game.select_or_move(1, 1);
        assert_eq!(game.selected_moves(), vec![Move::capture((1, 1), (3, 3))]);
        let state = game.select_or_move(3, 3);
        assert_eq!(state, GameState::Continuation(Color::White));
        assert_eq!(game.selected(), Some((3, 3)));
        assert!(game.board().get(2, 2).is_none());
        assert_eq!(game.piece_count(Color::Black), 2);

        // stray clicks can't break the chain
        game.select_or_move(0, 0);
        game.select_or_move(2, 4);
        assert_eq!(game.selected(), Some((3, 3)));
        assert!(game.is_forced());
        assert!(game.actual_moves(7, 7).is_empty());

        let state = game.select_or_move(5, 5);
        assert_eq!(state, GameState::PlayerMove(Color::Black));
        assert!(!game.is_forced());
        assert_eq!(game.piece_count(Color::Black), 1);
    }

    #[test]
    fn single_capture_ends_turn() {
        let mut game = session(
            "
            ........
            .w......
            ..b.....
            ........
            ........
            ........
            ........
            .......b
            ",
            Color::White,
        );
        game.select_or_move(1, 1);
        assert_eq!(
            game.select_or_move(3, 3),
            GameState::PlayerMove(Color::Black)
        );
    }

    #[test]
    fn capture_is_mandatory() {
        let mut game = session(
            "
            w.......
            ........
            ..w.....
            ...b....
            ........
            ........
            ........
            .......b
            ",
            Color::White,
        );
        assert_eq!(game.movable_pieces().len(), 1);
        game.select_or_move(0, 0);
        assert!(game.selected_moves().is_empty());
        game.select_or_move(1, 1);
        assert!(game.board().get(0, 0).is_some(), "Quiet move was played");
        assert_eq!(game.current_player(), Color::White);
    }

    #[test]
    fn last_capture_wins() {
        let mut game = session(
            "
            ........
            .w......
            ..b.....
            ........
            ........
            ........
            ........
            ........
            ",
            Color::White,
        );
        game.select_or_move(1, 1);
        let state = game.select_or_move(3, 3);
        assert_eq!(state, GameState::Finished { winner: Color::White });
        assert!(game.game_ended());

        let before = game.board().clone();
        game.select_or_move(3, 3);
        game.select_or_move(4, 4);
        assert_eq!(game.board(), &before);
        assert!(game.possible_moves(3, 3).is_none());
    }

    #[test]
    fn blocked_side_loses_immediately() {
        let game = session(
            "
            b......w
            ........
            ........
            ........
            ........
            ........
            ........
            ........
            ",
            Color::Black,
        );
        assert_eq!(game.winner(), Some(Color::White));
    }

    #[test]
    fn king_stays_king() {
        let mut game = session(
            "
            ........
            ........
            ........
            ........
            ........
            .....b..
            .w......
            ........
            ",
            Color::White,
        );
        game.select_or_move(1, 6);
        game.select_or_move(2, 7);
        assert!(game.board().get(2, 7).is_some_and(Piece::is_king));
        game.select_or_move(5, 5);
        game.select_or_move(4, 4);
        game.select_or_move(2, 7);
        assert_eq!(game.select_or_move(3, 6), GameState::PlayerMove(Color::Black));
        assert!(game.board().get(3, 6).is_some_and(Piece::is_king));
    }

    #[test]
    fn crowned_piece_keeps_jumping() {
        let mut game = session(
            "
            ........
            .......b
            ........
            ........
            ........
            .w......
            ..b.b...
            ........
            ",
            Color::White,
        );
        game.select_or_move(1, 5);
        let state = game.select_or_move(3, 7);
        assert!(game.board().get(3, 7).is_some_and(Piece::is_king));
        assert_eq!(state, GameState::Continuation(Color::White));
        assert_eq!(game.selected_moves(), vec![Move::capture((3, 7), (5, 5))]);
    }

    #[test]
    fn reset_restores_start() {
        let mut game = GameSession::new();
        game.select_or_move(2, 2);
        game.select_or_move(3, 3);
        game.select_or_move(5, 5);
        game.reset();
        assert_eq!(game.board(), &Board::default());
        assert_eq!(game.state(), GameState::PlayerMove(Color::White));
        assert!(game.selected().is_none());
        assert_eq!(game.piece_count(Color::White), PIECES_PER_PLAYER);
        assert_eq!(game.piece_count(Color::Black), PIECES_PER_PLAYER);
        assert!(game
            .board()
            .iter_pieces()
            .all(|(_, id)| !game.board().piece(id).is_king()));
    }

    #[test]
    fn hover_highlight() {
        let mut game = GameSession::new();
        assert_eq!(game.highlight(2, 2), Some((2, 2)));
        assert_eq!(game.highlight(5, 5), None);
        assert_eq!(game.highlight(3, 3), None);
        game.select_or_move(2, 2);
        assert_eq!(game.highlight(4, 2), None);
    }

    #[test]
    fn bad_diagrams() {
        assert!(GameSession::from_diagram("........", Color::White).is_err());
        let wide = "........\n".repeat(7) + ".........";
        assert!(GameSession::from_diagram(&wide, Color::White).is_err());
        let unknown = "........\n".repeat(7) + "...x....";
        assert!(GameSession::from_diagram(&unknown, Color::White).is_err());
    }

    #[test]
    fn diagram_round_trip() {
        let game = GameSession::new();
        let copy = GameSession::from_diagram(&game.board().to_string(), Color::White).unwrap();
        assert_eq!(copy.board(), game.board());
        assert_eq!(copy.movable_pieces(), game.movable_pieces());
    }

    #[test]
    fn interface_moves() {
        let mut game = GameSession::new();
        assert!(game.possible_moves(1, 1).is_none());
        let moves = game.possible_moves(6, 2).expect("piece can move");
        assert_eq!(moves.len(), 2);
        let state = game.execute_move(moves[1]);
        assert_eq!(state, GameState::PlayerMove(Color::Black));
        assert_eq!(game.cell(7, 3), Some(Cell::Figure(Figure {
            color: Color::White,
            king: false,
            selected: false,
            can_move: false,
        })));
        assert_eq!(game.cell(8, 0), None);
    }

    #[test]
    #[should_panic(expected = "illegal move")]
    fn interface_rejects_illegal() {
        let mut game = GameSession::new();
        game.execute_move(Move::quiet((2, 2), (2, 3)));
    }
}
