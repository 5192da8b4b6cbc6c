use super::board::{FenError, Position};
use super::piece::{Color, Piece};
use super::square::{Move, MoveParseError, Square};

/// A game session: the live position plus its two history logs.
///
/// `snapshots[i]` is the position string from before `moves[i]` was played;
/// both logs grow and shrink together.
#[derive(Clone, Debug)]
pub struct Xiangqi {
    position: Position,
    snapshots: Vec<String>,
    moves: Vec<Move>,
}

impl Xiangqi {
    pub fn new() -> Self {
        Self::from_position(Position::start())
    }

    pub fn from_position(position: Position) -> Self {
        Self {
            position,
            snapshots: Vec::new(),
            moves: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Replaces the position and starts both logs afresh.
    pub fn load(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn turn(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn get(&self, row: i8, col: i8) -> Option<Piece> {
        self.position.get(row, col)
    }

    pub fn moves_from(&self, from: Square) -> Vec<Square> {
        self.position.moves_from(from)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    pub fn move_history(&self) -> &[Move] {
        &self.moves
    }

    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }

    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    /// Plays `mv` if it is legal for the side to move. Returns false, without
    /// touching anything, otherwise.
    pub fn apply(&mut self, mv: Move) -> bool {
        if self.position.board[mv.from].map(|piece| piece.color) != Some(self.turn()) {
            return false;
        }
        if !self.position.is_legal(mv) {
            return false;
        }

        self.snapshots.push(self.position.fen());
        self.moves.push(mv);
        self.position.board.relocate(mv.from, mv.to);
        self.position.side_to_move = self.position.side_to_move.opponent();
        true
    }

    /// Parses compact notation first; malformed text never reaches `apply`.
    pub fn apply_notation(&mut self, notation: &str) -> Result<bool, MoveParseError> {
        let mv: Move = notation.parse()?;
        Ok(self.apply(mv))
    }

    /// Steps back one move. Does nothing on a fresh game, or when the
    /// snapshot cannot be read; both logs then stay as they are.
    pub fn undo(&mut self) -> Option<Move> {
        let snapshot = self.snapshots.last()?;
        match Position::from_fen(snapshot) {
            Ok(position) => {
                self.position = position;
                self.snapshots.pop();
                self.moves.pop()
            }
            Err(e) => {
                tracing::error!("cannot restore snapshot '{}': {}", snapshot, e);
                None
            }
        }
    }

    /// True once either general has left the board. Checkmate, stalemate and
    /// repetition are not detected.
    pub fn is_game_over(&self) -> bool {
        self.position.board.find_general(Color::Red).is_none()
            || self.position.board.find_general(Color::Black).is_none()
    }

    /// The side whose general is still standing, once the game is over.
    pub fn winner(&self) -> Option<Color> {
        let board = &self.position.board;
        match (board.find_general(Color::Red), board.find_general(Color::Black)) {
            (Some(_), None) => Some(Color::Red),
            (None, Some(_)) => Some(Color::Black),
            _ => None,
        }
    }
}

impl Default for Xiangqi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xiangqi::{PieceKind, START_FEN};

    fn mv(notation: &str) -> Move {
        notation.parse().unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = Xiangqi::new();
        assert_eq!(game.fen(), START_FEN);
        assert_eq!(game.turn(), Color::Red);
        assert!(!game.is_game_over());
        assert_eq!(game.winner(), None);
        assert!(game.move_history().is_empty());
    }

    #[test]
    fn test_apply_records_history_and_flips_side() {
        let mut game = Xiangqi::new();
        assert!(game.apply(mv("h2e2")));

        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.move_history(), &[mv("h2e2")]);
        assert_eq!(game.snapshots(), &[START_FEN.to_string()]);
        assert_eq!(game.get(7, 4), Some(Piece::new(PieceKind::Cannon, Color::Red)));
        assert_eq!(game.get(7, 7), None);
        assert_eq!(
            game.fen(),
            "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR b - - 0 1"
        );
    }

    #[test]
    fn test_apply_rejects_wrong_side_and_illegal_targets() {
        let mut game = Xiangqi::new();
        let before = game.fen();

        assert!(!game.apply(mv("h7e7")));
        assert!(!game.apply(mv("e5e4")));
        assert!(!game.apply(mv("b0b2")));

        assert_eq!(game.fen(), before);
        assert!(game.move_history().is_empty());
        assert!(game.snapshots().is_empty());
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let mut game = Xiangqi::new();
        assert!(game.apply(mv("h2e2")));
        let after_first = game.fen();
        assert!(game.apply(mv("h9g7")));

        assert_eq!(game.undo(), Some(mv("h9g7")));
        assert_eq!(game.fen(), after_first);
        assert_eq!(game.move_history().len(), 1);
        assert_eq!(game.snapshots().len(), 1);

        assert_eq!(game.undo(), Some(mv("h2e2")));
        assert_eq!(game.fen(), START_FEN);
        assert!(game.move_history().is_empty());
        assert!(game.snapshots().is_empty());
    }

    #[test]
    fn test_undo_on_fresh_game_is_noop() {
        let mut game = Xiangqi::new();
        assert_eq!(game.undo(), None);
        assert_eq!(game.fen(), START_FEN);
    }

    #[test]
    fn test_undo_restores_captured_piece() {
        let mut game = Xiangqi::new();
        assert!(game.apply(mv("b2b9")));
        assert_eq!(game.get(0, 1), Some(Piece::new(PieceKind::Cannon, Color::Red)));
        game.undo();
        assert_eq!(game.get(0, 1), Some(Piece::new(PieceKind::Horse, Color::Black)));
        assert_eq!(game.turn(), Color::Red);
    }

    #[test]
    fn test_malformed_notation_is_an_error() {
        let mut game = Xiangqi::new();
        assert!(game.apply_notation("h2e").is_err());
        assert!(game.apply_notation("z2e2").is_err());
        assert_eq!(game.apply_notation("h2h8"), Ok(false));
        assert_eq!(game.fen(), START_FEN);
        assert_eq!(game.apply_notation("h2e2"), Ok(true));
    }

    #[test]
    fn test_capturing_general_ends_game() {
        let mut game = Xiangqi::from_fen("4k4/9/9/9/9/9/9/9/4R4/3K5 w - - 0 1").unwrap();
        assert!(!game.is_game_over());
        assert!(game.apply(mv("e1e9")));
        assert!(game.is_game_over());
        assert_eq!(game.winner(), Some(Color::Red));
    }

    #[test]
    fn test_load_clears_history() {
        let mut game = Xiangqi::new();
        game.apply(mv("h2e2"));
        game.load("4k4/9/9/9/9/9/9/9/9/3K5 b - - 0 1").unwrap();
        assert_eq!(game.turn(), Color::Black);
        assert!(game.move_history().is_empty());
        assert!(game.snapshots().is_empty());

        assert!(game.load("bogus").is_err());
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn test_random_walk_roundtrips() {
        let mut game = Xiangqi::new();
        for ply in 0..60 {
            let moves = game.legal_moves();
            if moves.is_empty() || game.is_game_over() {
                break;
            }
            let fen = game.fen();
            assert_eq!(Position::from_fen(&fen).unwrap(), *game.position());
            assert!(game.apply(moves[(ply * 7) % moves.len()]));
        }
        while game.undo().is_some() {}
        assert_eq!(game.fen(), START_FEN);
    }

    #[test]
    fn test_unreadable_snapshot_keeps_logs_in_step() {
        let mut game = Xiangqi::new();
        assert!(game.apply(mv("h2e2")));
        let fen = game.fen();
        game.snapshots[0] = "not a position".to_string();

        assert_eq!(game.undo(), None);
        assert_eq!(game.move_history(), &[mv("h2e2")]);
        assert_eq!(game.snapshots().len(), 1);
        assert_eq!(game.fen(), fen);
    }
}
