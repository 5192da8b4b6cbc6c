//! International chess, delegated to shakmaty
//!
//! Mirrors the shape of [`crate::xiangqi::Xiangqi`]: a FEN snapshot per
//! played move for undo, and the SAN of each move for the history shown to
//! players and sent to the oracle.

use shakmaty::san::{San, SanPlus};
use shakmaty::{fen::Fen, CastlingMode, Chess, Color, EnPassantMode, File, Move, Piece, Position, Rank, Role, Square};

use crate::error::{Error, Result};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone, Debug)]
pub struct ChessGame {
    position: Chess,
    snapshots: Vec<String>,
    moves: Vec<String>,
}

impl ChessGame {
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
            snapshots: Vec::new(),
            moves: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self {
            position: parse_fen(fen)?,
            snapshots: Vec::new(),
            moves: Vec::new(),
        })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn move_history(&self) -> &[String] {
        &self.moves
    }

    pub fn legal_move_count(&self) -> usize {
        self.position.legal_moves().len()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// `file` and `rank` count from zero at a1.
    pub fn piece_at(&self, file: u32, rank: u32) -> Option<Piece> {
        if file > 7 || rank > 7 {
            return None;
        }
        let square = Square::from_coords(File::new(file), Rank::new(rank));
        self.position.board().piece_at(square)
    }

    /// Destinations of the piece on `from`, empty unless it belongs to the
    /// side to move. Castling is listed as the king's two-square step.
    pub fn moves_from(&self, from: Square) -> Vec<Square> {
        let turn = self.turn();
        let mut targets: Vec<Square> = self
            .position
            .legal_moves()
            .iter()
            .filter(|mv| mv.from() == Some(from))
            .map(|mv| destination(mv, turn))
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Plays the legal move from `from` to `to`, promoting to a queen.
    pub fn play_squares(&mut self, from: Square, to: Square) -> bool {
        let turn = self.turn();
        let found = self.position.legal_moves().iter().copied().find(|mv| {
            mv.from() == Some(from)
                && destination(mv, turn) == to
                && matches!(mv.promotion(), None | Some(Role::Queen))
        });
        found.is_some_and(|mv| self.play(mv))
    }

    /// Plays a SAN move. Text that is not SAN is an error; well-formed SAN
    /// that is illegal here returns `Ok(false)` and changes nothing. A pawn
    /// reaching the last rank without a piece letter becomes a queen.
    pub fn play_san(&mut self, text: &str) -> Result<bool> {
        let san: San = text
            .trim()
            .parse()
            .map_err(|e| Error::Chess(format!("cannot parse SAN '{}': {}", text, e)))?;

        let mv = san
            .to_move(&self.position)
            .ok()
            .or_else(|| queen_promotion(san)?.to_move(&self.position).ok());

        Ok(mv.is_some_and(|mv| self.play(mv)))
    }

    /// Plays `mv` if it is legal, logging it as SAN with its check suffix.
    pub fn play(&mut self, mv: Move) -> bool {
        let Ok(next) = self.position.clone().play(mv) else {
            return false;
        };

        let san = SanPlus::from_move(self.position.clone(), mv);
        let fen_before = self.fen();
        self.snapshots.push(fen_before);
        self.moves.push(san.to_string());
        self.position = next;
        true
    }

    /// Steps back one move. A snapshot that cannot be read is left in place
    /// together with its move, so the logs never drift from the position.
    pub fn undo(&mut self) -> Option<String> {
        let snapshot = self.snapshots.last()?;
        match parse_fen(snapshot) {
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

    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    pub fn outcome_text(&self) -> Option<&'static str> {
        if self.position.is_checkmate() {
            Some(match self.turn() {
                Color::White => "Black wins by checkmate",
                Color::Black => "White wins by checkmate",
            })
        } else if self.position.is_stalemate() {
            Some("Draw by stalemate")
        } else if self.position.is_insufficient_material() {
            Some("Draw by insufficient material")
        } else if self.is_game_over() {
            Some("Draw")
        } else {
            None
        }
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the moving piece lands; castling is encoded king-takes-rook.
fn destination(mv: &Move, turn: Color) -> Square {
    match mv.castling_side() {
        Some(side) => side.king_to(turn),
        None => mv.to(),
    }
}

fn queen_promotion(san: San) -> Option<San> {
    match san {
        San::Normal { role: Role::Pawn, file, rank, capture, to, promotion: None }
            if matches!(to.rank(), Rank::First | Rank::Eighth) =>
        {
            Some(San::Normal { role: Role::Pawn, file, rank, capture, to, promotion: Some(Role::Queen) })
        }
        _ => None,
    }
}

fn parse_fen(fen: &str) -> Result<Chess> {
    let parsed: Fen = fen
        .parse()
        .map_err(|e| Error::Chess(format!("invalid FEN '{}': {}", fen, e)))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| Error::Chess(format!("invalid position: {}", e)))
}

/// The FEN side letter for a shakmaty color.
pub fn side_char(color: Color) -> char {
    match color {
        Color::White => 'w',
        Color::Black => 'b',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Role;

    #[test]
    fn test_new_game() {
        let game = ChessGame::new();
        assert_eq!(game.fen(), START_FEN);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.legal_move_count(), 20);
        assert!(!game.is_game_over());
        assert_eq!(game.outcome_text(), None);
    }

    #[test]
    fn test_play_and_undo() {
        let mut game = ChessGame::new();
        assert!(game.play_san("e4").unwrap());
        assert!(game.play_san("e5").unwrap());
        assert!(game.play_san("Nf3").unwrap());
        assert_eq!(game.move_history(), &["e4", "e5", "Nf3"]);
        assert_eq!(game.turn(), Color::Black);

        assert_eq!(game.undo().as_deref(), Some("Nf3"));
        assert_eq!(game.undo().as_deref(), Some("e5"));
        assert_eq!(game.undo().as_deref(), Some("e4"));
        assert_eq!(game.undo(), None);
        assert_eq!(game.fen(), START_FEN);
    }

    #[test]
    fn test_illegal_san_is_rejected_quietly() {
        let mut game = ChessGame::new();
        assert!(!game.play_san("e5").unwrap());
        assert!(!game.play_san("Nf6").unwrap());
        assert_eq!(game.fen(), START_FEN);
        assert!(game.move_history().is_empty());
    }

    #[test]
    fn test_garbage_is_an_error() {
        let mut game = ChessGame::new();
        assert!(game.play_san("hello").is_err());
        assert!(game.play_san("").is_err());
    }

    #[test]
    fn test_fools_mate() {
        let mut game = ChessGame::new();
        for san in ["f3", "e5", "g4", "Qh4#"] {
            assert!(game.play_san(san).unwrap(), "{san}");
        }
        assert!(game.is_game_over());
        assert_eq!(game.outcome_text(), Some("Black wins by checkmate"));
    }

    #[test]
    fn test_piece_at() {
        let game = ChessGame::new();
        let king = game.piece_at(4, 0).unwrap();
        assert_eq!(king.role, Role::King);
        assert_eq!(king.color, Color::White);
        assert_eq!(game.piece_at(4, 4), None);
        assert_eq!(game.piece_at(8, 0), None);
    }

    #[test]
    fn test_from_fen() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
        let game = ChessGame::from_fen(fen).unwrap();
        assert_eq!(game.fen(), fen);
        assert!(ChessGame::from_fen("not a fen").is_err());
    }

    #[test]
    fn test_history_is_standard_san() {
        let mut game = ChessGame::new();
        for text in ["e2e4", "e7e5", "Ng1f3"] {
            assert!(game.play_san(text).unwrap(), "{text}");
        }
        assert_eq!(game.move_history(), &["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_history_keeps_mate_suffix() {
        let mut game = ChessGame::new();
        for san in ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7"] {
            assert!(game.play_san(san).unwrap(), "{san}");
        }
        assert_eq!(game.move_history().last().map(String::as_str), Some("Qxf7#"));
        assert_eq!(game.outcome_text(), Some("White wins by checkmate"));
    }

    #[test]
    fn test_bare_pawn_push_promotes_to_queen() {
        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        let mut game = ChessGame::from_fen(fen).unwrap();
        assert!(game.play_san("e8").unwrap());
        assert_eq!(game.move_history(), &["e8=Q"]);
        assert_eq!(game.piece_at(4, 7).map(|p| p.role), Some(Role::Queen));

        let mut game = ChessGame::from_fen(fen).unwrap();
        assert!(game.play_san("e8=N").unwrap());
        assert_eq!(game.move_history(), &["e8=N"]);
    }

    #[test]
    fn test_moves_from_and_play_squares() {
        let mut game = ChessGame::new();
        assert_eq!(game.moves_from(Square::G1), vec![Square::F3, Square::H3]);
        assert!(game.moves_from(Square::E7).is_empty());
        assert!(game.moves_from(Square::E4).is_empty());

        assert!(!game.play_squares(Square::E2, Square::E5));
        assert!(game.play_squares(Square::E2, Square::E4));
        assert_eq!(game.move_history(), &["e4"]);

        let fen = "8/4P3/8/8/8/8/k7/4K3 w - - 0 1";
        let mut game = ChessGame::from_fen(fen).unwrap();
        assert_eq!(game.moves_from(Square::E7), vec![Square::E8]);
        assert!(game.play_squares(Square::E7, Square::E8));
        assert_eq!(game.move_history(), &["e8=Q"]);
    }

    #[test]
    fn test_castle_by_king_step() {
        let mut game = ChessGame::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let targets = game.moves_from(Square::E1);
        assert!(targets.contains(&Square::G1));
        assert!(targets.contains(&Square::C1));

        assert!(game.play_squares(Square::E1, Square::G1));
        assert_eq!(game.move_history(), &["O-O"]);
        assert_eq!(game.piece_at(5, 0).map(|p| p.role), Some(Role::Rook));
    }

    #[test]
    fn test_unreadable_snapshot_keeps_logs_in_step() {
        let mut game = ChessGame::new();
        assert!(game.play_san("e4").unwrap());
        let fen = game.fen();
        game.snapshots[0] = "not a fen".to_string();

        assert_eq!(game.undo(), None);
        assert_eq!(game.move_history(), &["e4"]);
        assert_eq!(game.snapshots.len(), 1);
        assert_eq!(game.fen(), fen);
    }
}
