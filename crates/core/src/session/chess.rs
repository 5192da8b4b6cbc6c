use shakmaty::{Color, Square};

use crate::chess::{side_char, ChessGame};
use crate::error::{Error, Result};
use crate::oracle::{extract_move_token, GameKind, OracleRequest};

use super::{OracleOutcome, SelectOutcome, Selection, SessionStatus};

pub struct ChessSession {
    game: ChessGame,
    human: Color,
    selection: Selection<Square>,
    last_move: Option<String>,
}

impl ChessSession {
    pub fn new(human: Color) -> Self {
        Self::with_game(ChessGame::new(), human)
    }

    pub fn with_game(game: ChessGame, human: Color) -> Self {
        Self {
            game,
            human,
            selection: Selection::AwaitingSelection,
            last_move: None,
        }
    }

    pub fn game(&self) -> &ChessGame {
        &self.game
    }

    pub fn human(&self) -> Color {
        self.human
    }

    pub fn selection(&self) -> &Selection<Square> {
        &self.selection
    }

    pub fn last_move(&self) -> Option<&str> {
        self.last_move.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        if self.game.is_game_over() {
            SessionStatus::GameOver
        } else if self.game.turn() == self.human {
            SessionStatus::HumanToMove
        } else {
            SessionStatus::OracleToMove
        }
    }

    /// Handles a click on `square`, like the Xiangqi board. Pawns reaching
    /// the last rank become queens.
    pub fn select(&mut self, square: Square) -> SelectOutcome<String> {
        if self.status() != SessionStatus::HumanToMove {
            return SelectOutcome::Ignored;
        }

        let own_piece = self
            .game
            .piece_at(square.file().to_u32(), square.rank().to_u32())
            .is_some_and(|piece| piece.color == self.human);
        if own_piece {
            let targets = self.game.moves_from(square);
            if !targets.is_empty() {
                self.selection = Selection::PieceSelected { from: square, targets };
                return SelectOutcome::Selected;
            }
        }

        match std::mem::replace(&mut self.selection, Selection::AwaitingSelection) {
            Selection::PieceSelected { from, targets } if targets.contains(&square) => {
                if self.game.play_squares(from, square) {
                    self.last_move = self.game.move_history().last().cloned();
                    self.last_move.clone().map_or(SelectOutcome::Cleared, SelectOutcome::Moved)
                } else {
                    SelectOutcome::Cleared
                }
            }
            Selection::PieceSelected { .. } => SelectOutcome::Cleared,
            Selection::AwaitingSelection => SelectOutcome::Ignored,
        }
    }

    /// Plays the human's SAN move. `Ok(false)` when it is not their turn or
    /// the move is illegal.
    pub fn play(&mut self, san: &str) -> Result<bool> {
        if self.status() != SessionStatus::HumanToMove {
            return Ok(false);
        }
        let played = self.game.play_san(san)?;
        if played {
            self.selection = Selection::AwaitingSelection;
            self.last_move = self.game.move_history().last().cloned();
        }
        Ok(played)
    }

    pub fn undo_round(&mut self) {
        self.game.undo();
        if self.game.turn() != self.human {
            self.game.undo();
        }
        self.selection = Selection::AwaitingSelection;
        self.last_move = None;
    }

    pub fn oracle_request(&self) -> Option<OracleRequest> {
        if self.status() != SessionStatus::OracleToMove {
            return None;
        }

        Some(OracleRequest {
            kind: GameKind::Chess,
            fen: self.game.fen(),
            history: self.game.move_history().to_vec(),
            side: side_char(self.game.turn()),
        })
    }

    pub fn apply_oracle_reply(&mut self, request: &OracleRequest, reply: &str) -> Result<OracleOutcome> {
        if request.fen != self.game.fen() {
            tracing::info!("dropping oracle reply issued for an older position");
            return Ok(OracleOutcome::Stale);
        }

        let token = extract_move_token(reply)
            .ok_or_else(|| Error::Oracle(format!("no move in reply '{}'", reply)))?;

        if self.game.play_san(&token)? {
            self.last_move = self.game.move_history().last().cloned();
            self.selection = Selection::AwaitingSelection;
            Ok(OracleOutcome::Applied(token))
        } else {
            tracing::warn!(token = %token, fen = %request.fen, "oracle suggested an illegal move");
            Ok(OracleOutcome::Rejected(token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_white_flow() {
        let mut session = ChessSession::new(Color::White);
        assert_eq!(session.status(), SessionStatus::HumanToMove);
        assert!(session.oracle_request().is_none());

        assert!(session.play("e4").unwrap());
        assert_eq!(session.last_move(), Some("e4"));
        assert!(!session.play("d4").unwrap());

        let request = session.oracle_request().unwrap();
        assert_eq!(request.side, 'b');
        assert_eq!(request.history, vec!["e4".to_string()]);

        let outcome = session.apply_oracle_reply(&request, "e5.").unwrap();
        assert_eq!(outcome, OracleOutcome::Applied("e5".to_string()));
        assert_eq!(session.status(), SessionStatus::HumanToMove);
    }

    #[test]
    fn test_oracle_illegal_and_malformed() {
        let mut session = ChessSession::new(Color::Black);
        let request = session.oracle_request().unwrap();

        let outcome = session.apply_oracle_reply(&request, "Ke2").unwrap();
        assert_eq!(outcome, OracleOutcome::Rejected("Ke2".to_string()));
        assert!(session.apply_oracle_reply(&request, "I think").is_err());
        assert!(session.game().move_history().is_empty());
    }

    #[test]
    fn test_stale_and_undo() {
        let mut session = ChessSession::new(Color::White);
        session.play("d4").unwrap();
        let request = session.oracle_request().unwrap();
        session.apply_oracle_reply(&request, "d5").unwrap();

        assert_eq!(session.apply_oracle_reply(&request, "Nf6").unwrap(), OracleOutcome::Stale);

        session.undo_round();
        assert!(session.game().move_history().is_empty());
        assert_eq!(session.status(), SessionStatus::HumanToMove);
    }

    #[test]
    fn test_click_to_move() {
        let mut session = ChessSession::new(Color::White);
        assert_eq!(session.select(Square::E7), SelectOutcome::Ignored);
        assert_eq!(session.select(Square::G1), SelectOutcome::Selected);
        assert_eq!(
            session.selection(),
            &Selection::PieceSelected { from: Square::G1, targets: vec![Square::F3, Square::H3] }
        );

        assert_eq!(session.select(Square::G3), SelectOutcome::Cleared);
        assert_eq!(session.selection(), &Selection::AwaitingSelection);

        session.select(Square::G1);
        assert_eq!(session.select(Square::F3), SelectOutcome::Moved("Nf3".to_string()));
        assert_eq!(session.status(), SessionStatus::OracleToMove);
        assert_eq!(session.select(Square::E2), SelectOutcome::Ignored);
    }

    #[test]
    fn test_oracle_history_is_san() {
        let mut session = ChessSession::new(Color::White);
        assert!(session.play("e2e4").unwrap());

        let request = session.oracle_request().unwrap();
        assert_eq!(request.history, vec!["e4".to_string()]);
        session.apply_oracle_reply(&request, "e7e5").unwrap();
        assert_eq!(session.last_move(), Some("e5"));
    }
}
