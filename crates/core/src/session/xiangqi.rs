use crate::error::{Error, Result};
use crate::oracle::{extract_move_token, GameKind, OracleRequest};
use crate::xiangqi::{Color, Move, Square, Xiangqi};

use super::{OracleOutcome, SelectOutcome, Selection, SessionStatus};

pub struct XiangqiSession {
    game: Xiangqi,
    human: Color,
    selection: Selection<Square>,
    last_move: Option<Move>,
}

impl XiangqiSession {
    pub fn new(human: Color) -> Self {
        Self::with_game(Xiangqi::new(), human)
    }

    pub fn with_game(game: Xiangqi, human: Color) -> Self {
        Self {
            game,
            human,
            selection: Selection::AwaitingSelection,
            last_move: None,
        }
    }

    pub fn game(&self) -> &Xiangqi {
        &self.game
    }

    pub fn human(&self) -> Color {
        self.human
    }

    pub fn selection(&self) -> &Selection<Square> {
        &self.selection
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
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

    /// Handles a click on `square`.
    ///
    /// A square holding one of the human's pieces with at least one move
    /// selects it. With a piece selected, a listed target plays the move and
    /// anything else clears the selection.
    pub fn select(&mut self, square: Square) -> SelectOutcome<Move> {
        if self.status() != SessionStatus::HumanToMove {
            return SelectOutcome::Ignored;
        }

        let own_piece = self.game.position().board()[square].is_some_and(|piece| piece.color == self.human);
        if own_piece {
            let targets = self.game.moves_from(square);
            if !targets.is_empty() {
                self.selection = Selection::PieceSelected { from: square, targets };
                return SelectOutcome::Selected;
            }
        }

        match std::mem::replace(&mut self.selection, Selection::AwaitingSelection) {
            Selection::PieceSelected { from, targets } if targets.contains(&square) => {
                let mv = Move::new(from, square);
                if self.game.apply(mv) {
                    self.last_move = Some(mv);
                    SelectOutcome::Moved(mv)
                } else {
                    SelectOutcome::Cleared
                }
            }
            Selection::PieceSelected { .. } => SelectOutcome::Cleared,
            Selection::AwaitingSelection => SelectOutcome::Ignored,
        }
    }

    /// Takes back the oracle's reply and the human's move before it.
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
            kind: GameKind::Xiangqi,
            fen: self.game.fen(),
            history: self.game.move_history().iter().map(Move::to_string).collect(),
            side: self.game.turn().fen_char(),
        })
    }

    /// Plays the move named in `reply` if it still applies to this position.
    pub fn apply_oracle_reply(&mut self, request: &OracleRequest, reply: &str) -> Result<OracleOutcome> {
        if request.fen != self.game.fen() {
            tracing::info!("dropping oracle reply issued for an older position");
            return Ok(OracleOutcome::Stale);
        }

        let token = extract_move_token(reply)
            .ok_or_else(|| Error::Oracle(format!("no move in reply '{}'", reply)))?;
        let mv: Move = token.parse()?;

        if self.game.apply(mv) {
            self.last_move = Some(mv);
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

    fn sq(notation: &str) -> Square {
        notation.parse().unwrap()
    }

    #[test]
    fn test_status_by_side() {
        assert_eq!(XiangqiSession::new(Color::Red).status(), SessionStatus::HumanToMove);
        assert_eq!(XiangqiSession::new(Color::Black).status(), SessionStatus::OracleToMove);

        let over = Xiangqi::from_fen("9/9/9/9/9/9/9/9/9/4K4 w - - 0 1").unwrap();
        assert_eq!(XiangqiSession::with_game(over, Color::Red).status(), SessionStatus::GameOver);
    }

    #[test]
    fn test_select_then_move() {
        let mut session = XiangqiSession::new(Color::Red);
        assert_eq!(session.select(sq("h2")), SelectOutcome::Selected);
        match session.selection() {
            Selection::PieceSelected { from, targets } => {
                assert_eq!(*from, sq("h2"));
                assert!(targets.contains(&sq("e2")));
            }
            other => panic!("unexpected selection {:?}", other),
        }

        assert_eq!(session.select(sq("e2")), SelectOutcome::Moved("h2e2".parse().unwrap()));
        assert_eq!(session.selection(), &Selection::AwaitingSelection);
        assert_eq!(session.status(), SessionStatus::OracleToMove);
        assert_eq!(session.last_move().map(|m| m.to_string()).as_deref(), Some("h2e2"));
    }

    #[test]
    fn test_invalid_target_clears_selection() {
        let mut session = XiangqiSession::new(Color::Red);
        session.select(sq("h2"));
        assert_eq!(session.select(sq("h8")), SelectOutcome::Cleared);
        assert_eq!(session.selection(), &Selection::AwaitingSelection);
        assert!(session.game().move_history().is_empty());
    }

    #[test]
    fn test_reselect_other_piece() {
        let mut session = XiangqiSession::new(Color::Red);
        session.select(sq("h2"));
        assert_eq!(session.select(sq("b2")), SelectOutcome::Selected);
        assert!(matches!(session.selection(), Selection::PieceSelected { from, .. } if *from == sq("b2")));
    }

    #[test]
    fn test_empty_enemy_or_stuck_square_not_selectable() {
        let mut session = XiangqiSession::new(Color::Red);
        assert_eq!(session.select(sq("e5")), SelectOutcome::Ignored);
        assert_eq!(session.select(sq("h7")), SelectOutcome::Ignored);

        // advisor boxed in by its own soldier
        let game = Xiangqi::from_fen("4k4/9/9/9/9/9/9/9/4P4/3AK4 w - - 0 1").unwrap();
        let mut session = XiangqiSession::with_game(game, Color::Red);
        assert_eq!(session.select(sq("d0")), SelectOutcome::Ignored);
        assert_eq!(session.selection(), &Selection::AwaitingSelection);
    }

    #[test]
    fn test_clicks_ignored_on_oracle_turn() {
        let mut session = XiangqiSession::new(Color::Black);
        assert_eq!(session.select(sq("h7")), SelectOutcome::Ignored);
    }

    #[test]
    fn test_oracle_round_trip() {
        let mut session = XiangqiSession::new(Color::Black);
        let request = session.oracle_request().unwrap();
        assert_eq!(request.side, 'w');
        assert!(request.history.is_empty());

        let outcome = session.apply_oracle_reply(&request, "h2e2.").unwrap();
        assert_eq!(outcome, OracleOutcome::Applied("h2e2".to_string()));
        assert_eq!(session.status(), SessionStatus::HumanToMove);
        assert!(session.oracle_request().is_none());
    }

    #[test]
    fn test_illegal_oracle_move_leaves_position() {
        let mut session = XiangqiSession::new(Color::Black);
        let request = session.oracle_request().unwrap();
        let before = session.game().fen();

        let outcome = session.apply_oracle_reply(&request, "h2h8").unwrap();
        assert_eq!(outcome, OracleOutcome::Rejected("h2h8".to_string()));
        assert_eq!(session.game().fen(), before);
    }

    #[test]
    fn test_malformed_oracle_reply_is_an_error() {
        let mut session = XiangqiSession::new(Color::Black);
        let request = session.oracle_request().unwrap();

        assert!(matches!(session.apply_oracle_reply(&request, "炮二平五"), Err(Error::Move(_))));
        assert!(matches!(session.apply_oracle_reply(&request, ""), Err(Error::Oracle(_))));
        assert!(session.game().move_history().is_empty());
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut session = XiangqiSession::new(Color::Red);
        session.select(sq("h2"));
        session.select(sq("e2"));
        let request = session.oracle_request().unwrap();

        session.undo_round();
        assert_eq!(session.status(), SessionStatus::HumanToMove);

        let outcome = session.apply_oracle_reply(&request, "h9g7").unwrap();
        assert_eq!(outcome, OracleOutcome::Stale);
        assert!(session.game().move_history().is_empty());
    }

    #[test]
    fn test_undo_round_returns_to_human_turn() {
        let mut session = XiangqiSession::new(Color::Red);
        session.select(sq("h2"));
        session.select(sq("e2"));
        let request = session.oracle_request().unwrap();
        session.apply_oracle_reply(&request, "h9g7").unwrap();
        assert_eq!(session.game().move_history().len(), 2);

        session.undo_round();
        assert!(session.game().move_history().is_empty());
        assert_eq!(session.status(), SessionStatus::HumanToMove);
        assert_eq!(session.last_move(), None);
    }
}
