//! Per-game sessions: which side the human plays, what is selected, and how
//! oracle replies are turned into moves.

mod chess;
mod xiangqi;

use crate::error::Result;
use crate::oracle::OracleRequest;

pub use chess::ChessSession;
pub use xiangqi::XiangqiSession;

/// Click state of a board, generic over the game's square type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<S> {
    AwaitingSelection,
    PieceSelected { from: S, targets: Vec<S> },
}

/// What a click did. `M` is how the game reports a played move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome<M> {
    Selected,
    Moved(M),
    Cleared,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    HumanToMove,
    OracleToMove,
    GameOver,
}

/// What became of an oracle reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleOutcome {
    /// The move was legal and has been played.
    Applied(String),
    /// Well-formed but illegal in the current position.
    Rejected(String),
    /// The position changed after the request was issued; the reply was dropped.
    Stale,
}

/// A session whose opponent is the oracle.
pub trait OracleTurn {
    /// The request to send, or `None` when it is not the oracle's turn.
    fn oracle_request(&self) -> Option<OracleRequest>;

    /// Applies `reply` to the position `request` was issued for.
    fn apply_oracle_reply(&mut self, request: &OracleRequest, reply: &str) -> Result<OracleOutcome>;
}

impl OracleTurn for XiangqiSession {
    fn oracle_request(&self) -> Option<OracleRequest> {
        XiangqiSession::oracle_request(self)
    }

    fn apply_oracle_reply(&mut self, request: &OracleRequest, reply: &str) -> Result<OracleOutcome> {
        XiangqiSession::apply_oracle_reply(self, request, reply)
    }
}

impl OracleTurn for ChessSession {
    fn oracle_request(&self) -> Option<OracleRequest> {
        ChessSession::oracle_request(self)
    }

    fn apply_oracle_reply(&mut self, request: &OracleRequest, reply: &str) -> Result<OracleOutcome> {
        ChessSession::apply_oracle_reply(self, request, reply)
    }
}
