//! Board Oracle Core Library
//!
//! Rules for Xiangqi, a thin wrapper over shakmaty for chess, and a client
//! that asks a chat-completions model for its next move.

pub mod chess;
pub mod error;
pub mod oracle;
pub mod session;
pub mod storage;
pub mod xiangqi;

pub use error::{Error, Result};
pub use oracle::{ApiSettings, GameKind, OracleClient, OracleRequest};
pub use session::{ChessSession, OracleOutcome, SessionStatus, XiangqiSession};
pub use storage::Database;
