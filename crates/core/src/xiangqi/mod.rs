//! Xiangqi rules: board, position strings, move generation and game history

mod board;
mod game;
mod movegen;
mod piece;
mod square;

pub use board::{Board, FenError, Position, START_FEN};
pub use game::Xiangqi;
pub use piece::{Color, Piece, PieceKind};
pub use square::{Move, MoveParseError, Square};
