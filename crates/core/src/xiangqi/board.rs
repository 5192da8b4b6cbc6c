use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use thiserror::Error;

use super::piece::{Color, Piece, PieceKind};
use super::square::Square;

pub const START_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1";

/// Fields written after the side letter; kept only for format compatibility.
const FEN_PLACEHOLDERS: &str = "- - 0 1";

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Board {
    cells: [[Option<Piece>; Board::WIDTH as usize]; Board::HEIGHT as usize],
}

impl Board {
    pub const WIDTH: i8 = 9;
    pub const HEIGHT: i8 = 10;

    pub fn empty() -> Self {
        Self {
            cells: [[None; Self::WIDTH as usize]; Self::HEIGHT as usize],
        }
    }

    /// Out-of-range coordinates read as empty.
    pub fn get(&self, row: i8, col: i8) -> Option<Piece> {
        Square::new(row, col).and_then(|square| self[square])
    }

    /// Moves whatever stands on `from` to `to`, returning the captured piece.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self[from].take();
        std::mem::replace(&mut self[to], piece)
    }

    pub fn find_general(&self, color: Color) -> Option<Square> {
        Square::all().find(|&square| self[square] == Some(Piece::new(PieceKind::General, color)))
    }

    /// True when both generals share a file with nothing between them.
    pub fn generals_facing(&self) -> bool {
        let (Some(red), Some(black)) = (self.find_general(Color::Red), self.find_general(Color::Black)) else {
            return false;
        };
        if red.col() != black.col() {
            return false;
        }

        let (top, bottom) = (red.row().min(black.row()), red.row().max(black.row()));
        (top + 1..bottom).all(|row| self.get(row, red.col()).is_none())
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|square| self[square].map(|piece| (square, piece)))
    }

    fn parse_placement(placement: &str) -> Result<Self, FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != Self::HEIGHT as usize {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col: i8 = 0;
            for current in rank.chars() {
                if let Some(run) = current.to_digit(10) {
                    col += run as i8;
                } else {
                    let piece = Piece::from_fen_char(current).ok_or(FenError::Piece(current))?;
                    let square = Square::new(row as i8, col).ok_or(FenError::RankWidth(row))?;
                    board[square] = Some(piece);
                    col += 1;
                }
                if col > Self::WIDTH {
                    return Err(FenError::RankWidth(row));
                }
            }
            if col != Self::WIDTH {
                return Err(FenError::RankWidth(row));
            }
        }

        Ok(board)
    }

    fn placement(&self) -> String {
        let mut result = String::new();
        for row in 0..Self::HEIGHT {
            let mut empty = 0;
            for col in 0..Self::WIDTH {
                match self.get(row, col) {
                    None => empty += 1,
                    Some(piece) => {
                        if empty > 0 {
                            result.push_str(&empty.to_string());
                            empty = 0;
                        }
                        result.push(piece.fen_char());
                    }
                }
            }
            if empty > 0 {
                result.push_str(&empty.to_string());
            }
            if row < Self::HEIGHT - 1 {
                result.push('/');
            }
        }
        result
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.cells[index.row() as usize][index.col() as usize]
    }
}

impl IndexMut<Square> for Board {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.cells[index.row() as usize][index.col() as usize]
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in 0..Self::HEIGHT {
            write!(f, "{} ", 9 - row)?;
            for col in 0..Self::WIDTH {
                match self.get(row, col) {
                    Some(piece) => write!(f, "{} ", piece.fen_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in 'a'..='i' {
            write!(f, "{file} ")?;
        }
        writeln!(f)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 10 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {0} does not describe exactly 9 cells")]
    RankWidth(usize),
    #[error("unknown piece letter '{0}'")]
    Piece(char),
    #[error("missing side to move")]
    MissingSide,
    #[error("unknown side to move '{0}'")]
    Side(String),
}

/// Board plus side to move.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
}

impl Position {
    pub fn new(board: Board, side_to_move: Color) -> Self {
        Self { board, side_to_move }
    }

    pub fn start() -> Self {
        Self::new(Self::start_board(), Color::Red)
    }

    fn start_board() -> Board {
        let placement = START_FEN.split(' ').next().unwrap_or_default();
        Board::parse_placement(placement).unwrap_or_else(|_| Board::empty())
    }

    /// Parses `<ranks> <side> ...`. Fields after the side letter are ignored.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut fields = fen.split_whitespace();
        let board = Board::parse_placement(fields.next().unwrap_or_default())?;
        let side = fields.next().ok_or(FenError::MissingSide)?;

        let mut side_chars = side.chars();
        let side_to_move = match (side_chars.next(), side_chars.next()) {
            (Some(c), None) => Color::from_fen_char(c),
            _ => None,
        }
        .ok_or_else(|| FenError::Side(side.to_string()))?;

        Ok(Self { board, side_to_move })
    }

    pub fn fen(&self) -> String {
        format!("{} {} {}", self.board.placement(), self.side_to_move.fen_char(), FEN_PLACEHOLDERS)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn get(&self, row: i8, col: i8) -> Option<Piece> {
        self.board.get(row, col)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}
