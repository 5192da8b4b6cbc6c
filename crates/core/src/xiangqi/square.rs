use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use super::board::Board;

/// A cell on the board. Row 0 is black's back rank, row 9 red's.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Square {
    row: i8,
    col: i8,
}

impl Square {
    pub fn new(row: i8, col: i8) -> Option<Self> {
        if !(0..Board::HEIGHT).contains(&row) || !(0..Board::WIDTH).contains(&col) {
            return None;
        }
        Some(Self { row, col })
    }

    pub fn row(&self) -> i8 {
        self.row
    }

    pub fn col(&self) -> i8 {
        self.col
    }

    pub fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        Self::new(self.row + dr, self.col + dc)
    }

    /// Reads a `<file><rank>` pair such as `h2`.
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        if !('a'..='i').contains(&file) {
            return None;
        }
        let rank = rank.to_digit(10)? as i8;
        Self::new(9 - rank, (file as u8 - b'a') as i8)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..Board::HEIGHT).flat_map(|row| (0..Board::WIDTH).map(move |col| Square { row, col }))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.col as u8) as char, 9 - self.row)
    }
}

impl FromStr for Square {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        match chars[..] {
            [file, rank] => Self::from_chars(file, rank).ok_or_else(|| MoveParseError::Charset(s.to_string())),
            _ => Err(MoveParseError::Length(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

/// Compact `<file><rank><file><rank>` notation, e.g. `h2e2`.
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("'{0}' does not have the expected length")]
    Length(String),
    #[error("'{0}' is not made of files a-i and ranks 0-9")]
    Charset(String),
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let [f1, r1, f2, r2] = chars[..] else {
            return Err(MoveParseError::Length(s.to_string()));
        };

        let charset = || MoveParseError::Charset(s.to_string());
        let from = Square::from_chars(f1, r1).ok_or_else(charset)?;
        let to = Square::from_chars(f2, r2).ok_or_else(charset)?;
        Ok(Self { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: i8, col: i8) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(9, 8).is_some());
        assert!(Square::new(10, 0).is_none());
        assert!(Square::new(0, 9).is_none());
        assert!(Square::new(-1, 4).is_none());
        assert_eq!(sq(0, 8).offset(0, 1), None);
        assert_eq!(sq(4, 4).offset(1, -1), Some(sq(5, 3)));
        assert_eq!(Square::all().count(), 90);
    }

    #[test]
    fn test_encode_file_and_rank() {
        // file a-i is the column, rank is 9 - row
        assert_eq!(Move::new(sq(7, 1), sq(4, 1)).to_string(), "b2b5");
        assert_eq!(Move::new(sq(7, 7), sq(7, 4)).to_string(), "h2e2");
        assert_eq!(sq(9, 0).to_string(), "a0");
        assert_eq!(sq(0, 8).to_string(), "i9");
    }

    #[test]
    fn test_decode_recovers_squares() {
        let mv: Move = "h2e2".parse().unwrap();
        assert_eq!(mv.from, sq(7, 7));
        assert_eq!(mv.to, sq(7, 4));
        assert_eq!(mv.to_string(), "h2e2");
        assert_eq!("a0".parse::<Square>().unwrap(), sq(9, 0));
        assert_eq!("i9".parse::<Square>().unwrap(), sq(0, 8));
    }

    #[test]
    fn test_malformed_notation() {
        assert_eq!("h2e".parse::<Move>(), Err(MoveParseError::Length("h2e".into())));
        assert_eq!("h2e2x".parse::<Move>(), Err(MoveParseError::Length("h2e2x".into())));
        assert_eq!("j2e2".parse::<Move>(), Err(MoveParseError::Charset("j2e2".into())));
        assert_eq!("H2E2".parse::<Move>(), Err(MoveParseError::Charset("H2E2".into())));
        assert_eq!("7174".parse::<Move>(), Err(MoveParseError::Charset("7174".into())));
        assert!("炮二平五".parse::<Move>().is_err());
    }
}
