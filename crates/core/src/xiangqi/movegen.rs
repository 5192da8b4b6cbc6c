//! Destination generation for every piece kind.
//!
//! Candidates are pseudo-legal; the only self-check filter is the
//! flying-general rule. Leaving one's general attacked is not filtered.

use super::board::{Board, Position};
use super::piece::{Color, Piece, PieceKind};
use super::square::{Move, Square};

const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Horse jumps as (row delta, col delta, leg row delta, leg col delta).
/// The leg is the orthogonal neighbour in the direction of the long side.
const HORSE_JUMPS: [(i8, i8, i8, i8); 8] = [
    (-2, -1, -1, 0),
    (-2, 1, -1, 0),
    (2, -1, 1, 0),
    (2, 1, 1, 0),
    (-1, -2, 0, -1),
    (1, -2, 0, -1),
    (-1, 2, 0, 1),
    (1, 2, 0, 1),
];

fn in_rows(square: Square, (low, high): (i8, i8)) -> bool {
    (low..=high).contains(&square.row())
}

fn in_palace(square: Square, color: Color) -> bool {
    in_rows(square, color.palace_rows()) && (3..=5).contains(&square.col())
}

fn has_crossed_river(square: Square, color: Color) -> bool {
    !in_rows(square, color.home_rows())
}

struct Candidates<'a> {
    board: &'a Board,
    from: Square,
    piece: Piece,
    found: Vec<Square>,
}

impl Candidates<'_> {
    /// Accepts `to` unless it holds a friendly piece or would leave the
    /// generals facing each other.
    fn push(&mut self, to: Square) {
        if self.board[to].is_some_and(|target| target.color == self.piece.color) {
            return;
        }

        let mut scratch = *self.board;
        scratch.relocate(self.from, to);
        if !scratch.generals_facing() {
            self.found.push(to);
        }
    }

    fn steps(&mut self, deltas: &[(i8, i8)], allowed: impl Fn(Square) -> bool) {
        for &(dr, dc) in deltas {
            if let Some(to) = self.from.offset(dr, dc).filter(|&to| allowed(to)) {
                self.push(to);
            }
        }
    }

    fn general(&mut self) {
        let color = self.piece.color;
        self.steps(&ORTHOGONAL, |to| in_palace(to, color));
    }

    fn advisor(&mut self) {
        let color = self.piece.color;
        self.steps(&DIAGONAL, |to| in_palace(to, color));
    }

    fn elephant(&mut self) {
        let home = self.piece.color.home_rows();
        for (dr, dc) in DIAGONAL {
            let Some(to) = self.from.offset(2 * dr, 2 * dc) else {
                continue;
            };
            let eye = self.board.get(self.from.row() + dr, self.from.col() + dc);
            if in_rows(to, home) && eye.is_none() {
                self.push(to);
            }
        }
    }

    fn horse(&mut self) {
        for (dr, dc, leg_r, leg_c) in HORSE_JUMPS {
            let Some(to) = self.from.offset(dr, dc) else {
                continue;
            };
            if self.board.get(self.from.row() + leg_r, self.from.col() + leg_c).is_none() {
                self.push(to);
            }
        }
    }

    fn chariot(&mut self) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = self.from.offset(dr, dc);
            while let Some(to) = current {
                self.push(to);
                if self.board[to].is_some() {
                    break;
                }
                current = to.offset(dr, dc);
            }
        }
    }

    fn cannon(&mut self) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = self.from.offset(dr, dc);
            let mut screened = false;
            while let Some(to) = current {
                match (screened, self.board[to]) {
                    (false, None) => self.push(to),
                    (false, Some(_)) => screened = true,
                    (true, None) => {}
                    (true, Some(target)) => {
                        if target.color != self.piece.color {
                            self.push(to);
                        }
                        break;
                    }
                }
                current = to.offset(dr, dc);
            }
        }
    }

    fn soldier(&mut self) {
        let color = self.piece.color;
        if let Some(to) = self.from.offset(color.forward(), 0) {
            self.push(to);
        }
        if has_crossed_river(self.from, color) {
            self.steps(&[(0, -1), (0, 1)], |_| true);
        }
    }
}

impl Position {
    /// Destinations for the piece on `from`. Empty when the square is empty
    /// or holds a piece of the side not to move.
    pub fn moves_from(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self.board[from].filter(|piece| piece.color == self.side_to_move) else {
            return Vec::new();
        };

        let mut candidates = Candidates {
            board: &self.board,
            from,
            piece,
            found: Vec::new(),
        };

        match piece.kind {
            PieceKind::General => candidates.general(),
            PieceKind::Advisor => candidates.advisor(),
            PieceKind::Elephant => candidates.elephant(),
            PieceKind::Horse => candidates.horse(),
            PieceKind::Chariot => candidates.chariot(),
            PieceKind::Cannon => candidates.cannon(),
            PieceKind::Soldier => candidates.soldier(),
        }

        candidates.found
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board
            .pieces()
            .filter(|(_, piece)| piece.color == self.side_to_move)
            .flat_map(|(from, _)| self.moves_from(from).into_iter().map(move |to| Move::new(from, to)))
            .collect()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.moves_from(mv.from).contains(&mv.to)
    }
}
