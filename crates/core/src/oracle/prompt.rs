//! Prompt text for each game kind

use super::types::{GameKind, OracleRequest};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that plays board games.";

pub fn build_prompt(request: &OracleRequest) -> String {
    let history = if request.history.is_empty() {
        "(none)".to_string()
    } else {
        request.history.join(" ")
    };

    let rules = match request.kind {
        GameKind::Chess => CHESS_RULES,
        GameKind::Xiangqi => XIANGQI_RULES,
    };

    let answer = match request.kind {
        GameKind::Chess => "Reply with the best legal next move as a bare SAN string and nothing else.",
        GameKind::Xiangqi => {
            "Reply with the best legal next move as a bare four-character coordinate move (for example h2e2) and nothing else."
        }
    };

    format!(
        "{rules}\n\nCurrent position:\nFEN: {fen}\nMoves so far: {history}\nSide to move: {side}\n\n{answer}",
        fen = request.fen,
        side = request.side_name(),
    )
}

const CHESS_RULES: &str = "\
Role: you are a chess master following FIDE rules who writes moves in Standard Algebraic Notation (SAN).
SAN reminders:
1. K king, Q queen, R rook, B bishop, N knight; pawns have no letter.
2. A move is the piece letter plus the destination square (Nf3); pawn moves are just the square (e4).
3. Captures use x (Bxe5, exd5).
4. Disambiguate with the origin file or rank when two pieces can reach the square (Rae1).
5. O-O castles kingside, O-O-O queenside, promotions use = (e8=Q).
6. + marks check and # mates.";

const XIANGQI_RULES: &str = "\
Role: you are a Xiangqi (Chinese chess) master.
Coordinates: files a-i run left to right from Red's point of view, ranks 0-9 run from Red's back rank (0) to Black's back rank (9).
A move is the origin square followed by the destination square with no separator, e.g. h2e2. Captures are not marked.
Piece reminders:
- Chariot: any distance orthogonally while the path is clear.
- Horse: one step orthogonally then one diagonally outward; blocked if the first step's square is occupied.
- Cannon: moves like a chariot, but captures only by jumping exactly one piece of either side.
- Soldier: one step forward; after crossing the river it may also step sideways, never backward.
- Elephant: exactly two squares diagonally, never across the river, blocked if the middle square is occupied.
- Advisor: one diagonal step inside the palace.
- General: one orthogonal step inside the palace; the two generals may never face each other on an open file.";
