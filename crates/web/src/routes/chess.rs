use askama::Template;
use axum::{
    extract::State,
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;
use shakmaty::{Color, File, Rank, Square};
use std::sync::Arc;

use board_oracle_core::session::{SelectOutcome, Selection};
use board_oracle_core::{ChessSession, SessionStatus};

use super::{play_oracle_turn, render, CellView};
use crate::AppState;

#[derive(Template)]
#[template(path = "chess.html")]
pub struct ChessTemplate {
    pub title: String,
    pub started: bool,
    pub status: String,
    pub fen: String,
    pub rows: Vec<Vec<CellView>>,
    pub history: Vec<String>,
    pub legal_move_count: usize,
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct NewGameForm {
    pub color: String,
}

#[derive(Deserialize)]
pub struct SquareForm {
    pub square: String,
}

#[derive(Deserialize)]
pub struct MoveForm {
    pub san: String,
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn status_text(session: &ChessSession) -> String {
    match session.status() {
        SessionStatus::GameOver => session.game().outcome_text().unwrap_or("Game over").to_string(),
        SessionStatus::HumanToMove if session.game().is_check() => {
            format!("Your turn ({}), in check", color_name(session.human()))
        }
        SessionStatus::HumanToMove => format!("Your turn ({})", color_name(session.human())),
        SessionStatus::OracleToMove => "Waiting for the AI".to_string(),
    }
}

fn board_rows(session: &ChessSession) -> Vec<Vec<CellView>> {
    let game = session.game();
    let white_below = session.human() == Color::White;
    let (selected, targets) = match session.selection() {
        Selection::PieceSelected { from, targets } => (Some(*from), targets.as_slice()),
        Selection::AwaitingSelection => (None, &[][..]),
    };

    let ranks: Vec<u32> = if white_below { (0..8).rev().collect() } else { (0..8).collect() };
    let files: Vec<u32> = if white_below { (0..8).collect() } else { (0..8).rev().collect() };

    ranks
        .iter()
        .map(|&rank| {
            files
                .iter()
                .map(|&file| {
                    let square = Square::from_coords(File::new(file), Rank::new(rank));
                    let piece = game.piece_at(file, rank);
                    let mut class = vec![if (file + rank) % 2 == 0 { "dark" } else { "light" }];
                    match piece.map(|p| p.color) {
                        Some(Color::White) => class.push("white"),
                        Some(Color::Black) => class.push("black"),
                        None => {}
                    }
                    if selected == Some(square) {
                        class.push("selected");
                    }
                    if targets.contains(&square) {
                        class.push("target");
                    }

                    CellView {
                        square: square.to_string(),
                        label: piece.map(|p| p.char().to_string()).unwrap_or_default(),
                        class: class.join(" "),
                    }
                })
                .collect()
        })
        .collect()
}

pub async fn chess_page(State(state): State<Arc<AppState>>) -> Response {
    let notice = state.take_notice();
    let guard = state.chess.lock().unwrap();

    let template = match guard.as_ref() {
        Some(session) => ChessTemplate {
            title: "Chess".to_string(),
            started: true,
            status: status_text(session),
            fen: session.game().fen(),
            rows: board_rows(session),
            history: session.game().move_history().to_vec(),
            legal_move_count: session.game().legal_move_count(),
            notice,
        },
        None => ChessTemplate {
            title: "Chess".to_string(),
            started: false,
            status: String::new(),
            fen: String::new(),
            rows: Vec::new(),
            history: Vec::new(),
            legal_move_count: 0,
            notice,
        },
    };
    render(template)
}

pub async fn new_game(State(state): State<Arc<AppState>>, Form(form): Form<NewGameForm>) -> Redirect {
    let human = match form.color.as_str() {
        "b" => Color::Black,
        _ => Color::White,
    };
    *state.chess.lock().unwrap() = Some(ChessSession::new(human));
    tracing::info!("new chess game, human plays {}", color_name(human));

    play_oracle_turn(&state, &state.chess).await;
    Redirect::to("/chess")
}

pub async fn select_square(State(state): State<Arc<AppState>>, Form(form): Form<SquareForm>) -> Redirect {
    let Ok(square) = form.square.parse::<Square>() else {
        state.set_notice(format!("Unknown square '{}'", form.square));
        return Redirect::to("/chess");
    };

    let outcome = {
        let mut guard = state.chess.lock().unwrap();
        guard.as_mut().map(|session| session.select(square))
    };

    if let Some(SelectOutcome::Moved(san)) = outcome {
        tracing::debug!("human played {}", san);
        play_oracle_turn(&state, &state.chess).await;
    }
    Redirect::to("/chess")
}

pub async fn play_move(State(state): State<Arc<AppState>>, Form(form): Form<MoveForm>) -> Redirect {
    let played = {
        let mut guard = state.chess.lock().unwrap();
        match guard.as_mut() {
            Some(session) => session.play(&form.san),
            None => Ok(false),
        }
    };

    match played {
        Ok(true) => play_oracle_turn(&state, &state.chess).await,
        Ok(false) => state.set_notice(format!("Illegal move: {}", form.san.trim())),
        Err(e) => state.set_notice(e.to_string()),
    }
    Redirect::to("/chess")
}

pub async fn undo(State(state): State<Arc<AppState>>) -> Redirect {
    if let Some(session) = state.chess.lock().unwrap().as_mut() {
        session.undo_round();
    }
    Redirect::to("/chess")
}

pub async fn oracle_move(State(state): State<Arc<AppState>>) -> Redirect {
    play_oracle_turn(&state, &state.chess).await;
    Redirect::to("/chess")
}
