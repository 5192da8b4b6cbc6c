use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use board_oracle_core::session::{SelectOutcome, Selection};
use board_oracle_core::xiangqi::{Board, Color, Square};
use board_oracle_core::{SessionStatus, XiangqiSession};

use super::{play_oracle_turn, render, CellView};
use crate::AppState;

#[derive(Template)]
#[template(path = "xiangqi.html")]
pub struct XiangqiTemplate {
    pub title: String,
    pub started: bool,
    pub status: String,
    pub fen: String,
    pub rows: Vec<Vec<CellView>>,
    pub history: Vec<String>,
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
pub struct SquareQuery {
    pub square: String,
}

#[derive(Serialize)]
pub struct XiangqiSnapshot {
    pub fen: String,
    pub side_to_move: String,
    pub human: String,
    pub status: &'static str,
    pub history: Vec<String>,
    pub legal_moves: Vec<String>,
}

fn status_text(session: &XiangqiSession) -> String {
    match session.status() {
        SessionStatus::GameOver => match session.game().winner() {
            Some(color) => format!("Game over: {} wins", color.name()),
            None => "Game over".to_string(),
        },
        SessionStatus::HumanToMove => format!("Your turn ({})", session.human().name()),
        SessionStatus::OracleToMove => "Waiting for the AI".to_string(),
    }
}

fn status_code(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::HumanToMove => "human_to_move",
        SessionStatus::OracleToMove => "oracle_to_move",
        SessionStatus::GameOver => "game_over",
    }
}

fn board_rows(session: &XiangqiSession) -> Vec<Vec<CellView>> {
    let game = session.game();
    let (selected, targets) = match session.selection() {
        Selection::PieceSelected { from, targets } => (Some(*from), targets.as_slice()),
        Selection::AwaitingSelection => (None, &[][..]),
    };
    let last = session.last_move();

    let mut rows: Vec<Vec<CellView>> = (0..Board::HEIGHT)
        .map(|row| {
            (0..Board::WIDTH)
                .filter_map(|col| Square::new(row, col))
                .map(|square| {
                    let piece = game.position().board()[square];
                    let mut class = match piece.map(|p| p.color) {
                        Some(Color::Red) => vec!["red"],
                        Some(Color::Black) => vec!["black"],
                        None => vec![],
                    };
                    if selected == Some(square) {
                        class.push("selected");
                    }
                    if targets.contains(&square) {
                        class.push("target");
                    }
                    if last.is_some_and(|mv| mv.from == square || mv.to == square) {
                        class.push("last");
                    }

                    CellView {
                        square: square.to_string(),
                        label: piece.map(|p| p.chinese_char().to_string()).unwrap_or_default(),
                        class: class.join(" "),
                    }
                })
                .collect()
        })
        .collect();

    // Black sits at the bottom when the human plays it.
    if session.human() == Color::Black {
        rows.reverse();
        rows.iter_mut().for_each(|row| row.reverse());
    }
    rows
}

pub async fn xiangqi_page(State(state): State<Arc<AppState>>) -> Response {
    let notice = state.take_notice();
    let guard = state.xiangqi.lock().unwrap();

    let template = match guard.as_ref() {
        Some(session) => XiangqiTemplate {
            title: "Xiangqi".to_string(),
            started: true,
            status: status_text(session),
            fen: session.game().fen(),
            rows: board_rows(session),
            history: session.game().move_history().iter().map(|mv| mv.to_string()).collect(),
            notice,
        },
        None => XiangqiTemplate {
            title: "Xiangqi".to_string(),
            started: false,
            status: String::new(),
            fen: String::new(),
            rows: Vec::new(),
            history: Vec::new(),
            notice,
        },
    };
    render(template)
}

pub async fn new_game(State(state): State<Arc<AppState>>, Form(form): Form<NewGameForm>) -> Redirect {
    let human = match form.color.as_str() {
        "b" => Color::Black,
        _ => Color::Red,
    };
    *state.xiangqi.lock().unwrap() = Some(XiangqiSession::new(human));
    tracing::info!("new xiangqi game, human plays {}", human.name());

    play_oracle_turn(&state, &state.xiangqi).await;
    Redirect::to("/xiangqi")
}

pub async fn select_square(State(state): State<Arc<AppState>>, Form(form): Form<SquareForm>) -> Redirect {
    let Ok(square) = form.square.parse::<Square>() else {
        state.set_notice(format!("Unknown square '{}'", form.square));
        return Redirect::to("/xiangqi");
    };

    let outcome = {
        let mut guard = state.xiangqi.lock().unwrap();
        guard.as_mut().map(|session| session.select(square))
    };

    if let Some(SelectOutcome::Moved(mv)) = outcome {
        tracing::debug!("human played {}", mv);
        play_oracle_turn(&state, &state.xiangqi).await;
    }
    Redirect::to("/xiangqi")
}

pub async fn undo(State(state): State<Arc<AppState>>) -> Redirect {
    if let Some(session) = state.xiangqi.lock().unwrap().as_mut() {
        session.undo_round();
    }
    Redirect::to("/xiangqi")
}

/// Asks the AI again, e.g. after it failed or suggested an illegal move.
pub async fn oracle_move(State(state): State<Arc<AppState>>) -> Redirect {
    play_oracle_turn(&state, &state.xiangqi).await;
    Redirect::to("/xiangqi")
}

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Response {
    let guard = state.xiangqi.lock().unwrap();
    let Some(session) = guard.as_ref() else {
        return (StatusCode::NOT_FOUND, "no xiangqi game in progress").into_response();
    };

    let game = session.game();
    Json(XiangqiSnapshot {
        fen: game.fen(),
        side_to_move: game.turn().name().to_string(),
        human: session.human().name().to_string(),
        status: status_code(session.status()),
        history: game.move_history().iter().map(|mv| mv.to_string()).collect(),
        legal_moves: game.legal_moves().iter().map(|mv| mv.to_string()).collect(),
    })
    .into_response()
}

/// Destinations for the piece on `?square=`, empty for a non-movable square.
pub async fn moves_from(State(state): State<Arc<AppState>>, Query(query): Query<SquareQuery>) -> Response {
    let square = match query.square.parse::<Square>() {
        Ok(square) => square,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let guard = state.xiangqi.lock().unwrap();
    let Some(session) = guard.as_ref() else {
        return (StatusCode::NOT_FOUND, "no xiangqi game in progress").into_response();
    };

    let targets: Vec<String> = session.game().moves_from(square).iter().map(Square::to_string).collect();
    Json(targets).into_response()
}
