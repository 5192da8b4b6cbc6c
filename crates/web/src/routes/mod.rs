use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::{Arc, Mutex};

use board_oracle_core::session::OracleTurn;
use board_oracle_core::{OracleClient, OracleOutcome, OracleRequest};

use crate::AppState;

pub mod chess;
pub mod settings;
pub mod xiangqi;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub settings_complete: bool,
    pub model: String,
    pub notice: Option<String>,
}

/// One board cell as the templates draw it.
pub struct CellView {
    pub square: String,
    pub label: String,
    pub class: String,
}

pub fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "template rendering failed").into_response()
        }
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let settings = state.settings.lock().unwrap().clone();

    let template = IndexTemplate {
        title: "Board Oracle".to_string(),
        settings_complete: settings.is_complete(),
        model: settings.model,
        notice: state.take_notice(),
    };
    render(template)
}

pub async fn health() -> &'static str {
    "OK"
}

async fn ask_oracle(state: &AppState, request: &OracleRequest) -> board_oracle_core::Result<String> {
    let settings = state.settings.lock().unwrap().clone();
    let client = OracleClient::new(settings)?;
    client.next_move(request).await
}

/// Lets the oracle move in `slot`'s session if it is its turn.
///
/// The lock is released while waiting for the reply, so the session may have
/// moved on by then; stale replies are dropped by the session itself.
pub(crate) async fn play_oracle_turn<S>(state: &AppState, slot: &Mutex<Option<S>>)
where
    S: OracleTurn + Send,
{
    let request = {
        let guard = slot.lock().unwrap();
        guard.as_ref().and_then(|session| session.oracle_request())
    };
    let Some(request) = request else {
        return;
    };

    let reply = match ask_oracle(state, &request).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("oracle request failed: {}", e);
            state.set_notice(format!("AI error: {}", e));
            return;
        }
    };

    let outcome = {
        let mut guard = slot.lock().unwrap();
        match guard.as_mut() {
            Some(session) => session.apply_oracle_reply(&request, &reply),
            None => return,
        }
    };

    match outcome {
        Ok(OracleOutcome::Applied(token)) => tracing::info!(kind = request.kind.as_str(), "oracle played {}", token),
        Ok(OracleOutcome::Rejected(token)) => {
            state.set_notice(format!("AI suggested an illegal move: {}", token));
        }
        Ok(OracleOutcome::Stale) => {}
        Err(e) => state.set_notice(format!("Could not read AI reply '{}': {}", reply, e)),
    }
}
