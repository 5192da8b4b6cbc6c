use askama::Template;
use axum::{
    extract::State,
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

use board_oracle_core::ApiSettings;

use super::render;
use crate::AppState;

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub title: String,
    pub base_url: String,
    pub model: String,
    pub has_key: bool,
    pub updated: String,
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct SettingsForm {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

pub async fn settings_page(State(state): State<Arc<AppState>>) -> Response {
    let settings = state.settings.lock().unwrap().clone();

    let updated = {
        let db = state.db.lock().unwrap();
        db.stored_settings().ok().flatten()
    }
    .and_then(|stored| chrono::DateTime::from_timestamp(stored.updated_at as i64, 0))
    .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
    .unwrap_or_else(|| "never".to_string());

    let template = SettingsTemplate {
        title: "API Settings".to_string(),
        base_url: settings.base_url,
        model: settings.model,
        has_key: !settings.api_key.is_empty(),
        updated,
        notice: state.take_notice(),
    };
    render(template)
}

/// A blank key field keeps the stored key.
pub async fn save_settings(State(state): State<Arc<AppState>>, Form(form): Form<SettingsForm>) -> Redirect {
    let current_key = state.settings.lock().unwrap().api_key.clone();
    let settings = ApiSettings {
        base_url: form.base_url.trim().to_string(),
        api_key: match form.api_key.trim() {
            "" => current_key,
            key => key.to_string(),
        },
        model: form.model.trim().to_string(),
    };

    let saved = state.db.lock().unwrap().save_settings(&settings);
    match saved {
        Ok(()) => state.set_notice("Settings saved"),
        Err(e) => {
            tracing::error!("failed to save settings: {}", e);
            state.set_notice(format!("Settings were applied but not saved: {}", e));
        }
    }

    *state.settings.lock().unwrap() = settings;
    Redirect::to("/settings")
}
