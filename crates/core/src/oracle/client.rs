//! Chat-completions client that asks a language model for a move

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::types::*;
use crate::error::{Error, Result};

const TEMPERATURE: f32 = 0.1;

pub struct OracleClient {
    client: Client,
    settings: ApiSettings,
}

impl OracleClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        if !settings.is_complete() {
            return Err(Error::IncompleteSettings);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.settings.api_key.trim())) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    pub fn chat_request(&self, request: &OracleRequest) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.trim().to_string(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(build_prompt(request))],
            temperature: TEMPERATURE,
        }
    }

    /// Asks for the next move and returns the model's raw reply.
    pub async fn next_move(&self, request: &OracleRequest) -> Result<String> {
        let url = self.settings.completions_url();
        tracing::debug!(kind = request.kind.as_str(), fen = %request.fen, "asking oracle for a move");

        let response = self.client
            .post(&url)
            .headers(self.headers())
            .json(&self.chat_request(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Oracle(format!(
                "API error: {} - {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response.text().await?;
        let reply = parse_reply(&text)?;
        tracing::debug!(reply = %reply, "oracle replied");
        Ok(reply)
    }
}

fn parse_reply(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .first_content()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| Error::Oracle("response contained no message".to_string()))
}
