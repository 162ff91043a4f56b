//! Shared test utilities and fixtures
//!
//! A mock Gemini endpoint plus helpers for driving the dashboard.

#![allow(dead_code)]

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groflow_engine::groflow_providers::GatewayConfig;
use groflow_engine::groflow_types::ApiKey;
use groflow_engine::{App, AppOptions};

pub const TEST_MODEL: &str = "gemini-test";
pub const TEST_KEY: &str = "AIzaTestKey0000x9Q2";

pub fn generate_path() -> String {
    format!("/v1beta/models/{TEST_MODEL}:generateContent")
}

pub fn gateway(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        base_url: server.uri(),
        model: TEST_MODEL.to_string(),
    }
}

pub fn test_key() -> ApiKey {
    ApiKey::new(TEST_KEY).expect("non-empty key")
}

/// A Gemini reply carrying `text` as its only candidate.
pub fn candidate_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// Answer every generateContent call for the test key with `text`.
pub async fn mount_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(query_param("key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(text)))
        .mount(server)
        .await;
}

pub fn app_for(server: &MockServer) -> App {
    App::new(AppOptions {
        gateway: gateway(server),
        api_key: Some(test_key()),
        ..AppOptions::default()
    })
}

pub fn press(app: &mut App, code: KeyCode) {
    groflow_tui::handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Tick until the in-flight request settles.
pub async fn wait_for_generation(app: &mut App) {
    for _ in 0..300 {
        app.tick();
        if app.pending_generation().is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("generation did not finish");
}

pub fn render(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
    terminal
        .draw(|frame| groflow_tui::draw(frame, app))
        .expect("draw");
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}
