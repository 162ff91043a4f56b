//! Keyboard handling for the GroFlow TUI.
//!
//! Terminal events are read on a blocking task and handed over a bounded
//! channel; [`handle_events`] drains it once per frame. Key semantics live in
//! [`handle_key`], which only touches the [`App`] and is easy to test.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use groflow_engine::groflow_core::PromptKind;
use groflow_engine::groflow_types::View;
use groflow_engine::{App, FormId, InputMode};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25);
const INPUT_CHANNEL_CAPACITY: usize = 256;
const MAX_EVENTS_PER_FRAME: usize = 64;

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();
        let join = tokio::task::spawn_blocking(move || input_loop(&stop2, &tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        self.rx.close();
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: &AtomicBool, tx: &mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Apply queued terminal events. Returns `true` once the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        match ev {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                handle_key(app, key);
            }
            Event::Paste(text) => {
                if let Some(form) = app.editing_form_mut() {
                    form.focused_input_mut().enter_text(&text);
                }
            }
            _ => {}
        }

        if app.should_quit() {
            return Ok(true);
        }
    }
    Ok(app.should_quit())
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return;
    }
    match app.mode() {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Editing(_) => handle_editing_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.request_quit();
            return;
        }
        KeyCode::Esc => {
            app.clear_notice();
            return;
        }
        KeyCode::Tab => {
            app.next_view();
            return;
        }
        KeyCode::BackTab => {
            app.prev_view();
            return;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
            return;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            return;
        }
        KeyCode::Char(c) => {
            if let Some(view) = View::from_hotkey(c) {
                app.navigate(view);
                return;
            }
        }
        _ => {}
    }

    match (app.view(), key.code) {
        (View::Assistant | View::Roadmap, KeyCode::Char('e') | KeyCode::Enter) => {
            app.begin_edit(FormId::Plan);
        }
        (View::Assistant, KeyCode::Char('g')) => app.request_generation(PromptKind::QuickActions),
        (View::Roadmap, KeyCode::Char('g')) => app.request_generation(PromptKind::MonthlyRoadmap),
        (View::Roadmap, KeyCode::Char('l')) => app.load_roadmap_into_tracker(),
        (View::Tracker, KeyCode::Char(' ') | KeyCode::Enter) => app.toggle_selected_task(),
        (View::Tracker, KeyCode::Char('a')) => app.begin_edit(FormId::NewTask),
        (View::Tracker, KeyCode::Char('s')) => app.begin_edit(FormId::Setback),
        (View::Tracker, KeyCode::Char('r')) => {
            app.request_generation(PromptKind::CrisisRecalibration);
        }
        (View::Marketplace, KeyCode::Char('v')) => app.vouch_selected(),
        (View::Marketplace, KeyCode::Char('n')) => app.begin_edit(FormId::Campaign),
        (View::Investor, KeyCode::Char('i') | KeyCode::Enter) => app.begin_edit(FormId::Invest),
        (View::Investor, KeyCode::Char('l')) => app.begin_edit(FormId::Liquidity),
        (View::Settings, KeyCode::Char('e') | KeyCode::Enter) => {
            app.begin_edit(FormId::Credential);
        }
        (View::Settings, KeyCode::Char('x')) => app.clear_credential(),
        _ => {}
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.submit(),
        _ => {
            let Some(form) = app.editing_form_mut() else {
                return;
            };
            match key.code {
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.focused_input_mut().delete_char(),
                KeyCode::Delete => form.focused_input_mut().delete_char_forward(),
                KeyCode::Left => form.focused_input_mut().move_cursor_left(),
                KeyCode::Right => form.focused_input_mut().move_cursor_right(),
                KeyCode::Home => form.focused_input_mut().move_cursor_home(),
                KeyCode::End => form.focused_input_mut().move_cursor_end(),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    form.focused_input_mut().enter_char(c);
                }
                _ => {}
            }
        }
    }
}
