//! TUI rendering for GroFlow using ratatui.

mod input;
mod theme;
mod views;

pub use input::{InputPump, handle_events, handle_key};
pub use theme::{Palette, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use groflow_engine::groflow_types::View;
use groflow_engine::{App, Form, InputMode, NoticeKind};

const SIDEBAR_WIDTH: u16 = 24;
const MASK_GLYPH: char = '•';

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = palette(app.high_contrast());
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Sidebar and body
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
        .split(rows[0]);

    draw_sidebar(frame, app, columns[0], &palette);
    views::draw_view(frame, app, columns[1], &palette);
    draw_status_bar(frame, app, rows[1], &palette);
    draw_key_hints(frame, app, rows[2], &palette);
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let mut lines = vec![
        Line::from(Span::styled(" GroFlow", styles::title(palette))),
        Line::from(Span::styled(
            format!(" {}", app.session().ledger().balance()),
            Style::default().fg(palette.warning),
        )),
        Line::from(""),
    ];
    for (index, view) in View::ALL.iter().enumerate() {
        let current = *view == app.view();
        let marker = if current { "▸" } else { " " };
        let style = if current {
            styles::selected(palette)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{} ", index + 1), styles::key_highlight(palette)),
            Span::styled(view.title(), style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette, false))
        .style(Style::default().bg(palette.bg_panel));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub(crate) fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let (status_text, status_style) = if let Some(notice) = app.notice() {
        let (prefix, color) = match notice.kind {
            NoticeKind::Error => ("Error: ", palette.error),
            NoticeKind::Success => ("", palette.success),
            NoticeKind::Info => ("", palette.text_secondary),
        };
        (format!("{prefix}{}", notice.text), Style::default().fg(color))
    } else if let Some(kind) = app.pending_generation() {
        let spinner = spinner_frame(app.tick_count());
        (
            format!("{spinner} Waiting for {kind}..."),
            Style::default().fg(palette.primary),
        )
    } else if let Some(masked) = app.masked_api_key() {
        (
            format!("● Gemini {} │ key {masked}", app.gateway().model),
            Style::default().fg(palette.success),
        )
    } else {
        (
            "○ No API key │ press 7 then e to add one".to_string(),
            Style::default().fg(palette.warning),
        )
    };

    // A notice hides the spinner, so keep a marker while a reply is due.
    let status_text = match (app.notice(), app.pending_generation()) {
        (Some(_), Some(_)) => format!("{} {status_text}", spinner_frame(app.tick_count())),
        _ => status_text,
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status_text, status_style),
    ]));
    frame.render_widget(status, area);
}

fn draw_key_hints(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let hints: &[(&str, &str)] = match app.mode() {
        InputMode::Editing(_) => &[
            ("Enter", "submit"),
            ("Tab", "next field"),
            ("Esc", "cancel"),
        ],
        InputMode::Normal => match app.view() {
            View::Home => &[("1-7", "views"), ("Tab", "next"), ("q", "quit")],
            View::Assistant => &[("e", "edit plan"), ("g", "generate"), ("q", "quit")],
            View::Roadmap => &[
                ("e", "edit plan"),
                ("g", "generate"),
                ("l", "load into tracker"),
            ],
            View::Tracker => &[
                ("j/k", "move"),
                ("space", "toggle"),
                ("a", "add"),
                ("s", "setback"),
                ("r", "recalibrate"),
            ],
            View::Marketplace => &[("j/k", "move"), ("v", "vouch"), ("n", "new campaign")],
            View::Investor => &[("j/k", "move"), ("i", "invest"), ("l", "add liquidity")],
            View::Settings => &[("e", "set key"), ("x", "clear key"), ("q", "quit")],
        },
    };

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", styles::key_hint(palette)));
        }
        spans.push(Span::styled(*key, styles::key_highlight(palette)));
        spans.push(Span::styled(format!(" {label}"), styles::key_hint(palette)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render a form as one labelled line per field.
///
/// When `active`, the focused field is highlighted and the terminal cursor
/// is placed inside it.
pub(crate) fn draw_form(
    frame: &mut Frame,
    form: &Form,
    area: Rect,
    active: bool,
    palette: &Palette,
) {
    let label_width = form
        .fields()
        .iter()
        .map(|f| f.label.width())
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = form
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let focused = active && index == form.focus();
            let label_style = if focused {
                styles::key_highlight(palette)
            } else {
                Style::default().fg(palette.text_muted)
            };
            let value_style = if focused {
                Style::default()
                    .fg(palette.text_primary)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            Line::from(vec![
                Span::styled(format!("{:>label_width$}: ", field.label), label_style),
                Span::styled(field_display(field.input.text(), field.masked), value_style),
            ])
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(format!(" {} ", form.id().title()), styles::title(palette)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette, active));
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if active {
        let focus = form.focus();
        if let Some(field) = form.fields().get(focus) {
            let before: String = field.input.text().chars().take(field.input.cursor()).collect();
            let offset = field_display(&before, field.masked).width() + label_width + 2;
            let x = inner
                .x
                .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
                .min(inner.right().saturating_sub(1));
            let y = inner.y.saturating_add(u16::try_from(focus).unwrap_or(u16::MAX));
            if y < inner.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

/// Rows a form needs including its border.
pub(crate) fn form_height(form: &Form) -> u16 {
    u16::try_from(form.fields().len()).unwrap_or(u16::MAX).saturating_add(2)
}

fn field_display(text: &str, masked: bool) -> String {
    if masked {
        std::iter::repeat_n(MASK_GLYPH, text.chars().count()).collect()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groflow_engine::{AppOptions, FormId};
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    pub(crate) fn render(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn sidebar_lists_every_view_and_balance() {
        let app = App::new(AppOptions::default());
        let screen = render(&app, 100, 30);
        for view in View::ALL {
            assert!(screen.contains(view.title()), "missing {}", view.title());
        }
        assert!(screen.contains("120 pts"));
    }

    #[test]
    fn status_bar_prompts_for_missing_key() {
        let app = App::new(AppOptions::default());
        assert!(render(&app, 100, 30).contains("No API key"));
    }

    #[test]
    fn notice_replaces_status() {
        let mut app = App::new(AppOptions::default());
        app.navigate(View::Marketplace);
        app.vouch_selected();
        let screen = render(&app, 120, 30);
        assert!(screen.contains("Vouched for"));
    }

    #[test]
    fn masked_fields_never_render_their_text() {
        let mut app = App::new(AppOptions::default());
        app.navigate(View::Settings);
        app.begin_edit(FormId::Credential);
        app.form_mut(FormId::Credential).set_value(0, "AIzaSecretValue");
        let screen = render(&app, 100, 30);
        assert!(!screen.contains("AIzaSecretValue"));
        assert!(screen.contains("•••••"));
    }

    #[test]
    fn editing_hints_replace_view_hints() {
        let mut app = App::new(AppOptions::default());
        app.navigate(View::Tracker);
        assert!(render(&app, 100, 30).contains("recalibrate"));
        app.begin_edit(FormId::NewTask);
        assert!(render(&app, 100, 30).contains("next field"));
    }

    #[test]
    fn field_display_masks_per_char() {
        assert_eq!(field_display("abc", true), "•••");
        assert_eq!(field_display("abc", false), "abc");
    }
}
