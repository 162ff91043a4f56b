//! Colors and glyphs for the GroFlow TUI.
//!
//! A muted green palette by default, with a high-contrast override for
//! terminals where the RGB shades wash out.

use ratatui::style::{Color, Modifier, Style};

mod colors {
    use super::Color;

    pub const BG_DARK: Color = Color::Rgb(18, 24, 20);
    pub const BG_PANEL: Color = Color::Rgb(26, 34, 29);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 54, 45);
    pub const BORDER: Color = Color::Rgb(70, 92, 78);

    pub const TEXT_PRIMARY: Color = Color::Rgb(222, 228, 214);
    pub const TEXT_SECONDARY: Color = Color::Rgb(184, 194, 170);
    pub const TEXT_MUTED: Color = Color::Rgb(118, 130, 112);

    pub const PRIMARY: Color = Color::Rgb(122, 190, 120); // leaf
    pub const ACCENT: Color = Color::Rgb(120, 182, 204);
    pub const SUCCESS: Color = Color::Rgb(152, 196, 108);
    pub const WARNING: Color = Color::Rgb(230, 195, 132);
    pub const ERROR: Color = Color::Rgb(240, 98, 98);
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            border: colors::BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            accent: colors::ACCENT,
            success: colors::SUCCESS,
            warning: colors::WARNING,
            error: colors::ERROR,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg_dark: Color::Black,
            bg_panel: Color::Black,
            bg_highlight: Color::DarkGray,
            border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_muted: Color::Gray,
            primary: Color::LightGreen,
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

#[must_use]
pub fn palette(high_contrast: bool) -> Palette {
    if high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[must_use]
pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border(palette: &Palette, focused: bool) -> Style {
        Style::default().fg(if focused { palette.accent } else { palette.border })
    }

    #[must_use]
    pub fn selected(palette: &Palette) -> Style {
        Style::default()
            .bg(palette.bg_highlight)
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn key_highlight(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.warning)
            .add_modifier(Modifier::BOLD)
    }
}
