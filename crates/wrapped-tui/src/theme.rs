//! Color palette and style helpers for the dashboard.

use ratatui::style::{Color, Modifier, Style};

pub const C_BG: Color = Color::Rgb(16, 16, 18);
pub const C_ACCENT: Color = Color::Rgb(30, 215, 96);
pub const C_ACCENT_DIM: Color = Color::Rgb(22, 120, 62);
pub const C_HIGHLIGHT: Color = Color::Rgb(255, 184, 80);
pub const C_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SEPARATOR: Color = Color::Rgb(40, 40, 52);
pub const C_SECONDARY: Color = Color::Rgb(125, 125, 145);
pub const C_PRIMARY: Color = Color::Rgb(215, 215, 228);
pub const C_SELECTION_BG: Color = Color::Rgb(30, 34, 32);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(30, 215, 96);
pub const C_NUMBER_HINT: Color = Color::Rgb(90, 90, 115);
pub const C_WINDOW: Color = Color::Rgb(120, 100, 200);
pub const C_GENRE: Color = Color::Rgb(80, 140, 200);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(30, 215, 96);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_BADGE_STALE: Color = Color::Rgb(255, 184, 80);
pub const C_POPUP_BG: Color = Color::Rgb(18, 18, 26);

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_heading() -> Style {
    Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD)
}

pub fn style_table_header() -> Style {
    Style::default()
        .fg(C_SECONDARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_selected(focused: bool) -> Style {
    let style = Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY);
    if focused {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_error() -> Style {
    Style::default().fg(C_ERROR)
}
