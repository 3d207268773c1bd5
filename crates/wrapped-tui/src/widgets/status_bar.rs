//! Status bar: the current view, window filter, and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::ViewId;
use crate::app_state::AppState;
use crate::theme::{C_ACCENT, C_BADGE_STALE, C_MUTED, C_SEPARATOR, C_WINDOW};

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn keys_for(view: ViewId) -> &'static str {
    match view {
        ViewId::TopTracks | ViewId::TopArtists => {
            " ↑↓/jk select  g/G ends  w window  1-7 views  Tab panes  r reload  R regenerate  e export  ? help  q quit"
        }
        _ => " 1-7 views  Tab panes  r reload  R regenerate  e export  ? help  q quit",
    }
}

/// One-row footer.
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::styled(
        format!(" {} ", state.view.title().to_uppercase()),
        Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
    )];

    if state.view.has_window_filter() {
        spans.push(Span::styled(
            format!("[{}] ", state.window_label()),
            Style::default().fg(C_WINDOW),
        ));
    }

    let stale = state.dashboard.as_ref().map_or(0, |d| d.stale.len());
    if stale > 0 {
        spans.push(Span::styled(
            format!("● {} stale ", stale),
            Style::default().fg(C_BADGE_STALE),
        ));
    }

    spans.push(Span::styled(keys_for(state.view), Style::default().fg(C_MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
