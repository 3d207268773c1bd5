//! Top tracks, one row per (window, rank), artists joined primary first.

use ratatui::crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use wrapped_core::dashboard::TrackView;

use crate::app_state::AppState;
use crate::theme::{style_selected, style_table_header, C_MUTED, C_PRIMARY, C_SECONDARY, C_WINDOW};
use crate::widgets::{
    empty_state::{draw_empty, draw_unavailable},
    pane_chrome::{pane_chrome, Badge},
    selection,
    text::{or_dash, pad},
};

const RANK_W: usize = 4;
const WINDOW_W: usize = 10;
const MIN_W: usize = 6;
const POP_W: usize = 5;

#[derive(Default)]
pub struct TrackTable {
    list_state: ListState,
}

/// Column widths for the free-text columns (track, artists, album).
fn text_widths(total: usize, show_window: bool) -> (usize, usize, usize) {
    let fixed = RANK_W + MIN_W + POP_W + if show_window { WINDOW_W } else { 0 };
    let free = total.saturating_sub(fixed + 3);
    let track = free * 2 / 5;
    let artists = free * 3 / 10;
    (track, artists, free - track - artists)
}

fn row_text(track: &TrackView, width: usize, show_window: bool) -> Vec<Span<'static>> {
    let (tw, aw, lw) = text_widths(width, show_window);
    let mut spans = vec![Span::styled(
        pad(&format!("{:>3}", track.rank), RANK_W),
        Style::default().fg(C_SECONDARY),
    )];
    if show_window {
        spans.push(Span::styled(
            pad(track.time_range.label(), WINDOW_W),
            Style::default().fg(C_WINDOW),
        ));
    }
    spans.push(Span::styled(
        pad(&track.name, tw),
        Style::default().fg(C_PRIMARY),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        pad(&track.artists.join(", "), aw),
        Style::default().fg(C_SECONDARY),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        pad(track.album.as_deref().unwrap_or(""), lw),
        Style::default().fg(C_MUTED),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!(
            "{:>w$}",
            or_dash(track.duration_min.map(|m| format!("{:.2}", m))),
            w = MIN_W
        ),
        Style::default().fg(C_SECONDARY),
    ));
    spans.push(Span::styled(
        format!("{:>w$}", or_dash(track.popularity), w = POP_W),
        Style::default().fg(C_MUTED),
    ));
    spans
}

impl TrackTable {
    #[cfg(test)]
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn handle_key(&mut self, code: KeyCode, state: &AppState) -> bool {
        let len = state
            .dashboard
            .as_ref()
            .map_or(0, |d| d.tracks_in(state.window).len());
        selection::apply_key(&mut self.list_state, code, len)
    }

    /// Selection goes back to the top when the window filter changes.
    pub fn reset(&mut self) {
        self.list_state.select(None);
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = state.window.map(|w| Badge {
            text: w.label(),
            color: C_WINDOW,
        });
        let block = pane_chrome("top tracks", Some('2'), focused, badge);
        let Some(dashboard) = &state.dashboard else {
            draw_unavailable(frame, area, block, state);
            return;
        };
        let rows = dashboard.tracks_in(state.window);
        if rows.is_empty() {
            draw_empty(frame, area, block, "no top tracks for this window");
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        let [header_area, list_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .areas(inner);

        let show_window = state.window.is_none();
        let width = inner.width as usize;
        let (tw, aw, lw) = text_widths(width, show_window);
        let mut header = vec![Span::raw(pad("  #", RANK_W))];
        if show_window {
            header.push(Span::raw(pad("window", WINDOW_W)));
        }
        header.push(Span::raw(format!(
            "{} {} {} {:>mw$}{:>pw$}",
            pad("track", tw),
            pad("artists", aw),
            pad("album", lw),
            "min",
            "pop",
            mw = MIN_W,
            pw = POP_W
        )));
        frame.render_widget(
            Paragraph::new(Line::from(header)).style(style_table_header()),
            header_area,
        );

        let items: Vec<ListItem> = rows
            .iter()
            .map(|t| ListItem::new(Line::from(row_text(t, width, show_window))))
            .collect();
        let clamped = selection::clamp(self.list_state.selected(), items.len());
        self.list_state.select(clamped);

        let list = List::new(items).highlight_style(style_selected(focused));
        frame.render_stateful_widget(list, list_area, &mut self.list_state);
    }
}
