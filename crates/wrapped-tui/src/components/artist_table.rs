//! Top artists with their genres and follower counts.

use ratatui::crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use wrapped_core::dashboard::ArtistView;

use crate::app_state::AppState;
use crate::theme::{style_selected, style_table_header, C_GENRE, C_MUTED, C_PRIMARY, C_SECONDARY, C_WINDOW};
use crate::widgets::{
    empty_state::{draw_empty, draw_unavailable},
    pane_chrome::{pane_chrome, Badge},
    selection,
    text::{or_dash, pad, thousands},
};

const RANK_W: usize = 4;
const WINDOW_W: usize = 10;
const POP_W: usize = 5;
const FOLLOWERS_W: usize = 13;

#[derive(Default)]
pub struct ArtistTable {
    list_state: ListState,
}

fn text_widths(total: usize, show_window: bool) -> (usize, usize) {
    let fixed = RANK_W + POP_W + FOLLOWERS_W + if show_window { WINDOW_W } else { 0 };
    let free = total.saturating_sub(fixed + 2);
    let name = free * 2 / 5;
    (name, free - name)
}

fn row_text(artist: &ArtistView, width: usize, show_window: bool) -> Vec<Span<'static>> {
    let (nw, gw) = text_widths(width, show_window);
    let mut spans = vec![Span::styled(
        pad(&format!("{:>3}", artist.rank), RANK_W),
        Style::default().fg(C_SECONDARY),
    )];
    if show_window {
        spans.push(Span::styled(
            pad(artist.time_range.label(), WINDOW_W),
            Style::default().fg(C_WINDOW),
        ));
    }
    spans.push(Span::styled(pad(&artist.name, nw), Style::default().fg(C_PRIMARY)));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        pad(&artist.genres.join(", "), gw),
        Style::default().fg(C_GENRE),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("{:>w$}", or_dash(artist.popularity), w = POP_W),
        Style::default().fg(C_MUTED),
    ));
    spans.push(Span::styled(
        format!("{:>w$}", or_dash(artist.followers.map(thousands)), w = FOLLOWERS_W),
        Style::default().fg(C_SECONDARY),
    ));
    spans
}

impl ArtistTable {
    pub fn handle_key(&mut self, code: KeyCode, state: &AppState) -> bool {
        let len = state
            .dashboard
            .as_ref()
            .map_or(0, |d| d.artists_in(state.window).len());
        selection::apply_key(&mut self.list_state, code, len)
    }

    pub fn reset(&mut self) {
        self.list_state.select(None);
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = state.window.map(|w| Badge {
            text: w.label(),
            color: C_WINDOW,
        });
        let block = pane_chrome("top artists", Some('3'), focused, badge);
        let Some(dashboard) = &state.dashboard else {
            draw_unavailable(frame, area, block, state);
            return;
        };
        let rows = dashboard.artists_in(state.window);
        if rows.is_empty() {
            draw_empty(frame, area, block, "no top artists for this window");
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
        let (nw, gw) = text_widths(width, show_window);
        let mut header = pad("  #", RANK_W);
        if show_window {
            header.push_str(&pad("window", WINDOW_W));
        }
        header.push_str(&format!(
            "{} {} {:>pw$}{:>fw$}",
            pad("artist", nw),
            pad("genres", gw),
            "pop",
            "followers",
            pw = POP_W,
            fw = FOLLOWERS_W
        ));
        frame.render_widget(Paragraph::new(header).style(style_table_header()), header_area);

        let items: Vec<ListItem> = rows
            .iter()
            .map(|a| ListItem::new(Line::from(row_text(a, width, show_window))))
            .collect();
        let clamped = selection::clamp(self.list_state.selected(), items.len());
        self.list_state.select(clamped);

        let list = List::new(items).highlight_style(style_selected(focused));
        frame.render_stateful_widget(list, list_area, &mut self.list_state);
    }
}
