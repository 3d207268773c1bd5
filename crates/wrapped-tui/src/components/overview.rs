//! Overview: headline numbers and the top-5 lists.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use wrapped_core::dashboard::Dashboard;

use crate::app_state::AppState;
use crate::theme::{
    style_heading, style_muted, style_secondary, C_ACCENT, C_BADGE_STALE, C_HIGHLIGHT, C_PRIMARY,
};
use crate::widgets::{
    empty_state::draw_unavailable,
    pane_chrome::{pane_chrome, Badge},
    text::{pad, thousands},
};

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {}", pad(label, 22)), style_secondary()),
        Span::styled(
            value,
            Style::default().fg(C_HIGHLIGHT).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn ranked(title: &str, names: &[String], width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", title), style_heading())),
        Line::from(""),
    ];
    if names.is_empty() {
        lines.push(Line::from(Span::styled("  nothing yet", style_muted())));
    }
    for (i, name) in names.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>2}  ", i + 1), Style::default().fg(C_ACCENT)),
            Span::styled(
                pad(name, width.saturating_sub(6)),
                Style::default().fg(C_PRIMARY),
            ),
        ]));
    }
    lines
}

pub fn highlight_lines(dashboard: &Dashboard) -> Vec<Line<'static>> {
    let h = &dashboard.highlights;
    let mut lines = vec![
        Line::from(Span::styled(" your listening", style_heading())),
        Line::from(""),
        stat_line("minutes in top tracks", format!("{:.2}", h.total_minutes)),
        stat_line("unique top tracks", thousands(h.unique_tracks as u64)),
        stat_line("unique top artists", thousands(h.unique_artists as u64)),
        stat_line("recent plays", thousands(h.play_count as u64)),
        stat_line(
            "most active hour",
            h.most_active_hour
                .map_or_else(|| "–".to_string(), |hour| format!("{:02}:00 UTC", hour)),
        ),
    ];
    if let Some(top) = dashboard.genres.first() {
        lines.push(stat_line("top genre", top.label.clone()));
    }

    if dashboard.regenerated {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  curated files were missing and have been regenerated",
            style_muted(),
        )));
    }
    if !dashboard.stale.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "  recomputed from row tables, disagrees with: {}",
                dashboard.stale.join(", ")
            ),
            Style::default().fg(C_BADGE_STALE),
        )));
    }
    lines
}

pub fn draw(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
    let stale = state.dashboard.as_ref().map_or(false, |d| !d.stale.is_empty());
    let badge = stale.then_some(Badge {
        text: "STALE",
        color: C_BADGE_STALE,
    });
    let block = pane_chrome("overview", Some('1'), focused, badge);
    let Some(dashboard) = &state.dashboard else {
        draw_unavailable(frame, area, block, state);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [top, bottom] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(0)])
        .areas(inner);
    frame.render_widget(Paragraph::new(highlight_lines(dashboard)), top);

    let [left, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(bottom);
    let h = &dashboard.highlights;
    frame.render_widget(
        Paragraph::new(ranked("top 5 tracks", &h.top_tracks, left.width as usize)),
        left,
    );
    frame.render_widget(
        Paragraph::new(ranked("top 5 artists", &h.top_artists, right.width as usize)),
        right,
    );
}
