//! Bar and line charts over the frequency aggregates.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType},
    Frame,
};

use wrapped_core::stats::Count;

use crate::app_state::AppState;
use crate::theme::{
    style_heading, style_muted, style_secondary, C_ACCENT, C_ACCENT_DIM, C_GENRE, C_PRIMARY,
};
use crate::widgets::{
    empty_state::{draw_empty, draw_unavailable},
    pane_chrome::pane_chrome,
    text::truncate,
};

/// Horizontal bars, one per count, label truncated to `label_width`.
fn horizontal_bars<'a>(
    counts: &[Count],
    label_width: usize,
    color: ratatui::style::Color,
) -> Vec<Bar<'a>> {
    counts
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.count)
                .label(Line::from(truncate(&c.label, label_width)))
                .text_value(c.count.to_string())
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD))
        })
        .collect()
}

fn ranked_chart<'a>(title: &'a str, bars: &'a [Bar<'a>]) -> BarChart<'a> {
    BarChart::default()
        .block(Block::default().title(Line::styled(format!(" {}", title), style_heading())))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .label_style(style_secondary())
        .data(BarGroup::default().bars(bars))
}

pub fn draw_genres(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
    let block = pane_chrome("genres & artists", Some('4'), focused, None);
    let Some(dashboard) = &state.dashboard else {
        draw_unavailable(frame, area, block, state);
        return;
    };
    if dashboard.genres.is_empty() && dashboard.artist_frequency.is_empty() {
        draw_empty(frame, area, block, "no genres or artists to count");
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [left, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(inner);

    let label_width = (left.width as usize / 3).max(8);
    let genre_bars = horizontal_bars(&dashboard.genres, label_width, C_GENRE);
    let artist_bars = horizontal_bars(&dashboard.artist_frequency, label_width, C_ACCENT);
    frame.render_widget(ranked_chart("top genres", &genre_bars), left);
    frame.render_widget(ranked_chart("artist frequency in top tracks", &artist_bars), right);
}

pub fn draw_hourly(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
    let block = pane_chrome("listening by hour (UTC)", Some('5'), focused, None);
    let Some(dashboard) = &state.dashboard else {
        draw_unavailable(frame, area, block, state);
        return;
    };
    if dashboard.hourly.iter().all(|&c| c == 0) {
        draw_empty(frame, area, block, "no timestamped plays");
        return;
    }

    let peak = dashboard.highlights.most_active_hour;
    let bars: Vec<Bar> = dashboard
        .hourly
        .iter()
        .enumerate()
        .map(|(hour, &count)| {
            let color = if peak == Some(hour as u32) {
                C_ACCENT
            } else {
                C_ACCENT_DIM
            };
            Bar::default()
                .value(count)
                .label(Line::from(format!("{:02}", hour)))
                .text_value(if count > 0 { count.to_string() } else { String::new() })
                .style(Style::default().fg(color))
        })
        .collect();

    // 24 bars of width w plus 23 one-column gaps
    let inner_w = area.width.saturating_sub(2);
    let bar_width = (inner_w.saturating_sub(23) / 24).max(1);
    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .label_style(style_muted())
        .value_style(Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

pub fn draw_daily(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
    let block = pane_chrome("daily trend", Some('6'), focused, None);
    let Some(dashboard) = &state.dashboard else {
        draw_unavailable(frame, area, block, state);
        return;
    };
    if dashboard.daily.is_empty() {
        draw_empty(frame, area, block, "no timestamped plays");
        return;
    }

    let points: Vec<(f64, f64)> = dashboard
        .daily
        .iter()
        .enumerate()
        .map(|(i, (_, count))| (i as f64, *count as f64))
        .collect();
    let max = dashboard.daily.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let last = points.len().saturating_sub(1);

    let fmt = |i: usize| {
        dashboard
            .daily
            .get(i)
            .map(|(d, _)| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    let x_labels = if last == 0 {
        vec![fmt(0)]
    } else {
        vec![fmt(0), fmt(last / 2), fmt(last)]
    };

    let dataset = Dataset::default()
        .name("plays")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(C_ACCENT))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(style_muted())
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(style_muted())
                .bounds([0.0, max as f64])
                .labels(vec!["0".to_string(), max.to_string()]),
        );
    frame.render_widget(chart, area);
}
