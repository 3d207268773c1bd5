//! Track-duration statistics and their whole-minute histogram.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Paragraph},
    Frame,
};

use wrapped_core::stats::DurationStats;

use crate::app_state::AppState;
use crate::theme::{style_heading, style_muted, style_secondary, C_ACCENT, C_HIGHLIGHT, C_PRIMARY};
use crate::widgets::{
    empty_state::{draw_empty, draw_unavailable},
    pane_chrome::pane_chrome,
};

pub fn metric_lines(stats: &DurationStats) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(" minutes per track", style_heading())),
        Line::from(""),
    ];
    for (metric, value) in stats.metrics() {
        let shown = match (metric, value) {
            ("count", Some(v)) => format!("{:.0}", v),
            (_, Some(v)) => format!("{:.2}", v),
            (_, None) => "–".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<8}", metric), style_secondary()),
            Span::styled(
                format!("{:>8}", shown),
                Style::default().fg(C_HIGHLIGHT).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    lines
}

pub fn draw(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
    let block = pane_chrome("durations", Some('7'), focused, None);
    let Some(dashboard) = &state.dashboard else {
        draw_unavailable(frame, area, block, state);
        return;
    };
    let Some(stats) = &dashboard.durations else {
        draw_empty(frame, area, block, "no track durations");
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [left, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(0)])
        .areas(inner);
    frame.render_widget(Paragraph::new(metric_lines(stats)), left);

    let bars: Vec<Bar> = dashboard
        .duration_buckets
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.count)
                .label(Line::from(c.label.clone()))
                .text_value(c.count.to_string())
                .style(Style::default().fg(C_ACCENT))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title(Line::styled(" tracks per minute bucket", style_heading())))
        .bar_width(5)
        .bar_gap(1)
        .label_style(style_muted())
        .value_style(Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, right);
}
