//! What a data view shows when there is no dashboard to draw from.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

use crate::app_state::AppState;
use crate::theme::{style_error, style_muted, style_secondary};

pub fn draw_unavailable(frame: &mut Frame, area: Rect, block: Block, state: &AppState) {
    let mut lines = vec![Line::from("")];
    match &state.load_error {
        Some(err) => {
            lines.push(Line::from(Span::styled(" Could not load curated data", style_error())));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!(" {}", err), style_secondary())));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                " Run `wrapped fetch`, then press R to regenerate or r to reload.",
                style_muted(),
            )));
        }
        None if state.regenerating => {
            lines.push(Line::from(Span::styled(" Regenerating…", style_secondary())));
        }
        None => {
            lines.push(Line::from(Span::styled(" Loading…", style_muted())));
        }
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Single muted line for a view whose data set is empty.
pub fn draw_empty(frame: &mut Frame, area: Rect, block: Block, message: &str) {
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(format!(" {}", message), style_muted())),
        ])
        .block(block),
        area,
    );
}
