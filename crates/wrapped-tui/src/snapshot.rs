//! Plain-text export of the current view.
//!
//! The view is drawn into an off-screen buffer at the terminal's size and
//! written out with styling dropped and trailing blanks trimmed.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::app_state::AppState;
use crate::component::Component;
use crate::components::view_panel::ViewPanel;

/// Draw the current view at `width` x `height` and return it as text.
pub fn render_text(state: &AppState, width: u16, height: u16) -> anyhow::Result<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height))?;
    let mut panel = ViewPanel::new();
    terminal.draw(|f| {
        let area = f.area();
        panel.draw(f, area, false, state);
    })?;
    Ok(buffer_text(terminal.backend().buffer()))
}

pub fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        let mut skip = 0usize;
        for x in area.left()..area.right() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            if let Some(cell) = buffer.cell((x, y)) {
                let symbol = cell.symbol();
                line.push_str(symbol);
                // cells covered by a wide glyph hold a placeholder
                skip = symbol.width().saturating_sub(1);
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Write the current view to `exports_dir/wrapped-<view>-<timestamp>.txt`.
pub fn export(state: &AppState, width: u16, height: u16) -> anyhow::Result<PathBuf> {
    let text = render_text(state, width, height)?;
    std::fs::create_dir_all(&state.exports_dir)
        .with_context(|| format!("creating {}", state.exports_dir.display()))?;
    let name = format!(
        "wrapped-{}-{}.txt",
        state.view.slug(),
        Utc::now().format("%Y%m%d-%H%M%S")
    );
    let path = state.exports_dir.join(name);
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    info!("Exported {} view to {}", state.view.title(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ViewId;
    use crate::test_support::sample_dashboard;

    #[test]
    fn test_export_overview_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(dir.path().join("curated"), dir.path().join("exports"));
        state.dashboard = Some(sample_dashboard());

        let path = export(&state, 100, 30).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("wrapped-overview-"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("minutes in top tracks"));
        assert!(text.contains("Sometimes"));
        assert!(text.lines().all(|l| !l.ends_with(' ')));
        assert_eq!(text.lines().count(), 30);

        state.view = ViewId::Hourly;
        let hourly = render_text(&state, 100, 20).unwrap();
        assert!(hourly.contains("listening by hour"));
        assert!(hourly.contains("09"));
    }

    #[test]
    fn test_unavailable_view_explains_error() {
        let mut state = AppState::new(PathBuf::from("c"), PathBuf::from("e"));
        state.load_error = Some("curated files missing: top_tracks.csv".into());
        state.view = ViewId::TopTracks;
        let text = render_text(&state, 90, 12).unwrap();
        assert!(text.contains("Could not load curated data"));
        assert!(text.contains("top_tracks.csv"));
    }
}
