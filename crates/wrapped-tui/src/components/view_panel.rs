//! ViewPanel component: the main pane, drawing whichever view is selected.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, Frame};

use crate::{
    action::{Action, ComponentId, ViewId},
    app_state::AppState,
    component::Component,
};

use super::{artist_table::ArtistTable, count_chart, duration_panel, overview, track_table::TrackTable};

#[derive(Default)]
pub struct ViewPanel {
    pub tracks: TrackTable,
    pub artists: ArtistTable,
}

impl ViewPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn move_selection(&mut self, code: KeyCode, state: &AppState) -> bool {
        match state.view {
            ViewId::TopTracks => self.tracks.handle_key(code, state),
            ViewId::TopArtists => self.artists.handle_key(code, state),
            _ => false,
        }
    }
}

impl Component for ViewPanel {
    fn id(&self) -> ComponentId {
        ComponentId::View
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.move_selection(key.code, state) {
            return vec![];
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Esc => {
                vec![Action::FocusPane(ComponentId::Nav)]
            }
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.move_selection(KeyCode::Up, state);
                vec![]
            }
            MouseEventKind::ScrollDown => {
                self.move_selection(KeyCode::Down, state);
                vec![]
            }
            MouseEventKind::Down(_) => vec![Action::FocusPane(ComponentId::View)],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::CycleWindow | Action::Reload = action {
            self.tracks.reset();
            self.artists.reset();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        match state.view {
            ViewId::Overview => overview::draw(frame, area, focused, state),
            ViewId::TopTracks => self.tracks.draw(frame, area, focused, state),
            ViewId::TopArtists => self.artists.draw(frame, area, focused, state),
            ViewId::Genres => count_chart::draw_genres(frame, area, focused, state),
            ViewId::Hourly => count_chart::draw_hourly(frame, area, focused, state),
            ViewId::Daily => count_chart::draw_daily(frame, area, focused, state),
            ViewId::Durations => duration_panel::draw(frame, area, focused, state),
        }
    }
}
