//! Nav component: sidebar listing the dashboard views.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

use crate::{
    action::{Action, ComponentId, ViewId},
    app_state::AppState,
    component::Component,
    focus::FocusRing,
    theme::{C_ACCENT, C_NUMBER_HINT, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::pane_chrome::pane_chrome,
};

pub struct Nav {
    cursor: FocusRing<ViewId>,
    list_state: ListState,
}

impl Nav {
    pub fn new() -> Self {
        Self {
            cursor: FocusRing::new(ViewId::ALL.to_vec()),
            list_state: ListState::default(),
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Option<ViewId> {
        self.cursor.current()
    }
}

impl Default for Nav {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Nav {
    fn id(&self) -> ComponentId {
        ComponentId::Nav
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let moved = match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor.prev(),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.next(),
            KeyCode::Home | KeyCode::Char('g') => {
                self.cursor.set(ViewId::Overview);
                self.cursor.current()
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor.set(ViewId::Durations);
                self.cursor.current()
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                return match self.cursor.current() {
                    Some(view) => vec![Action::ShowView(view), Action::FocusPane(ComponentId::View)],
                    None => vec![],
                };
            }
            _ => None,
        };
        // Moving the cursor previews the view right away.
        moved.map(|view| vec![Action::ShowView(view)]).unwrap_or_default()
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        if let MouseEventKind::Down(MouseButton::Left) = event.kind {
            let row = event.row.saturating_sub(area.y + 1) as usize;
            if let Some(&view) = ViewId::ALL.get(row) {
                self.cursor.set(view);
                return vec![Action::FocusPane(ComponentId::Nav), Action::ShowView(view)];
            }
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ShowView(view) = action {
            self.cursor.set(*view);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("views", None, focused, None);
        let items: Vec<ListItem> = ViewId::ALL
            .iter()
            .map(|&view| {
                let active = view == state.view;
                let name_style = if active {
                    Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
                } else if self.cursor.is_focused(view) {
                    Style::default().fg(C_PRIMARY)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!(" {} ", view.number_key()),
                        Style::default().fg(C_NUMBER_HINT),
                    ),
                    Span::styled(view.title(), name_style),
                ]))
            })
            .collect();

        self.list_state.select(Some(self.cursor.position()));
        let list = List::new(items).block(block).highlight_style(if focused {
            Style::default().bg(C_SELECTION_BG)
        } else {
            Style::default()
        });
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}
