//! Row selection that stays inside `0..len`.

use ratatui::crossterm::event::KeyCode;
use ratatui::widgets::ListState;

/// Move `selected` by `delta` rows, clamped to the list. Empty lists have no
/// selection.
pub fn step(selected: Option<usize>, delta: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0).min(len - 1) as isize;
    Some((current + delta).clamp(0, len as isize - 1) as usize)
}

pub fn last(len: usize) -> Option<usize> {
    len.checked_sub(1)
}

/// Keep an existing selection valid after the list changed length.
pub fn clamp(selected: Option<usize>, len: usize) -> Option<usize> {
    match (selected, len) {
        (_, 0) => None,
        (None, _) => Some(0),
        (Some(i), n) => Some(i.min(n - 1)),
    }
}

/// Apply a list navigation key. Returns false for keys it does not handle.
pub fn apply_key(list: &mut ListState, code: KeyCode, len: usize) -> bool {
    let selected = list.selected();
    let next = match code {
        KeyCode::Up | KeyCode::Char('k') => step(selected, -1, len),
        KeyCode::Down | KeyCode::Char('j') => step(selected, 1, len),
        KeyCode::PageUp => step(selected, -10, len),
        KeyCode::PageDown => step(selected, 10, len),
        KeyCode::Home | KeyCode::Char('g') => clamp(Some(0), len),
        KeyCode::End | KeyCode::Char('G') => last(len),
        _ => return false,
    };
    list.select(next);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps() {
        assert_eq!(step(Some(0), -1, 5), Some(0));
        assert_eq!(step(Some(3), 10, 5), Some(4));
        assert_eq!(step(None, 1, 5), Some(1));
        assert_eq!(step(Some(2), 1, 0), None);
    }

    #[test]
    fn test_clamp_after_shrink() {
        assert_eq!(clamp(Some(9), 3), Some(2));
        assert_eq!(clamp(None, 3), Some(0));
        assert_eq!(clamp(Some(1), 0), None);
        assert_eq!(last(0), None);
        assert_eq!(last(4), Some(3));
    }

    #[test]
    fn test_apply_key() {
        let mut list = ListState::default();
        assert!(apply_key(&mut list, KeyCode::Char('j'), 3));
        assert_eq!(list.selected(), Some(1));
        assert!(apply_key(&mut list, KeyCode::End, 3));
        assert_eq!(list.selected(), Some(2));
        assert!(apply_key(&mut list, KeyCode::PageUp, 3));
        assert_eq!(list.selected(), Some(0));
        assert!(!apply_key(&mut list, KeyCode::Char('x'), 3));
    }
}
