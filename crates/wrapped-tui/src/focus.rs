//! FocusRing: cycles through an ordered set of ids (panes, sidebar entries).

pub struct FocusRing<T> {
    items: Vec<T>,
    current: usize,
}

impl<T: Copy + PartialEq> FocusRing<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<T> {
        self.items.get(self.current).copied()
    }

    pub fn position(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        self.current = self
            .current
            .checked_sub(1)
            .unwrap_or(self.items.len() - 1);
        self.current()
    }

    /// Focus `id`; unknown ids are ignored.
    pub fn set(&mut self, id: T) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: T) -> bool {
        self.current() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_both_ways() {
        let mut ring = FocusRing::new(vec!['a', 'b', 'c']);
        assert_eq!(ring.current(), Some('a'));
        assert_eq!(ring.prev(), Some('c'));
        assert_eq!(ring.next(), Some('a'));
        assert_eq!(ring.next(), Some('b'));
        ring.set('c');
        assert!(ring.is_focused('c'));
        ring.set('z');
        assert_eq!(ring.position(), 2);
    }

    #[test]
    fn test_empty_ring() {
        let mut ring: FocusRing<u8> = FocusRing::new(Vec::new());
        assert_eq!(ring.next(), None);
        assert_eq!(ring.prev(), None);
        assert!(!ring.is_focused(0));
    }
}
