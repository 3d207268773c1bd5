//! Action enum: user intents and internal events routed through the App.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Nav,
    View,
    HelpOverlay,
}

/// The dashboard views, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Overview,
    TopTracks,
    TopArtists,
    Genres,
    Hourly,
    Daily,
    Durations,
}

impl ViewId {
    pub const ALL: [ViewId; 7] = [
        Self::Overview,
        Self::TopTracks,
        Self::TopArtists,
        Self::Genres,
        Self::Hourly,
        Self::Daily,
        Self::Durations,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::TopTracks => "Top Tracks",
            Self::TopArtists => "Top Artists",
            Self::Genres => "Genres",
            Self::Hourly => "Listening by Hour",
            Self::Daily => "Daily Trend",
            Self::Durations => "Durations",
        }
    }

    /// File-name friendly name, used for exported snapshots.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::TopTracks => "top-tracks",
            Self::TopArtists => "top-artists",
            Self::Genres => "genres",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Durations => "durations",
        }
    }

    /// Digit that jumps to this view.
    pub fn number_key(self) -> char {
        let pos = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        char::from(b'1' + pos as u8)
    }

    pub fn from_number_key(c: char) -> Option<Self> {
        let digit = c.to_digit(10)? as usize;
        Self::ALL.get(digit.checked_sub(1)?).copied()
    }

    /// Views whose rows are tagged with a listening window.
    pub fn has_window_filter(self) -> bool {
        matches!(self, Self::TopTracks | Self::TopArtists)
    }
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),
    ShowView(ViewId),

    // ── Data ─────────────────────────────────────────────────────────────────
    CycleWindow,
    Reload,
    Regenerate,
    Export,

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleHelp,
    Quit,
    Resize(u16, u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_keys_round_trip() {
        for view in ViewId::ALL {
            assert_eq!(ViewId::from_number_key(view.number_key()), Some(view));
        }
        assert_eq!(ViewId::Overview.number_key(), '1');
        assert_eq!(ViewId::Durations.number_key(), '7');
        assert_eq!(ViewId::from_number_key('0'), None);
        assert_eq!(ViewId::from_number_key('8'), None);
    }
}
