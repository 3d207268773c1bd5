//! AppState: data shared read-only with every component.
//!
//! Only the App event loop writes to it.

use std::path::PathBuf;

use wrapped_core::dashboard::Dashboard;
use wrapped_core::model::TimeRange;

use crate::action::ViewId;

pub struct AppState {
    /// Last successful load; `None` until one succeeds or after a failure.
    pub dashboard: Option<Dashboard>,
    /// Why the last load failed, shown in place of view content.
    pub load_error: Option<String>,
    pub view: ViewId,
    /// Window filter for track/artist views; `None` shows every window.
    pub window: Option<TimeRange>,
    pub regenerating: bool,
    pub curated_dir: PathBuf,
    pub exports_dir: PathBuf,
}

impl AppState {
    pub fn new(curated_dir: PathBuf, exports_dir: PathBuf) -> Self {
        Self {
            dashboard: None,
            load_error: None,
            view: ViewId::Overview,
            window: None,
            regenerating: false,
            curated_dir,
            exports_dir,
        }
    }

    /// all → 4 weeks → 6 months → all time → all
    pub fn cycle_window(&mut self) {
        self.window = match self.window {
            None => Some(TimeRange::ShortTerm),
            Some(TimeRange::ShortTerm) => Some(TimeRange::MediumTerm),
            Some(TimeRange::MediumTerm) => Some(TimeRange::LongTerm),
            Some(TimeRange::LongTerm) => None,
        };
    }

    pub fn window_label(&self) -> &'static str {
        self.window.map_or("all windows", TimeRange::label)
    }
}
