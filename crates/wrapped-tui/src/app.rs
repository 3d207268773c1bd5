//! App: component-based event loop for the dashboard.
//!
//! - `App` owns every component and the `AppState` they read from.
//! - A `tokio::mpsc` channel carries terminal events and background results.
//! - Components return `Vec<Action>`; the App dispatches each Action.
//! - Regeneration runs on the blocking pool and reports back over the channel.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use wrapped_core::curated::CuratedStore;
use wrapped_core::dashboard::Dashboard;
use wrapped_core::normalize::NormalizeReport;
use wrapped_core::provider::DatasetProvider;

use crate::{
    action::{Action, ComponentId, ViewId},
    app_state::AppState,
    component::Component,
    components::{help_overlay::HelpOverlay, nav::Nav, view_panel::ViewPanel},
    focus::FocusRing,
    snapshot,
    theme::C_BG,
    widgets::{
        status_bar,
        toast::{Severity, ToastManager},
    },
};

const NAV_WIDTH: u16 = 24;
/// Export size used before the first frame reports the real one.
const DEFAULT_SIZE: (u16, u16) = (120, 40);

pub enum AppMessage {
    Event(Event),
    Regenerated(Result<NormalizeReport, String>),
}

#[derive(Default)]
struct PaneAreas {
    nav: Rect,
    view: Rect,
}

pub struct App {
    pub state: AppState,
    store: CuratedStore,
    provider: Arc<dyn DatasetProvider>,
    focus: FocusRing<ComponentId>,
    nav: Nav,
    view: ViewPanel,
    help_overlay: HelpOverlay,
    toasts: ToastManager,
    pane_areas: PaneAreas,
    size: (u16, u16),
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        store: CuratedStore,
        provider: Arc<dyn DatasetProvider>,
        exports_dir: PathBuf,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        Self {
            state: AppState::new(store.dir().to_path_buf(), exports_dir),
            store,
            provider,
            focus: FocusRing::new(vec![ComponentId::Nav, ComponentId::View]),
            nav: Nav::new(),
            view: ViewPanel::new(),
            help_overlay: HelpOverlay::new(),
            toasts: ToastManager::new(),
            pane_areas: PaneAreas::default(),
            size: DEFAULT_SIZE,
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(mut rx) = self.rx.take() else {
            anyhow::bail!("event loop already running");
        };

        self.reload();

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Toast expiry + spinner animation
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg);
                    needs_redraw = true;
                }
                _ = ui_tick.tick() => {
                    if !self.toasts.is_empty() {
                        self.toasts.tick();
                        needs_redraw = true;
                    }
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }

    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(Event::Resize(w, h)) => self.dispatch(Action::Resize(w, h)),
            AppMessage::Event(_) => {}
            AppMessage::Regenerated(result) => {
                self.state.regenerating = false;
                match result {
                    Ok(report) => {
                        self.toasts.resolve_spinner(
                            Severity::Success,
                            format!(
                                "Regenerated: {} tracks, {} artists, {} plays",
                                report.tracks, report.artists, report.plays
                            ),
                        );
                        if !report.missing.is_empty() {
                            self.toasts.warning(format!(
                                "{} raw file(s) were missing and skipped",
                                report.missing.len()
                            ));
                        }
                        self.reload();
                    }
                    Err(e) => {
                        error!("Regeneration failed: {}", e);
                        self.toasts
                            .resolve_spinner(Severity::Error, format!("Regeneration failed: {}", e));
                    }
                }
            }
        }
    }

    /// Load the curated directory, regenerating first if files are missing.
    fn reload(&mut self) {
        match Dashboard::load(&self.store, Some(self.provider.as_ref())) {
            Ok(dashboard) => {
                info!(
                    "Loaded {} track rows, {} artist rows from {}",
                    dashboard.tracks.len(),
                    dashboard.artists.len(),
                    self.store.dir().display()
                );
                if dashboard.regenerated {
                    self.toasts
                        .warning("Curated files were missing and have been regenerated");
                }
                if dashboard.stale.is_empty() {
                    self.toasts.success(format!(
                        "Loaded {} tracks, {} artists",
                        dashboard.tracks.len(),
                        dashboard.artists.len()
                    ));
                } else {
                    self.toasts.warning(format!(
                        "Stale: {} (showing recomputed values)",
                        dashboard.stale.join(", ")
                    ));
                }
                self.state.dashboard = Some(dashboard);
                self.state.load_error = None;
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!("Dashboard load failed: {}", message);
                self.toasts.error("Could not load curated data");
                self.state.dashboard = None;
                self.state.load_error = Some(message);
            }
        }
    }

    fn start_regenerate(&mut self) {
        if self.state.regenerating {
            self.toasts.info("Regeneration already running");
            return;
        }
        self.state.regenerating = true;
        self.toasts.spinner("Regenerating curated files…");

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match tokio::task::spawn_blocking(move || provider.materialize()).await {
                Ok(Ok(report)) => Ok(report),
                Ok(Err(e)) => Err(format!("{:#}", e)),
                Err(e) => Err(format!("regeneration task failed: {}", e)),
            };
            let _ = tx.send(AppMessage::Regenerated(result)).await;
        });
    }

    fn export(&mut self) {
        let (w, h) = self.size;
        match snapshot::export(&self.state, w, h) {
            Ok(path) => self.toasts.success(format!("Exported {}", path.display())),
            Err(e) => {
                error!("Export failed: {:#}", e);
                self.toasts.error(format!("Export failed: {:#}", e));
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            KeyCode::Char('w') => return vec![Action::CycleWindow],
            KeyCode::Char('r') => return vec![Action::Reload],
            KeyCode::Char('R') => return vec![Action::Regenerate],
            KeyCode::Char('e') => return vec![Action::Export],
            KeyCode::Char(c) => {
                if let Some(view) = ViewId::from_number_key(c) {
                    return vec![Action::ShowView(view)];
                }
            }
            _ => {}
        }

        match self.focus.current() {
            Some(ComponentId::Nav) => self.nav.handle_key(key, &self.state),
            Some(ComponentId::View) => self.view.handle_key(key, &self.state),
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.help_overlay.visible {
            return vec![];
        }
        let pos = Position::new(event.column, event.row);
        if self.pane_areas.nav.contains(pos) {
            self.nav.handle_mouse(event, self.pane_areas.nav, &self.state)
        } else if self.pane_areas.view.contains(pos) {
            self.view.handle_mouse(event, self.pane_areas.view, &self.state)
        } else {
            vec![]
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        // Every component sees the action before the App applies it
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.nav.on_action(&action, s));
            out.extend(self.view.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Secondary actions are applied once, not re-broadcast
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),
            Action::ShowView(view) => self.state.view = view,
            Action::CycleWindow => {
                self.state.cycle_window();
                self.toasts
                    .info(format!("Window: {}", self.state.window_label()));
            }
            Action::Reload => self.reload(),
            Action::Regenerate => self.start_regenerate(),
            Action::Export => self.export(),
            Action::ToggleHelp => {}
            Action::Quit => self.should_quit = true,
            Action::Resize(w, h) => self.size = (w, h),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.size = (area.width, area.height);
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let [body, separator, status] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);
        let [nav_area, view_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(NAV_WIDTH), Constraint::Min(0)])
            .areas(body);
        self.pane_areas = PaneAreas {
            nav: nav_area,
            view: view_area,
        };

        let nav_focused = self.focus.is_focused(ComponentId::Nav);
        let view_focused = self.focus.is_focused(ComponentId::View);
        self.nav.draw(frame, nav_area, nav_focused, &self.state);
        self.view.draw(frame, view_area, view_focused, &self.state);

        status_bar::draw_separator(frame, separator);
        status_bar::draw_keys_bar(frame, status, &self.state);

        self.help_overlay.draw(frame, area, false, &self.state);
        self.toasts.draw(frame, area);
    }

    #[cfg(test)]
    fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Take the receiving end of the event channel (tests drive it by hand).
    #[cfg(test)]
    fn take_rx(&mut self) -> Option<mpsc::Receiver<AppMessage>> {
        self.rx.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEventState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wrapped_core::model::TimeRange;

    use crate::test_support::sample_tables;

    /// Writes the sample tables into the curated directory.
    struct SampleProvider {
        store: CuratedStore,
        calls: AtomicUsize,
    }

    impl DatasetProvider for SampleProvider {
        fn materialize(&self) -> anyhow::Result<NormalizeReport> {
            use wrapped_core::stats::{Aggregates, Summary};
            self.calls.fetch_add(1, Ordering::SeqCst);
            let tables = sample_tables();
            let aggregates = Aggregates::compute(&tables);
            let summary = Summary::compute(&tables, &aggregates);
            let written = self.store.write_all(&tables, &aggregates, &summary)?;
            Ok(NormalizeReport {
                tracks: tables.tracks.len(),
                artists: tables.artists.len(),
                plays: tables.plays.len(),
                missing: Vec::new(),
                written,
            })
        }
    }

    struct BrokenProvider;

    impl DatasetProvider for BrokenProvider {
        fn materialize(&self) -> anyhow::Result<NormalizeReport> {
            anyhow::bail!("no raw files found")
        }
    }

    fn key(c: char) -> AppMessage {
        AppMessage::Event(Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn code(code: KeyCode) -> AppMessage {
        AppMessage::Event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn sample_app(dir: &std::path::Path) -> (App, Arc<SampleProvider>) {
        let store = CuratedStore::new(dir.join("curated"));
        let provider = Arc::new(SampleProvider {
            store: store.clone(),
            calls: AtomicUsize::new(0),
        });
        let app = App::new(store, provider.clone(), dir.join("exports"));
        (app, provider)
    }

    #[test]
    fn test_reload_regenerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, provider) = sample_app(dir.path());
        app.reload();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let dashboard = app.state.dashboard.as_ref().unwrap();
        assert!(dashboard.regenerated);
        assert!(dashboard.stale.is_empty());
        assert!(app.state.load_error.is_none());

        // files exist now; no second regeneration
        app.handle_message(key('r'));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(!app.state.dashboard.as_ref().unwrap().regenerated);
    }

    #[test]
    fn test_failed_provider_sets_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            CuratedStore::new(dir.path().join("curated")),
            Arc::new(BrokenProvider),
            dir.path().join("exports"),
        );
        app.reload();
        assert!(app.state.dashboard.is_none());
        let err = app.state.load_error.as_deref().unwrap();
        assert!(err.contains("no raw files found"));
    }

    #[test]
    fn test_number_keys_and_window_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = sample_app(dir.path());
        app.reload();

        app.handle_message(key('3'));
        assert_eq!(app.state.view, ViewId::TopArtists);
        assert_eq!(app.nav.cursor(), Some(ViewId::TopArtists));

        app.handle_message(key('w'));
        assert_eq!(app.state.window, Some(TimeRange::ShortTerm));

        app.handle_message(key('9'));
        assert_eq!(app.state.view, ViewId::TopArtists);
    }

    #[test]
    fn test_nav_moves_preview_views_and_focus_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = sample_app(dir.path());
        app.reload();
        assert!(app.focus.is_focused(ComponentId::Nav));

        app.handle_message(code(KeyCode::Down));
        assert_eq!(app.state.view, ViewId::TopTracks);

        app.handle_message(code(KeyCode::Enter));
        assert!(app.focus.is_focused(ComponentId::View));

        app.handle_message(key('j'));
        assert_eq!(app.view.tracks.selected(), Some(1));

        app.handle_message(code(KeyCode::Tab));
        assert!(app.focus.is_focused(ComponentId::Nav));
    }

    #[test]
    fn test_help_overlay_swallows_quit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = sample_app(dir.path());

        app.handle_message(key('?'));
        assert!(app.help_overlay.visible);
        app.handle_message(key('3'));
        assert_eq!(app.state.view, ViewId::Overview);
        app.handle_message(key('q'));
        assert!(!app.help_overlay.visible);
        assert!(!app.should_quit());

        app.handle_message(key('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_export_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = sample_app(dir.path());
        app.reload();
        app.handle_message(key('4'));
        app.handle_message(key('e'));

        let exported: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(exported.len(), 1);
        assert!(exported[0].starts_with("wrapped-genres-"));
    }

    #[tokio::test]
    async fn test_regenerate_reports_back() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, provider) = sample_app(dir.path());
        let mut rx = app.take_rx().unwrap();

        app.handle_message(key('R'));
        assert!(app.state.regenerating);
        // a second request while running is ignored
        app.handle_message(key('R'));

        let msg = rx.recv().await.unwrap();
        app.handle_message(msg);
        assert!(!app.state.regenerating);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(app.state.dashboard.is_some());
    }
}
