//! Toast notifications: transient status lines in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};
use crate::widgets::text::truncate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn color(self) -> Color {
        match self {
            Self::Info => C_TOAST_INFO,
            Self::Success => C_TOAST_SUCCESS,
            Self::Warning => C_TOAST_WARNING,
            Self::Error => C_TOAST_ERROR,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    fn lifetime(self) -> Duration {
        match self {
            Self::Info | Self::Success => Duration::from_secs(3),
            Self::Warning => Duration::from_secs(4),
            Self::Error => Duration::from_secs(6),
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    /// Message and animation frame of the running spinner.
    spinner: Option<(String, usize)>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 4,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        self.push_at(message.into(), severity, Instant::now());
    }

    fn push_at(&mut self, message: String, severity: Severity, now: Instant) {
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: now + severity.lifetime(),
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error);
    }

    /// Persistent toast that animates on `tick()` until resolved.
    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some((message.into(), 0));
    }

    /// Replace the spinner with a normal expiring toast.
    pub fn resolve_spinner(&mut self, severity: Severity, message: impl Into<String>) {
        self.spinner = None;
        self.push(message, severity);
    }

    /// Drop expired toasts and advance the spinner. Call each UI tick.
    pub fn tick(&mut self) {
        self.expire(Instant::now());
        if let Some((_, frame)) = self.spinner.as_mut() {
            *frame = (*frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires > now);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    #[cfg(test)]
    fn messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    /// Spinner on the top row, newest toasts below it.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(30, 60).min(area.width);
        let bottom = area.y + area.height;
        let mut y = area.y + 1;

        if let Some((message, f)) = &self.spinner {
            let icon = SPINNER_FRAMES[f % SPINNER_FRAMES.len()];
            draw_line(frame, area, y, max_width, icon, message, C_TOAST_INFO);
            y += 1;
        }

        for toast in self.toasts.iter().rev().take(self.max_visible) {
            if y >= bottom {
                break;
            }
            draw_line(
                frame,
                area,
                y,
                max_width,
                toast.severity.icon(),
                &toast.message,
                toast.severity.color(),
            );
            y += 1;
        }
    }
}

fn draw_line(
    frame: &mut Frame,
    area: Rect,
    y: u16,
    max_width: u16,
    icon: &str,
    message: &str,
    color: Color,
) {
    if y >= area.y + area.height {
        return;
    }
    let message = truncate(message, (max_width as usize).saturating_sub(4));
    let w = (message.width() as u16 + 4).min(max_width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(w + 1),
        y,
        width: w,
        height: 1,
    };
    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {} {} ", icon, message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))),
        toast_area,
    );
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_and_expire() {
        let mut toasts = ToastManager::new();
        let now = Instant::now();
        toasts.push_at("loaded".into(), Severity::Success, now);
        toasts.push_at("loaded".into(), Severity::Success, now);
        toasts.push_at("broken".into(), Severity::Error, now);
        assert_eq!(toasts.messages().collect::<Vec<_>>(), vec!["loaded", "broken"]);

        toasts.expire(now + Duration::from_secs(4));
        assert_eq!(toasts.messages().collect::<Vec<_>>(), vec!["broken"]);
        toasts.expire(now + Duration::from_secs(10));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_spinner_resolves_into_toast() {
        let mut toasts = ToastManager::new();
        toasts.spinner("Regenerating");
        toasts.tick();
        assert!(!toasts.is_empty());
        toasts.resolve_spinner(Severity::Success, "Regenerated");
        assert_eq!(toasts.messages().collect::<Vec<_>>(), vec!["Regenerated"]);
    }

    #[test]
    fn test_queue_is_capped() {
        let mut toasts = ToastManager::new();
        for i in 0..20 {
            toasts.info(format!("msg {}", i));
        }
        assert_eq!(toasts.messages().count(), 8);
    }
}
