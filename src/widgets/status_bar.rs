use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

/// Shared loading indicator. Show and hide are not counted, so the first
/// completion among overlapping requests hides it.
#[derive(Clone, Debug, Default)]
pub struct LoadingIndicator {
    visible: bool,
}

impl LoadingIndicator {
    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Per-panel connection line, e.g. "Connected to localhost:19530".
#[derive(Clone, Debug, Default)]
pub struct ConnectionStatus {
    text: String,
    ok: bool,
}

impl ConnectionStatus {
    pub fn set(&mut self, ok: bool, text: impl Into<String>) {
        self.ok = ok;
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

pub fn draw_connection_status(f: &mut Frame, area: Rect, status: &ConnectionStatus, theme: &Theme) {
    let (dot, style) = if status.is_ok() {
        ("●", theme.text_success())
    } else {
        ("○", theme.text_error())
    };
    let text = match status.text() {
        "" => "unknown",
        t => t,
    };
    let line = Line::from(vec![
        Span::styled(format!("{dot} "), style),
        Span::styled(text, style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

pub fn draw_footer(
    f: &mut Frame,
    area: Rect,
    loading: Option<&LoadingIndicator>,
    focus_label: Option<&str>,
    help_text: &str,
    tick: u64,
    theme: &Theme,
) {
    let mut spans: Vec<Span> = Vec::new();
    if loading.is_some_and(LoadingIndicator::is_visible) {
        let spinner = SPINNER[tick as usize % SPINNER.len()];
        spans.push(Span::styled(
            format!(" {spinner} loading...  |  "),
            theme.text_active_bold(),
        ));
    }
    if let Some(label) = focus_label {
        spans.push(Span::styled(
            format!("focus: {label}  |  "),
            Style::default().fg(Color::Magenta),
        ));
    }
    spans.push(Span::styled(help_text, theme.text_muted()));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
