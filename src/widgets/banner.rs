use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

/// Transient message strip that hides itself once its tick deadline passes.
#[derive(Clone, Debug)]
pub struct Banner {
    kind: BannerKind,
    message: Option<String>,
    expires_at: u64,
}

impl Banner {
    pub fn new(kind: BannerKind) -> Self {
        Self {
            kind,
            message: None,
            expires_at: 0,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, now: u64, ttl_ticks: u64) {
        self.message = Some(message.into());
        self.expires_at = now.saturating_add(ttl_ticks);
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    /// Hide the banner once `now` reaches its deadline.
    pub fn expire(&mut self, now: u64) {
        if self.message.is_some() && now >= self.expires_at {
            self.message = None;
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}

pub fn draw_banner(f: &mut Frame, area: Rect, banner: &Banner, theme: &Theme) {
    let Some(msg) = banner.message() else {
        return;
    };
    let (tag, color) = match banner.kind {
        BannerKind::Error => ("[ERROR]", theme.error),
        BannerKind::Success => ("[OK]", theme.success),
    };
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(color));
    let line = Line::from(vec![
        Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(msg, Style::default().fg(color)),
        Span::styled("  (Esc to dismiss)", theme.text_muted()),
    ]);
    f.render_widget(
        Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
