use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

pub fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let b = Block::default().borders(Borders::ALL).title(title);
    if focused {
        b.border_style(theme.border_focused())
    } else {
        b.border_style(theme.border_unfocused())
    }
}

/// One-line button: `[ Label ]`, inverted while focused.
pub fn draw_button(f: &mut Frame, area: Rect, label: &str, focused: bool, theme: &Theme) {
    let style = if focused {
        theme.list_cursor_style()
    } else {
        theme.text_active_bold()
    };
    let p = Paragraph::new(Line::from(Span::styled(format!("[ {label} ]"), style)));
    f.render_widget(p, area);
}

pub fn button_width(label: &str) -> u16 {
    label.chars().count() as u16 + 4
}
