use super::chrome::panel_block;
use super::Widget;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use tui_textarea::TextArea;

/// Editable text field backed by `tui-textarea`. Single-line inputs refuse
/// newlines so Enter stays available to the surrounding form.
pub struct TextInput {
    title: &'static str,
    multiline: bool,
    area: TextArea<'static>,
}

impl TextInput {
    pub fn single(title: &'static str) -> Self {
        Self {
            title,
            multiline: false,
            area: TextArea::default(),
        }
    }

    pub fn multi(title: &'static str) -> Self {
        Self {
            title,
            multiline: true,
            area: TextArea::default(),
        }
    }

    pub fn text(&self) -> String {
        self.area.lines().join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        let lines: Vec<String> = if self.multiline {
            text.lines().map(str::to_string).collect()
        } else {
            vec![text.replace(['\r', '\n'], " ")]
        };
        self.area = TextArea::new(lines);
        self.area.move_cursor(tui_textarea::CursorMove::End);
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.area = TextArea::default();
    }

    pub fn insert_str(&mut self, text: &str) {
        if self.multiline {
            self.area.insert_str(text);
        } else {
            self.area.insert_str(text.replace(['\r', '\n'], " "));
        }
    }
}

impl Widget for TextInput {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        self.area
            .set_block(panel_block(self.title, focused, theme));
        self.area.set_cursor_line_style(Style::default());
        let cursor = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.area.set_cursor_style(cursor);
        f.render_widget(&self.area, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => false,
            KeyCode::Enter if !self.multiline => false,
            KeyCode::Enter if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META) => false,
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => false,
            _ => {
                self.area.input(key);
                true
            }
        }
    }
}
