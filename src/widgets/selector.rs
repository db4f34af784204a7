use super::chrome::panel_block;
use super::Widget;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState};

/// Drop-down replacement: index 0 is always the placeholder entry, followed by
/// the options in the order they were supplied.
pub struct Selector {
    title: &'static str,
    placeholder: String,
    options: Vec<String>,
    state: ListState,
}

impl Selector {
    pub fn new(title: &'static str, placeholder: &str) -> Self {
        Self {
            title,
            placeholder: placeholder.to_string(),
            options: Vec::new(),
            state: ListState::default().with_selected(Some(0)),
        }
    }

    /// Replace all options and reset the selection to the placeholder.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        self.state = ListState::default().with_selected(Some(0));
    }

    /// Placeholder plus options, as displayed.
    pub fn entries(&self) -> Vec<&str> {
        std::iter::once(self.placeholder.as_str())
            .chain(self.options.iter().map(String::as_str))
            .collect()
    }

    fn index(&self) -> usize {
        self.state.selected().unwrap_or(0)
    }

    /// The chosen option; `None` while the placeholder is selected.
    pub fn selected(&self) -> Option<&str> {
        match self.index() {
            0 => None,
            i => self.options.get(i - 1).map(String::as_str),
        }
    }

    #[cfg(test)]
    pub fn select(&mut self, name: &str) -> bool {
        match self.options.iter().position(|o| o == name) {
            Some(i) => {
                self.state.select(Some(i + 1));
                true
            }
            None => false,
        }
    }

    fn move_by(&mut self, delta: isize) {
        let len = self.options.len() + 1;
        let next = (self.index() as isize + delta).clamp(0, len as isize - 1);
        self.state.select(Some(next as usize));
    }
}

impl Widget for Selector {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let items: Vec<ListItem> = self
            .entries()
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                if i == 0 {
                    ListItem::new(Line::from(Span::styled(format!("-- {s} --"), theme.text_muted())))
                } else {
                    ListItem::new(s.to_string())
                }
            })
            .collect();
        let highlight = if focused {
            theme.list_cursor_style()
        } else {
            theme.text_active_bold()
        };
        let list = List::new(items)
            .block(panel_block(self.title, focused, theme))
            .highlight_style(highlight)
            .highlight_symbol("> ");
        f.render_stateful_widget(list, area, &mut self.state);
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::PageUp => self.move_by(-10),
            KeyCode::PageDown => self.move_by(10),
            KeyCode::Home => self.state.select(Some(0)),
            KeyCode::End => self.state.select(Some(self.options.len())),
            _ => return false,
        }
        true
    }
}
