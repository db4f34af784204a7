pub mod banner;
pub mod chrome;
pub mod result_view;
pub mod selector;
pub mod status_bar;
pub mod tabs;
pub mod text_input;

use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, theme: &Theme);
    /// Returns true when the key was consumed.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        let _ = key;
        false
    }
}
