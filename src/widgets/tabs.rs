use crate::model::Panel;
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Tabs};

pub const PANELS: [Panel; 2] = [Panel::Vector, Panel::Embedded];

/// Panel switcher: `[F1] Vector DB │ [F2] Embedded DB`.
pub fn draw_panel_tabs(f: &mut Frame, area: Rect, active: Panel, theme: &Theme) {
    let titles: Vec<Line> = PANELS
        .iter()
        .enumerate()
        .map(|(i, panel)| {
            let is_selected = *panel == active;
            let text_style = if is_selected {
                Style::default()
                    .fg(theme.selected)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            let key_style = if is_selected {
                theme.text_active_bold()
            } else {
                Style::default().fg(theme.muted)
            };
            Line::from(vec![
                Span::styled("[", Style::default().fg(theme.frame)),
                Span::styled(format!("F{}", i + 1), key_style),
                Span::styled("]", Style::default().fg(theme.frame)),
                Span::raw(" "),
                Span::styled(panel.title(), text_style),
            ])
        })
        .collect();
    let selected = PANELS.iter().position(|p| *p == active).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme.fg))
        .highlight_style(
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled(" │ ", Style::default().fg(theme.frame)))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.frame)),
        );
    f.render_widget(tabs, area);
}
