//! Result container for one panel: holds the last rendered [`ResultDoc`] and
//! draws it as summary lines followed by a scrollable table.

use super::chrome::panel_block;
use super::Widget;
use crate::render::{CellValue, DocBlock, ResultDoc, TableData};
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};

const MAX_COL_WIDTH: usize = 40;

pub struct ResultPane {
    title: &'static str,
    doc: Option<ResultDoc>,
    scroll_row: usize,
    scroll_col: usize,
    // Enter toggles a full-text view of the top visible row.
    detail: bool,
    viewport_h: usize,
}

impl ResultPane {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            doc: None,
            scroll_row: 0,
            scroll_col: 0,
            detail: false,
            viewport_h: 0,
        }
    }

    pub fn set(&mut self, doc: ResultDoc) {
        self.doc = Some(doc);
        self.scroll_row = 0;
        self.scroll_col = 0;
        self.detail = false;
    }

    pub fn clear(&mut self) {
        self.doc = None;
        self.scroll_row = 0;
        self.scroll_col = 0;
        self.detail = false;
    }

    pub fn doc(&self) -> Option<&ResultDoc> {
        self.doc.as_ref()
    }

    fn row_count(&self) -> usize {
        self.doc
            .as_ref()
            .and_then(|d| d.table())
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    fn col_count(&self) -> usize {
        self.doc
            .as_ref()
            .and_then(|d| d.table())
            .map(|t| t.columns.len())
            .unwrap_or(0)
    }
}

fn prelude_lines<'a>(doc: &'a ResultDoc, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(doc.title.as_str(), theme.header_style()))];
    for block in &doc.blocks {
        match block {
            DocBlock::Summary(s) => lines.push(Line::raw(s.as_str())),
            DocBlock::Facts(items) => {
                let mut spans = Vec::new();
                for (k, v) in items {
                    spans.push(Span::styled(format!("{k}: "), theme.text_active_bold()));
                    spans.push(Span::raw(format!("{v}   ")));
                }
                lines.push(Line::from(spans));
            }
            DocBlock::Heading(h) => lines.push(Line::from(Span::styled(
                h.as_str(),
                theme.text_active_bold().add_modifier(Modifier::UNDERLINED),
            ))),
            DocBlock::NoData(s) => lines.push(Line::from(Span::styled(s.as_str(), theme.text_muted()))),
            DocBlock::Success(s) => lines.push(Line::from(Span::styled(s.as_str(), theme.text_success()))),
            DocBlock::Table(_) => {}
        }
    }
    lines
}

fn styled_cell<'a>(cell: &'a CellValue, theme: &Theme) -> Cell<'a> {
    match cell {
        CellValue::Null => Cell::from(Span::styled(
            cell.display_text(),
            theme.text_muted().add_modifier(Modifier::ITALIC),
        )),
        CellValue::Json(_) => Cell::from(Span::styled(cell.display_text(), Style::default().fg(theme.primary))),
        CellValue::Truncated { .. } => Cell::from(Span::styled(
            cell.display_text(),
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
        CellValue::Plain(s) => Cell::from(s.as_str()),
    }
}

fn column_widths(table: &TableData, skip: usize) -> Vec<Constraint> {
    table
        .columns
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, name)| {
            let widest = table
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.display_text().chars().count())
                .max()
                .unwrap_or(0)
                .max(name.chars().count());
            Constraint::Length(widest.clamp(4, MAX_COL_WIDTH) as u16)
        })
        .collect()
}

fn detail_lines<'a>(table: &'a TableData, row: usize, theme: &Theme) -> Vec<Line<'a>> {
    let Some(cells) = table.rows.get(row) else {
        return Vec::new();
    };
    table
        .columns
        .iter()
        .zip(cells)
        .map(|(name, cell)| {
            Line::from(vec![
                Span::styled(format!("{name}: "), theme.text_active_bold()),
                Span::raw(cell.full_text()),
            ])
        })
        .collect()
}

impl Widget for ResultPane {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let block = panel_block(self.title, focused, theme);
        let inner = block.inner(area);
        f.render_widget(block, area);
        let Some(doc) = &self.doc else {
            f.render_widget(
                Paragraph::new(Span::styled("No results yet", theme.text_muted())),
                inner,
            );
            return;
        };
        let prelude = prelude_lines(doc, theme);
        let prelude_h = (prelude.len() as u16).min(inner.height);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(prelude_h), Constraint::Min(0)])
            .split(inner);
        f.render_widget(Paragraph::new(prelude).wrap(Wrap { trim: true }), chunks[0]);

        let Some(table) = doc.table() else {
            return;
        };
        self.viewport_h = chunks[1].height.saturating_sub(1) as usize;
        if self.detail {
            let p = Paragraph::new(detail_lines(table, self.scroll_row, theme))
                .block(ratatui::widgets::Block::default().title(format!(" row {} ", self.scroll_row + 1)))
                .wrap(Wrap { trim: false });
            f.render_widget(p, chunks[1]);
            return;
        }
        let skip = self.scroll_col;
        let header = Row::new(
            table
                .columns
                .iter()
                .skip(skip)
                .map(|c| Cell::from(c.as_str())),
        )
        .style(theme.text_active_bold());
        let rows: Vec<Row> = table
            .rows
            .iter()
            .skip(self.scroll_row)
            .take(self.viewport_h.max(1))
            .map(|r| Row::new(r.iter().skip(skip).map(|c| styled_cell(c, theme))))
            .collect();
        let t = Table::new(rows, column_widths(table, skip))
            .header(header)
            .column_spacing(2);
        f.render_widget(t, chunks[1]);
    }

    fn on_key(&mut self, key: KeyEvent) -> bool {
        let rows = self.row_count();
        let last_row = rows.saturating_sub(1);
        let page = self.viewport_h.max(1);
        match key.code {
            KeyCode::Up => self.scroll_row = self.scroll_row.saturating_sub(1),
            KeyCode::Down => self.scroll_row = (self.scroll_row + 1).min(last_row),
            KeyCode::PageUp => self.scroll_row = self.scroll_row.saturating_sub(page),
            KeyCode::PageDown => self.scroll_row = (self.scroll_row + page).min(last_row),
            KeyCode::Home => self.scroll_row = 0,
            KeyCode::End => self.scroll_row = last_row,
            KeyCode::Left => self.scroll_col = self.scroll_col.saturating_sub(1),
            KeyCode::Right => {
                self.scroll_col = (self.scroll_col + 1).min(self.col_count().saturating_sub(1))
            }
            KeyCode::Enter | KeyCode::Char(' ') if rows > 0 => self.detail = !self.detail,
            _ => return false,
        }
        true
    }
}
