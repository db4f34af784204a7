//! Global key chords and button activation.

use super::Action;
use crate::model::Panel;
use crate::viewer_core::registry::WidgetId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Ctrl, Cmd (reported as SUPER) and META are treated alike.
pub fn is_primary(mods: KeyModifiers) -> bool {
    mods.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META)
}

/// Chords handled before the focused widget sees the key.
pub fn match_shortcut(key: &KeyEvent, focus: Option<WidgetId>) -> Option<Action> {
    let primary = is_primary(key.modifiers);
    let in_sql = focus == Some(WidgetId::SqlInput);
    match key.code {
        KeyCode::F(1) => Some(Action::ShowPanel(Panel::Vector)),
        KeyCode::F(2) => Some(Action::ShowPanel(Panel::Embedded)),
        KeyCode::Char('1') if primary => Some(Action::ShowPanel(Panel::Vector)),
        KeyCode::Char('2') if primary => Some(Action::ShowPanel(Panel::Embedded)),
        KeyCode::Esc => Some(Action::DismissBanners),
        KeyCode::Enter if primary && in_sql => Some(Action::ExecuteQuery),
        // Terminals without key disambiguation report Ctrl+Enter as Ctrl+J.
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) && in_sql => {
            Some(Action::ExecuteQuery)
        }
        KeyCode::Char('s') if primary => Some(Action::ExportResult),
        KeyCode::Char('y') if primary => Some(Action::CopyResult),
        KeyCode::Char('q') if primary => Some(Action::Quit),
        KeyCode::Char('q')
            if key.modifiers.is_empty() && !focus.is_some_and(WidgetId::is_text_input) =>
        {
            Some(Action::Quit)
        }
        _ => None,
    }
}

fn button_action(id: WidgetId) -> Option<Action> {
    Some(match id {
        WidgetId::ConnectButton => Action::Connect,
        WidgetId::LoadCollectionsButton => Action::LoadCollections,
        WidgetId::CollectionInfoButton => Action::ViewCollectionInfo,
        WidgetId::CollectionDataButton => Action::ViewCollectionData,
        WidgetId::UploadButton | WidgetId::UploadArea => Action::UploadFile,
        WidgetId::LoadTablesButton => Action::LoadTables,
        WidgetId::TableInfoButton => Action::ViewTableInfo,
        WidgetId::TableDataButton => Action::ViewTableData,
        WidgetId::ExecuteButton => Action::ExecuteQuery,
        WidgetId::ClearButton => Action::ClearResults,
        _ => return None,
    })
}

/// What a key the focused widget left unconsumed does, if anything.
pub fn activation(id: WidgetId, key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => match id {
            WidgetId::VectorHost | WidgetId::VectorPort => Some(Action::Connect),
            WidgetId::FileInput => Some(Action::UploadFile),
            WidgetId::CollectionSelect => Some(Action::ViewCollectionData),
            WidgetId::TableSelect => Some(Action::ViewTableData),
            other => button_action(other),
        },
        KeyCode::Char(' ') if id.is_button() => button_action(id),
        _ => None,
    }
}
