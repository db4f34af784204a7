//! Embedded-database panel: upload a database file, browse tables, run SQL.

use super::session::{EmbeddedPhase, ValidationError};
use super::{Deferred, Effect, ViewerApp};
use crate::model::Panel;
use crate::render::document::{rows_doc, statement_doc, table_info_doc, QUERY_OK};
use crate::services::api::{ApiCall, ApiReply, UploadResponse};
use crate::services::http_client::RequestError;
use crate::viewer_core::registry::WidgetId;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static DB_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(db|duckdb)$").expect("literal pattern"));

pub(crate) fn is_database_file(path: &str) -> bool {
    DB_FILE_RE.is_match(path.trim())
}

/// Strip the quoting terminals add around dropped paths. `file://` URIs are
/// percent-decoded; bare paths are taken as-is.
pub(crate) fn clean_dropped_path(raw: &str) -> String {
    let first = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let quote = |c: char| c == '\'' || c == '"';
    let t = first.trim().trim_matches(quote);
    match t.strip_prefix("file://") {
        Some(uri) => {
            let uri = uri.trim_matches(quote);
            urlencoding::decode(uri)
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| uri.to_string())
        }
        None => t.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn refresh_status(app: &mut ViewerApp, upload: Option<(&Path, &UploadResponse)>) {
    let loaded = app.state.embedded_loaded;
    let text = match (loaded, upload) {
        (true, Some((path, resp))) => {
            let name = resp.filename.clone().unwrap_or_else(|| file_name(path));
            format!("Loaded {name} ({} tables)", resp.tables_count)
        }
        (true, None) => "Database loaded".to_string(),
        (false, _) => "No database loaded".to_string(),
    };
    if let Some(s) = &mut app.elements.embedded_status {
        s.set(loaded, text);
    }
}

pub fn upload_file(app: &mut ViewerApp) -> Vec<Effect> {
    let path = app
        .elements
        .input_text(WidgetId::FileInput)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if path.is_empty() {
        app.show_validation(ValidationError::NoFile);
        return Vec::new();
    }
    if !is_database_file(&path) {
        app.show_validation(ValidationError::BadExtension(path));
        return Vec::new();
    }
    app.supersede_followup(Panel::Embedded);
    app.embedded_phase = EmbeddedPhase::Uploading;
    vec![app.begin_request(ApiCall::Upload {
        file: PathBuf::from(path),
    })]
}

/// A path pasted (dropped) onto the upload area.
pub fn drop_path(app: &mut ViewerApp, raw: &str) -> Vec<Effect> {
    let path = clean_dropped_path(raw);
    if path.is_empty() {
        return Vec::new();
    }
    if !is_database_file(&path) {
        app.show_validation(ValidationError::BadExtension(path));
        return Vec::new();
    }
    let Some(input) = app.elements.file_input.as_mut() else {
        return Vec::new();
    };
    input.set_text(&path);
    upload_file(app)
}

pub fn load_tables(app: &mut ViewerApp) -> Vec<Effect> {
    if !app.state.embedded_loaded {
        app.show_validation(ValidationError::NoDatabase);
        return Vec::new();
    }
    vec![app.begin_request(ApiCall::ListTables)]
}

pub fn view_table_info(app: &mut ViewerApp) -> Vec<Effect> {
    let Some(name) = app.elements.selected_table() else {
        app.show_validation(ValidationError::NoTableSelected);
        return Vec::new();
    };
    if !app.state.embedded_loaded {
        app.show_validation(ValidationError::NoDatabase);
        return Vec::new();
    }
    app.supersede_followup(Panel::Embedded);
    vec![app.begin_request(ApiCall::TableInfo { name })]
}

pub fn view_table_data(app: &mut ViewerApp) -> Vec<Effect> {
    let Some(name) = app.elements.selected_table() else {
        app.show_validation(ValidationError::NoTableSelected);
        return Vec::new();
    };
    app.supersede_followup(Panel::Embedded);
    let limit = app.config.row_limit;
    vec![app.begin_request(ApiCall::TableData { name, limit })]
}

pub fn execute_query(app: &mut ViewerApp) -> Vec<Effect> {
    let sql = app
        .elements
        .input_text(WidgetId::SqlInput)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if sql.is_empty() {
        app.show_validation(ValidationError::EmptyQuery);
        return Vec::new();
    }
    if !app.state.embedded_loaded {
        app.show_validation(ValidationError::NoDatabase);
        return Vec::new();
    }
    app.supersede_followup(Panel::Embedded);
    vec![app.begin_request(ApiCall::Query { sql })]
}

pub fn clear_results(app: &mut ViewerApp) {
    if let Some(r) = &mut app.elements.embedded_results {
        r.clear();
    }
    app.dbg("embedded results cleared");
}

pub(crate) fn on_reply(
    app: &mut ViewerApp,
    call: ApiCall,
    outcome: Result<ApiReply, RequestError>,
) -> Vec<Effect> {
    match (call, outcome) {
        (ApiCall::Upload { file }, Ok(ApiReply::Uploaded(resp))) => {
            app.state.embedded_loaded = true;
            app.embedded_phase = EmbeddedPhase::Loaded;
            refresh_status(app, Some((&file, &resp)));
            app.show_success(format!(
                "File uploaded, {} tables found",
                resp.tables_count
            ));
            tracing::info!(file = %file.display(), tables = resp.tables_count, "database uploaded");
            app.schedule_followup(Deferred::LoadTables);
        }
        (ApiCall::Upload { .. }, Err(e)) => {
            app.state.embedded_loaded = false;
            app.embedded_phase = EmbeddedPhase::Empty;
            refresh_status(app, None);
            app.show_error(format!("Upload failed: {e}"));
        }
        (ApiCall::ListTables, Ok(ApiReply::Tables(resp))) => {
            let n = resp.tables.len();
            if let Some(sel) = &mut app.elements.table_select {
                sel.set_options(resp.tables);
            }
            if n == 0 {
                app.show_validation(ValidationError::NoTables);
            } else {
                app.embedded_phase = EmbeddedPhase::TablesLoaded;
                app.dbg(format!("loaded {n} tables"));
            }
        }
        (ApiCall::ListTables, Err(e)) => app.show_error(format!("Failed to load tables: {e}")),
        (ApiCall::TableInfo { .. }, Ok(ApiReply::TableInfo(info))) => {
            app.embedded_phase = EmbeddedPhase::DataShown;
            if let Some(r) = &mut app.elements.embedded_results {
                r.set(table_info_doc(&info));
            }
        }
        (ApiCall::TableInfo { .. }, Err(e)) => {
            app.show_error(format!("Failed to load table info: {e}"))
        }
        (ApiCall::TableData { name, .. }, Ok(ApiReply::TableData(resp))) => {
            app.embedded_phase = EmbeddedPhase::DataShown;
            if let Some(r) = &mut app.elements.embedded_results {
                r.set(rows_doc(
                    &format!("Table data: {name}"),
                    &resp.data,
                    resp.total_count,
                ));
            }
        }
        (ApiCall::TableData { .. }, Err(e)) => {
            app.show_error(format!("Failed to load table data: {e}"))
        }
        (ApiCall::Query { .. }, Ok(ApiReply::Query(resp))) => {
            app.embedded_phase = EmbeddedPhase::QueryResultShown;
            match &resp.data {
                Some(rows) => {
                    let doc = rows_doc("SQL query result", rows, resp.returned_count);
                    if let Some(r) = &mut app.elements.embedded_results {
                        r.set(doc);
                    }
                }
                None => {
                    app.show_success(resp.message.clone().unwrap_or_else(|| QUERY_OK.to_string()));
                    if let Some(r) = &mut app.elements.embedded_results {
                        r.set(statement_doc(&resp));
                    }
                }
            }
        }
        (ApiCall::Query { .. }, Err(e)) => app.show_error(format!("Query failed: {e}")),
        (call, Ok(reply)) => {
            app.dbg(format!("{}: mismatched reply {reply:?}", call.label()));
        }
        (_, Err(e)) => app.show_error(e.to_string()),
    }
    Vec::new()
}
