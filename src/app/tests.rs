use super::*;
use crate::services::api::{
    CollectionsResponse, DataResponse, HealthResponse, QueryResponse, TablesResponse,
    UploadResponse,
};
use crate::render::DocBlock;
use crossterm::event::{KeyEventState, KeyModifiers};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;

fn app() -> ViewerApp {
    ViewerApp::new(AppConfig::default())
}

fn requests(effects: &[Effect]) -> Vec<ApiCall> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Request(c) => Some(c.clone()),
            _ => None,
        })
        .collect()
}

fn error(app: &ViewerApp) -> Option<String> {
    app.elements
        .error_banner
        .as_ref()
        .and_then(|b| b.message())
        .map(str::to_string)
}

fn success(app: &ViewerApp) -> Option<String> {
    app.elements
        .success_banner
        .as_ref()
        .and_then(|b| b.message())
        .map(str::to_string)
}

fn ticks(app: &mut ViewerApp, n: u64) -> Vec<Effect> {
    let mut out = Vec::new();
    for _ in 0..n {
        out.extend(update(app, AppMsg::Tick));
    }
    out
}

fn reply(app: &mut ViewerApp, call: ApiCall, outcome: Result<ApiReply, RequestError>) -> Vec<Effect> {
    update(app, AppMsg::Loaded { call, outcome })
}

fn press(app: &mut ViewerApp, code: KeyCode, mods: KeyModifiers) -> Vec<Effect> {
    update(app, AppMsg::Key(KeyEvent::new(code, mods)))
}

fn set_input(app: &mut ViewerApp, id: WidgetId, text: &str) {
    app.elements.input_mut(id).unwrap().set_text(text);
}

fn loaded_db(app: &mut ViewerApp) {
    app.state.embedded_loaded = true;
    app.embedded_phase = EmbeddedPhase::Loaded;
}

fn rows(v: serde_json::Value) -> Vec<crate::services::api::Row> {
    serde_json::from_value(v).unwrap()
}

#[test]
fn startup_requests_health_without_loading_indicator() {
    let mut app = app();
    let effects = app.startup();
    assert_eq!(requests(&effects), vec![ApiCall::Health]);
    assert!(!app.is_loading());
}

#[test]
fn health_seeds_flags_and_status_lines() {
    let mut app = app();
    reply(
        &mut app,
        ApiCall::Health,
        Ok(ApiReply::Health(HealthResponse {
            status: Some("healthy".into()),
            milvus_connected: true,
            duckdb_loaded: false,
        })),
    );
    assert!(app.state.vector_connected);
    assert!(!app.state.embedded_loaded);
    assert_eq!(app.vector_phase, VectorPhase::Connected);
    assert_eq!(app.elements.vector_status.as_ref().unwrap().text(), "Connected");
    assert_eq!(
        app.elements.embedded_status.as_ref().unwrap().text(),
        "No database loaded"
    );
}

#[test]
fn failed_health_check_shows_no_banner() {
    let mut app = app();
    reply(
        &mut app,
        ApiCall::Health,
        Err(RequestError::Transport("connection refused".into())),
    );
    assert_eq!(error(&app), None);
    assert!(!app.state.vector_connected);
}

#[test]
fn connect_with_empty_fields_uses_defaults() {
    let mut app = app();
    set_input(&mut app, WidgetId::VectorHost, "");
    set_input(&mut app, WidgetId::VectorPort, "");
    let effects = update(&mut app, AppMsg::Action(Action::Connect));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::Connect {
            host: "localhost".into(),
            port: 19530
        }]
    );
    assert!(app.is_loading());
    assert!(app.state.request_in_flight);
    assert_eq!(app.vector_phase, VectorPhase::Connecting);
}

#[test]
fn connect_with_hidden_inputs_uses_defaults() {
    let cfg = AppConfig {
        hidden_widgets: vec!["vector-host".into(), "vector-port".into()],
        default_host: "milvus".into(),
        ..Default::default()
    };
    let mut app = ViewerApp::new(cfg);
    let effects = update(&mut app, AppMsg::Action(Action::Connect));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::Connect {
            host: "milvus".into(),
            port: 19530
        }]
    );
}

#[test]
fn connect_success_schedules_collection_load_and_populates_selector() {
    let mut app = app();
    set_input(&mut app, WidgetId::VectorHost, "db.local");
    set_input(&mut app, WidgetId::VectorPort, "19531");
    let effects = update(&mut app, AppMsg::Action(Action::Connect));
    let call = requests(&effects).remove(0);

    let effects = reply(&mut app, call, Ok(ApiReply::Connected(json!({"status": "success"}))));
    assert!(effects.is_empty());
    assert!(app.state.vector_connected);
    assert!(!app.is_loading());
    assert_eq!(success(&app).as_deref(), Some("Connected to the vector database"));
    assert_eq!(
        app.elements.vector_status.as_ref().unwrap().text(),
        "Connected to db.local:19531"
    );
    assert!(app.followup_pending(Panel::Vector));

    // 1000 ms is five ticks.
    assert!(ticks(&mut app, 4).is_empty());
    let effects = ticks(&mut app, 1);
    assert_eq!(requests(&effects), vec![ApiCall::ListCollections]);
    assert!(!app.followup_pending(Panel::Vector));

    reply(
        &mut app,
        ApiCall::ListCollections,
        Ok(ApiReply::Collections(CollectionsResponse {
            collections: vec!["zeta".into(), "alpha".into(), "mid".into()],
        })),
    );
    let sel = app.elements.collection_select.as_ref().unwrap();
    assert_eq!(sel.entries(), vec!["select a collection", "zeta", "alpha", "mid"]);
    assert_eq!(sel.selected(), None);
    assert_eq!(app.vector_phase, VectorPhase::CollectionsLoaded);
    assert_eq!(success(&app).as_deref(), Some("Loaded 3 collections"));
}

#[test]
fn connect_failure_clears_flag_and_reports() {
    let mut app = app();
    app.state.vector_connected = true;
    reply(
        &mut app,
        ApiCall::Connect {
            host: "localhost".into(),
            port: 19530,
        },
        Err(RequestError::Status {
            status: 500,
            message: "Milvus unreachable".into(),
        }),
    );
    assert!(!app.state.vector_connected);
    assert_eq!(error(&app).as_deref(), Some("Connection failed: Milvus unreachable"));
    assert!(!app.followup_pending(Panel::Vector));
    assert_eq!(
        app.elements.vector_status.as_ref().unwrap().text(),
        "Disconnected"
    );
}

#[test]
fn collections_require_connection() {
    let mut app = app();
    let effects = update(&mut app, AppMsg::Action(Action::LoadCollections));
    assert!(effects.is_empty());
    assert_eq!(
        error(&app).as_deref(),
        Some("Please connect to the vector database first")
    );
}

#[test]
fn empty_collection_list_is_an_error() {
    let mut app = app();
    app.state.vector_connected = true;
    reply(
        &mut app,
        ApiCall::ListCollections,
        Ok(ApiReply::Collections(CollectionsResponse::default())),
    );
    assert_eq!(error(&app).as_deref(), Some("No collections found"));
    let sel = app.elements.collection_select.as_ref().unwrap();
    assert_eq!(sel.entries(), vec!["select a collection"]);
}

#[test]
fn collection_views_need_a_selection() {
    let mut app = app();
    assert!(update(&mut app, AppMsg::Action(Action::ViewCollectionInfo)).is_empty());
    assert_eq!(error(&app).as_deref(), Some("Please select a collection first"));

    let sel = app.elements.collection_select.as_mut().unwrap();
    sel.set_options(vec!["docs".into()]);
    sel.select("docs");
    let effects = update(&mut app, AppMsg::Action(Action::ViewCollectionData));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::CollectionData {
            name: "docs".into(),
            limit: 100
        }]
    );
}

#[test]
fn collection_data_lands_in_vector_results() {
    let mut app = app();
    reply(
        &mut app,
        ApiCall::CollectionData {
            name: "docs".into(),
            limit: 100,
        },
        Ok(ApiReply::CollectionData(DataResponse {
            data: rows(json!([{"id": 1, "text": "a"}])),
            total_count: Some(10),
            returned_count: Some(1),
        })),
    );
    let doc = app.elements.vector_results.as_ref().unwrap().doc().unwrap();
    assert_eq!(doc.blocks[0], DocBlock::Summary("total 10 records, showing 1".into()));
    assert_eq!(doc.table().unwrap().columns, vec!["id", "text"]);
    assert_eq!(app.vector_phase, VectorPhase::DataShown);
}

#[test]
fn empty_or_blank_query_never_reaches_the_network() {
    let mut app = app();
    loaded_db(&mut app);
    for sql in ["", "   ", "\n\t "] {
        set_input(&mut app, WidgetId::SqlInput, sql);
        let effects = update(&mut app, AppMsg::Action(Action::ExecuteQuery));
        assert!(effects.is_empty());
        assert_eq!(error(&app).as_deref(), Some("Please enter a SQL query"));
    }
    assert!(!app.state.request_in_flight);
}

#[test]
fn query_requires_loaded_database() {
    let mut app = app();
    set_input(&mut app, WidgetId::SqlInput, "SELECT 1");
    assert!(update(&mut app, AppMsg::Action(Action::ExecuteQuery)).is_empty());
    assert_eq!(error(&app).as_deref(), Some("Please upload a database file first"));

    loaded_db(&mut app);
    let effects = update(&mut app, AppMsg::Action(Action::ExecuteQuery));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::Query {
            sql: "SELECT 1".into()
        }]
    );
}

#[test]
fn upload_checks_extension_before_sending() {
    let mut app = app();
    assert!(update(&mut app, AppMsg::Action(Action::UploadFile)).is_empty());
    assert_eq!(error(&app).as_deref(), Some("Please choose a file"));

    set_input(&mut app, WidgetId::FileInput, "report.txt");
    assert!(update(&mut app, AppMsg::Action(Action::UploadFile)).is_empty());
    assert_eq!(error(&app).as_deref(), Some("Please choose a .db or .duckdb file"));

    set_input(&mut app, WidgetId::FileInput, "backup.duckdb");
    let effects = update(&mut app, AppMsg::Action(Action::UploadFile));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::Upload {
            file: PathBuf::from("backup.duckdb")
        }]
    );
    assert_eq!(app.embedded_phase, EmbeddedPhase::Uploading);
}

#[test]
fn upload_success_then_tables_load_without_indicator() {
    let mut app = app();
    reply(
        &mut app,
        ApiCall::Upload {
            file: PathBuf::from("/data/sales.duckdb"),
        },
        Ok(ApiReply::Uploaded(UploadResponse {
            tables_count: 2,
            ..Default::default()
        })),
    );
    assert!(app.state.embedded_loaded);
    assert_eq!(success(&app).as_deref(), Some("File uploaded, 2 tables found"));
    assert_eq!(
        app.elements.embedded_status.as_ref().unwrap().text(),
        "Loaded sales.duckdb (2 tables)"
    );
    let effects = ticks(&mut app, 5);
    assert_eq!(requests(&effects), vec![ApiCall::ListTables]);
    assert!(!app.is_loading());

    reply(
        &mut app,
        ApiCall::ListTables,
        Ok(ApiReply::Tables(TablesResponse {
            tables: vec!["orders".into(), "customers".into()],
        })),
    );
    let sel = app.elements.table_select.as_ref().unwrap();
    assert_eq!(sel.entries(), vec!["select a table", "orders", "customers"]);
    assert_eq!(app.embedded_phase, EmbeddedPhase::TablesLoaded);
}

#[test]
fn upload_failure_resets_loaded_flag() {
    let mut app = app();
    loaded_db(&mut app);
    reply(
        &mut app,
        ApiCall::Upload {
            file: PathBuf::from("x.db"),
        },
        Err(RequestError::Status {
            status: 400,
            message: "not a database".into(),
        }),
    );
    assert!(!app.state.embedded_loaded);
    assert_eq!(error(&app).as_deref(), Some("Upload failed: not a database"));
}

#[test]
fn empty_table_list_is_an_error() {
    let mut app = app();
    loaded_db(&mut app);
    reply(
        &mut app,
        ApiCall::ListTables,
        Ok(ApiReply::Tables(TablesResponse::default())),
    );
    assert_eq!(error(&app).as_deref(), Some("No tables found in the database"));
}

#[test]
fn user_action_cancels_pending_followup() {
    let mut app = app();
    reply(
        &mut app,
        ApiCall::Upload {
            file: PathBuf::from("a.db"),
        },
        Ok(ApiReply::Uploaded(UploadResponse::default())),
    );
    assert!(app.followup_pending(Panel::Embedded));
    set_input(&mut app, WidgetId::SqlInput, "SELECT 42");
    let effects = update(&mut app, AppMsg::Action(Action::ExecuteQuery));
    assert_eq!(requests(&effects).len(), 1);
    assert!(!app.followup_pending(Panel::Embedded));
    assert!(requests(&ticks(&mut app, 10)).is_empty());
}

#[test]
fn stale_followup_runs_when_cancellation_is_off() {
    let mut app = ViewerApp::new(AppConfig {
        cancel_stale_deferred: false,
        ..Default::default()
    });
    reply(
        &mut app,
        ApiCall::Upload {
            file: PathBuf::from("a.db"),
        },
        Ok(ApiReply::Uploaded(UploadResponse::default())),
    );
    set_input(&mut app, WidgetId::SqlInput, "SELECT 42");
    update(&mut app, AppMsg::Action(Action::ExecuteQuery));
    assert_eq!(requests(&ticks(&mut app, 5)), vec![ApiCall::ListTables]);
}

#[test]
fn second_connect_replaces_pending_followup() {
    let mut app = app();
    let connect = ApiCall::Connect {
        host: "localhost".into(),
        port: 19530,
    };
    reply(&mut app, connect.clone(), Ok(ApiReply::Connected(json!({}))));
    ticks(&mut app, 3);
    reply(&mut app, connect, Ok(ApiReply::Connected(json!({}))));
    assert_eq!(app.scheduler.len(), 1);
    assert!(ticks(&mut app, 4).is_empty());
    assert_eq!(requests(&ticks(&mut app, 1)), vec![ApiCall::ListCollections]);
}

#[test]
fn row_query_renders_results_and_statement_renders_message() {
    let mut app = app();
    loaded_db(&mut app);
    let call = ApiCall::Query {
        sql: "SELECT 1 AS one".into(),
    };
    reply(
        &mut app,
        call.clone(),
        Ok(ApiReply::Query(QueryResponse {
            data: Some(rows(json!([{"one": 1}]))),
            returned_count: Some(1),
            ..Default::default()
        })),
    );
    let doc = app.elements.embedded_results.as_ref().unwrap().doc().unwrap();
    assert_eq!(doc.title, "SQL query result");
    assert_eq!(doc.blocks[0], DocBlock::Summary("total 1 rows, showing 1".into()));
    assert_eq!(success(&app), None);

    reply(
        &mut app,
        call,
        Ok(ApiReply::Query(QueryResponse {
            message: Some("Table created".into()),
            affected_rows: Some(3),
            ..Default::default()
        })),
    );
    assert_eq!(success(&app).as_deref(), Some("Table created"));
    let doc = app.elements.embedded_results.as_ref().unwrap().doc().unwrap();
    assert_eq!(doc.title, "Query execution result");
    assert_eq!(doc.blocks[1], DocBlock::Summary("Affected rows: 3".into()));
    assert_eq!(app.embedded_phase, EmbeddedPhase::QueryResultShown);
}

#[test]
fn clear_results_empties_container() {
    let mut app = app();
    reply(
        &mut app,
        ApiCall::TableData {
            name: "t".into(),
            limit: 100,
        },
        Ok(ApiReply::TableData(DataResponse::default())),
    );
    assert!(app.elements.embedded_results.as_ref().unwrap().doc().is_some());
    update(&mut app, AppMsg::Action(Action::ClearResults));
    assert!(app.elements.embedded_results.as_ref().unwrap().doc().is_none());
}

#[test]
fn banners_expire_after_their_lifetime() {
    let mut app = app();
    app.show_error("bad");
    app.show_success("good");
    ticks(&mut app, 14);
    assert!(success(&app).is_some());
    ticks(&mut app, 1);
    assert_eq!(success(&app), None);
    assert!(error(&app).is_some());
    ticks(&mut app, 10);
    assert_eq!(error(&app), None);
}

#[test]
fn escape_hides_banners() {
    let mut app = app();
    app.show_error("bad");
    app.show_success("good");
    press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
    assert_eq!(error(&app), None);
    assert_eq!(success(&app), None);
}

#[test]
fn loading_indicator_is_not_reference_counted() {
    let mut app = app();
    app.state.vector_connected = true;
    update(&mut app, AppMsg::Action(Action::Connect));
    update(&mut app, AppMsg::Action(Action::LoadCollections));
    assert!(app.is_loading());
    reply(
        &mut app,
        ApiCall::ListCollections,
        Ok(ApiReply::Collections(CollectionsResponse {
            collections: vec!["c".into()],
        })),
    );
    assert!(!app.is_loading());
}

#[test]
fn unexpected_errors_surface_as_banner() {
    let mut app = app();
    update(&mut app, AppMsg::Action(Action::Connect));
    update(&mut app, AppMsg::Unexpected("worker panicked".into()));
    assert_eq!(error(&app).as_deref(), Some("Unexpected error: worker panicked"));
    assert!(!app.is_loading());
}

#[test]
fn primary_enter_in_sql_editor_executes() {
    let mut app = app();
    loaded_db(&mut app);
    press(&mut app, KeyCode::Char('2'), KeyModifiers::CONTROL);
    assert_eq!(app.state.active_panel, Panel::Embedded);
    assert_eq!(app.focused(), Some(WidgetId::UploadArea));
    assert!(app.focus.focus(WidgetId::SqlInput));
    for c in "SELECT 7".chars() {
        press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
    }
    let effects = press(&mut app, KeyCode::Enter, KeyModifiers::SUPER);
    assert_eq!(
        requests(&effects),
        vec![ApiCall::Query {
            sql: "SELECT 7".into()
        }]
    );
    // Plain Enter inserts a newline instead.
    assert!(press(&mut app, KeyCode::Enter, KeyModifiers::NONE).is_empty());
    assert_eq!(app.elements.input_text(WidgetId::SqlInput).as_deref(), Some("SELECT 7\n"));
}

#[test]
fn key_releases_are_ignored() {
    let mut app = app();
    let release = KeyEvent {
        code: KeyCode::Char('2'),
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    };
    update(&mut app, AppMsg::Key(release));
    assert_eq!(app.state.active_panel, Panel::Vector);
}

#[test]
fn tab_walks_focus_and_enter_activates_buttons() {
    let mut app = app();
    assert_eq!(app.focused(), Some(WidgetId::VectorHost));
    press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
    press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
    assert_eq!(app.focused(), Some(WidgetId::ConnectButton));
    let effects = press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    assert_eq!(requests(&effects).len(), 1);
    press(&mut app, KeyCode::BackTab, KeyModifiers::NONE);
    assert_eq!(app.focused(), Some(WidgetId::VectorPort));
}

#[test]
fn pasting_a_path_on_upload_area_uploads_it() {
    let mut app = app();
    update(&mut app, AppMsg::Action(Action::ShowPanel(Panel::Embedded)));
    assert_eq!(app.focused(), Some(WidgetId::UploadArea));
    let effects = update(&mut app, AppMsg::Paste("'/tmp/my data.DB'".into()));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::Upload {
            file: PathBuf::from("/tmp/my data.DB")
        }]
    );
    assert_eq!(
        app.elements.input_text(WidgetId::FileInput).as_deref(),
        Some("/tmp/my data.DB")
    );

    let effects = update(&mut app, AppMsg::Paste("/tmp/notes.txt".into()));
    assert!(effects.is_empty());
    assert_eq!(error(&app).as_deref(), Some("Please choose a .db or .duckdb file"));
}

#[test]
fn export_and_copy_use_active_result() {
    let mut app = app();
    update(&mut app, AppMsg::Action(Action::ShowPanel(Panel::Embedded)));
    assert!(update(&mut app, AppMsg::Action(Action::ExportResult)).is_empty());
    assert_eq!(error(&app).as_deref(), Some("Nothing to export yet"));

    loaded_db(&mut app);
    reply(
        &mut app,
        ApiCall::Query { sql: "x".into() },
        Ok(ApiReply::Query(QueryResponse {
            data: Some(rows(json!([{"a": "<b>"}]))),
            ..Default::default()
        })),
    );
    match update(&mut app, AppMsg::Action(Action::ExportResult)).as_slice() {
        [Effect::ExportHtml { file_name, html }] => {
            assert_eq!(file_name, "embedded-sql-query-result.html");
            assert!(html.contains("&lt;b&gt;"));
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    match update(&mut app, AppMsg::Action(Action::CopyResult)).as_slice() {
        [Effect::CopyToClipboard(text)] => assert!(text.contains("a\n<b>\n")),
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn hidden_banners_and_results_degrade_silently() {
    let mut app = ViewerApp::new(AppConfig {
        hidden_widgets: vec![
            "error-message".into(),
            "success-message".into(),
            "vector-data".into(),
            "loading".into(),
        ],
        ..Default::default()
    });
    assert!(update(&mut app, AppMsg::Action(Action::LoadCollections)).is_empty());
    assert_eq!(error(&app), None);
    reply(
        &mut app,
        ApiCall::CollectionData {
            name: "c".into(),
            limit: 100,
        },
        Ok(ApiReply::CollectionData(DataResponse::default())),
    );
    assert!(app.elements.vector_results.is_none());
    assert!(app.debug_lines().any(|l| l.contains("Please connect")));
}

#[test]
fn table_info_requires_loaded_database() {
    let mut app = app();
    let sel = app.elements.table_select.as_mut().unwrap();
    sel.set_options(vec!["users".into()]);
    sel.select("users");
    assert!(update(&mut app, AppMsg::Action(Action::ViewTableInfo)).is_empty());
    assert_eq!(error(&app).as_deref(), Some("Please upload a database file first"));
    loaded_db(&mut app);
    let effects = update(&mut app, AppMsg::Action(Action::ViewTableInfo));
    assert_eq!(
        requests(&effects),
        vec![ApiCall::TableInfo {
            name: "users".into()
        }]
    );
}

#[test]
fn slugify_keeps_alphanumerics() {
    assert_eq!(slugify("Collection data: my_docs"), "collection-data-my-docs");
    assert_eq!(slugify("***"), "result");
}

#[test]
fn action_names_parse_for_scripted_runs() {
    assert_eq!(Action::from_name("connect"), Some(Action::Connect));
    assert_eq!(Action::from_name("Load_Tables"), Some(Action::LoadTables));
    assert_eq!(
        Action::from_name(" show-embedded "),
        Some(Action::ShowPanel(Panel::Embedded))
    );
    assert_eq!(Action::from_name("launch"), None);

    let mut app = app();
    let action = Action::from_name("connect").unwrap();
    let effects = update(&mut app, AppMsg::Action(action));
    assert_eq!(requests(&effects).len(), 1);
}
