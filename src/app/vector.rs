//! Vector-database panel: connect, list collections, show collection schema
//! and sample rows.

use super::session::{ValidationError, VectorPhase};
use super::{Deferred, Effect, ViewerApp};
use crate::model::Panel;
use crate::render::document::{collection_data_doc, collection_info_doc};
use crate::services::api::{ApiCall, ApiReply};
use crate::services::http_client::RequestError;
use crate::viewer_core::registry::WidgetId;

/// Host from the input, or the configured default when blank.
pub(crate) fn resolve_host(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(h) if !h.is_empty() => h.to_string(),
        _ => default.to_string(),
    }
}

/// Port from the input's leading digits, or the default when there are none
/// or they do not form a usable port.
pub(crate) fn resolve_port(raw: Option<&str>, default: u16) -> u16 {
    let digits: String = raw
        .unwrap_or("")
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u16>() {
        Ok(p) if p != 0 => p,
        _ => default,
    }
}

pub(crate) fn refresh_status(app: &mut ViewerApp, target: Option<(&str, u16)>) {
    let connected = app.state.vector_connected;
    let text = match (connected, target) {
        (true, Some((host, port))) => format!("Connected to {host}:{port}"),
        (true, None) => "Connected".to_string(),
        (false, _) => "Disconnected".to_string(),
    };
    if let Some(s) = &mut app.elements.vector_status {
        s.set(connected, text);
    }
}

pub fn connect(app: &mut ViewerApp) -> Vec<Effect> {
    app.supersede_followup(Panel::Vector);
    let host = resolve_host(
        app.elements.input_text(WidgetId::VectorHost).as_deref(),
        &app.config.default_host,
    );
    let port = resolve_port(
        app.elements.input_text(WidgetId::VectorPort).as_deref(),
        app.config.default_port,
    );
    app.vector_phase = VectorPhase::Connecting;
    vec![app.begin_request(ApiCall::Connect { host, port })]
}

pub fn load_collections(app: &mut ViewerApp) -> Vec<Effect> {
    if !app.state.vector_connected {
        app.show_validation(ValidationError::NotConnected);
        return Vec::new();
    }
    vec![app.begin_request(ApiCall::ListCollections)]
}

pub fn view_collection_info(app: &mut ViewerApp) -> Vec<Effect> {
    let Some(name) = app.elements.selected_collection() else {
        app.show_validation(ValidationError::NoCollectionSelected);
        return Vec::new();
    };
    app.supersede_followup(Panel::Vector);
    vec![app.begin_request(ApiCall::CollectionInfo { name })]
}

pub fn view_collection_data(app: &mut ViewerApp) -> Vec<Effect> {
    let Some(name) = app.elements.selected_collection() else {
        app.show_validation(ValidationError::NoCollectionSelected);
        return Vec::new();
    };
    app.supersede_followup(Panel::Vector);
    let limit = app.config.row_limit;
    vec![app.begin_request(ApiCall::CollectionData { name, limit })]
}

pub(crate) fn on_reply(
    app: &mut ViewerApp,
    call: ApiCall,
    outcome: Result<ApiReply, RequestError>,
) -> Vec<Effect> {
    match (call, outcome) {
        (ApiCall::Connect { host, port }, Ok(_)) => {
            app.state.vector_connected = true;
            app.vector_phase = VectorPhase::Connected;
            refresh_status(app, Some((&host, port)));
            app.show_success("Connected to the vector database");
            tracing::info!(%host, port, "vector database connected");
            app.schedule_followup(Deferred::LoadCollections);
        }
        (ApiCall::Connect { .. }, Err(e)) => {
            app.state.vector_connected = false;
            app.vector_phase = VectorPhase::Disconnected;
            refresh_status(app, None);
            app.show_error(format!("Connection failed: {e}"));
        }
        (ApiCall::ListCollections, Ok(ApiReply::Collections(resp))) => {
            let n = resp.collections.len();
            if let Some(sel) = &mut app.elements.collection_select {
                sel.set_options(resp.collections);
            }
            if n == 0 {
                app.show_validation(ValidationError::NoCollections);
            } else {
                app.vector_phase = VectorPhase::CollectionsLoaded;
                app.show_success(format!("Loaded {n} collections"));
            }
        }
        (ApiCall::ListCollections, Err(e)) => {
            app.show_error(format!("Failed to load collections: {e}"))
        }
        (ApiCall::CollectionInfo { name }, Ok(ApiReply::CollectionInfo(info))) => {
            app.vector_phase = VectorPhase::DetailShown;
            if let Some(r) = &mut app.elements.vector_results {
                r.set(collection_info_doc(&name, &info));
            }
        }
        (ApiCall::CollectionInfo { .. }, Err(e)) => {
            app.show_error(format!("Failed to load collection info: {e}"))
        }
        (ApiCall::CollectionData { name, .. }, Ok(ApiReply::CollectionData(resp))) => {
            app.vector_phase = VectorPhase::DataShown;
            if let Some(r) = &mut app.elements.vector_results {
                r.set(collection_data_doc(&name, &resp));
            }
        }
        (ApiCall::CollectionData { .. }, Err(e)) => {
            app.show_error(format!("Failed to load collection data: {e}"))
        }
        (call, Ok(reply)) => {
            app.dbg(format!("{}: mismatched reply {reply:?}", call.label()));
        }
        (_, Err(e)) => app.show_error(e.to_string()),
    }
    Vec::new()
}
