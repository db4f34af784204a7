//! Application controller.
//!
//! `update` is a pure state transition: it mutates [`ViewerApp`] and returns
//! the side effects (backend calls, clipboard, file export) for the UI loop to
//! perform. Completions come back in as [`AppMsg::Loaded`].

pub mod embedded;
pub mod session;
pub mod shortcuts;
pub mod vector;

use crate::model::{AppConfig, Panel};
use crate::render::{html, text};
use crate::services::api::{ApiCall, ApiReply};
use crate::services::http_client::RequestError;
use crate::theme::Theme;
use crate::viewer_core::registry::WidgetId;
use crate::viewer_core::scheduler::{ms_to_ticks, secs_to_ticks};
use crate::viewer_core::{ElementRegistry, FocusRing, Scheduler, TaskHandle};
use crate::widgets::Widget;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use session::{AppState, EmbeddedPhase, ValidationError, VectorPhase};
use std::collections::VecDeque;

const MAX_LOG_LINES: usize = 200;

pub enum AppMsg {
    Key(KeyEvent),
    Paste(String),
    Action(Action),
    Loaded {
        call: ApiCall,
        outcome: Result<ApiReply, RequestError>,
    },
    /// A failure outside any controller, e.g. a crashed worker.
    Unexpected(String),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowPanel(Panel),
    Connect,
    LoadCollections,
    ViewCollectionInfo,
    ViewCollectionData,
    UploadFile,
    LoadTables,
    ViewTableInfo,
    ViewTableData,
    ExecuteQuery,
    ClearResults,
    DismissBanners,
    ExportResult,
    CopyResult,
    Quit,
}

impl Action {
    /// Parse a kebab-case action name, as used by scripted headless runs.
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "show-vector" => Action::ShowPanel(Panel::Vector),
            "show-embedded" => Action::ShowPanel(Panel::Embedded),
            "connect" => Action::Connect,
            "load-collections" => Action::LoadCollections,
            "collection-info" => Action::ViewCollectionInfo,
            "collection-data" => Action::ViewCollectionData,
            "upload" => Action::UploadFile,
            "load-tables" => Action::LoadTables,
            "table-info" => Action::ViewTableInfo,
            "table-data" => Action::ViewTableData,
            "execute" => Action::ExecuteQuery,
            "clear" => Action::ClearResults,
            "dismiss" => Action::DismissBanners,
            "export" => Action::ExportResult,
            "copy" => Action::CopyResult,
            "quit" => Action::Quit,
            _ => return None,
        };
        Some(action)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Request(ApiCall),
    CopyToClipboard(String),
    ExportHtml { file_name: String, html: String },
}

/// Follow-up loads scheduled after a successful connect or upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    LoadCollections,
    LoadTables,
}

pub struct ViewerApp {
    pub config: AppConfig,
    pub state: AppState,
    pub vector_phase: VectorPhase,
    pub embedded_phase: EmbeddedPhase,
    pub elements: ElementRegistry,
    pub focus: FocusRing,
    pub scheduler: Scheduler<Deferred>,
    pub tick: u64,
    pub theme: Theme,
    pub should_quit: bool,
    pub(crate) debug_log: VecDeque<String>,
    vector_followup: Option<TaskHandle>,
    embedded_followup: Option<TaskHandle>,
}

impl ViewerApp {
    pub fn new(config: AppConfig) -> Self {
        let mut elements = ElementRegistry::default();
        let warnings = elements.initialize(&config);
        let state = AppState {
            active_panel: config.start_panel,
            ..Default::default()
        };
        let focus = FocusRing::new(elements.focus_order(state.active_panel));
        let mut app = Self {
            theme: Theme::from_choice(config.theme),
            config,
            state,
            vector_phase: VectorPhase::default(),
            embedded_phase: EmbeddedPhase::default(),
            elements,
            focus,
            scheduler: Scheduler::new(),
            tick: 0,
            should_quit: false,
            debug_log: VecDeque::new(),
            vector_followup: None,
            embedded_followup: None,
        };
        for w in warnings {
            tracing::warn!("{w}");
            app.dbg(w);
        }
        app
    }

    /// Effects to run once the UI loop is up.
    pub fn startup(&mut self) -> Vec<Effect> {
        self.dbg(format!("api base: {}", self.config.api_base));
        vec![self.begin_request(ApiCall::Health)]
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }

    pub fn debug_lines(&self) -> impl Iterator<Item = &String> {
        self.debug_log.iter()
    }

    pub fn show_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.dbg(format!("error: {msg}"));
        let ttl = secs_to_ticks(self.config.error_banner_secs);
        if let Some(b) = &mut self.elements.error_banner {
            b.show(msg, self.tick, ttl);
        }
    }

    pub fn show_success(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.dbg(format!("ok: {msg}"));
        let ttl = secs_to_ticks(self.config.success_banner_secs);
        if let Some(b) = &mut self.elements.success_banner {
            b.show(msg, self.tick, ttl);
        }
    }

    pub(crate) fn show_validation(&mut self, err: ValidationError) {
        tracing::debug!(error = %err, "validation failed");
        self.show_error(err.to_string());
    }

    fn dismiss_banners(&mut self) {
        if let Some(b) = &mut self.elements.error_banner {
            b.hide();
        }
        if let Some(b) = &mut self.elements.success_banner {
            b.hide();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.elements
            .loading
            .as_ref()
            .is_some_and(|l| l.is_visible())
    }

    /// Record the start of a backend call and produce the effect that runs it.
    pub(crate) fn begin_request(&mut self, call: ApiCall) -> Effect {
        if call.shows_loading() {
            if let Some(l) = &mut self.elements.loading {
                l.show();
            }
        }
        self.state.request_in_flight = true;
        self.dbg(format!("-> {}", call.label()));
        tracing::info!(call = %call.label(), "request");
        Effect::Request(call)
    }

    /// Called when a call completes, whatever its outcome.
    fn end_request(&mut self, call: &ApiCall) {
        if call.shows_loading() {
            if let Some(l) = &mut self.elements.loading {
                l.hide();
            }
        }
        self.state.request_in_flight = false;
    }

    /// A user action superseding any follow-up load still pending for `panel`.
    pub(crate) fn supersede_followup(&mut self, panel: Panel) {
        if !self.config.cancel_stale_deferred {
            return;
        }
        let slot = match panel {
            Panel::Vector => self.vector_followup.take(),
            Panel::Embedded => self.embedded_followup.take(),
        };
        if let Some(h) = slot {
            if self.scheduler.cancel(h) {
                self.dbg(format!("cancelled pending {} follow-up", panel.slug()));
            }
        }
    }

    pub(crate) fn schedule_followup(&mut self, task: Deferred) {
        let panel = match task {
            Deferred::LoadCollections => Panel::Vector,
            Deferred::LoadTables => Panel::Embedded,
        };
        self.supersede_followup(panel);
        let delay = ms_to_ticks(self.config.deferred_load_ms);
        let handle = self.scheduler.schedule(self.tick, delay, task);
        match panel {
            Panel::Vector => self.vector_followup = Some(handle),
            Panel::Embedded => self.embedded_followup = Some(handle),
        }
    }

    pub fn followup_pending(&self, panel: Panel) -> bool {
        let slot = match panel {
            Panel::Vector => self.vector_followup,
            Panel::Embedded => self.embedded_followup,
        };
        slot.is_some_and(|h| self.scheduler.is_pending(h))
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.focus.current()
    }

    fn show_panel(&mut self, panel: Panel) {
        if self.state.active_panel != panel {
            self.dbg(format!("switched to {} panel", panel.slug()));
        }
        self.state.active_panel = panel;
        self.focus.reset(self.elements.focus_order(panel));
    }

    fn active_doc(&self) -> Option<&crate::render::ResultDoc> {
        self.elements
            .results(self.state.active_panel)
            .and_then(|r| r.doc())
    }

    fn export_result(&mut self) -> Vec<Effect> {
        let Some(doc) = self.active_doc() else {
            self.show_validation(ValidationError::NoResult);
            return Vec::new();
        };
        let file_name = format!(
            "{}-{}.html",
            self.state.active_panel.slug(),
            slugify(&doc.title)
        );
        let html = html::render_page(doc);
        vec![Effect::ExportHtml { file_name, html }]
    }

    fn copy_result(&mut self) -> Vec<Effect> {
        match self.active_doc() {
            Some(doc) => vec![Effect::CopyToClipboard(text::to_tsv(doc))],
            None => {
                self.show_validation(ValidationError::NoResult);
                Vec::new()
            }
        }
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        self.tick = self.tick.wrapping_add(1);
        let now = self.tick;
        if let Some(b) = &mut self.elements.error_banner {
            b.expire(now);
        }
        if let Some(b) = &mut self.elements.success_banner {
            b.expire(now);
        }
        let mut effects = Vec::new();
        for (handle, task) in self.scheduler.take_due(now) {
            match task {
                Deferred::LoadCollections => {
                    if self.vector_followup == Some(handle) {
                        self.vector_followup = None;
                    }
                    effects.extend(vector::load_collections(self));
                }
                Deferred::LoadTables => {
                    if self.embedded_followup == Some(handle) {
                        self.embedded_followup = None;
                    }
                    effects.extend(embedded::load_tables(self));
                }
            }
        }
        effects
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        let focus = self.focused();
        if let Some(action) = shortcuts::match_shortcut(&key, focus) {
            return self.perform(action);
        }
        match key.code {
            KeyCode::Tab => {
                self.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.focus.prev();
                return Vec::new();
            }
            _ => {}
        }
        let Some(id) = focus else {
            return Vec::new();
        };
        let consumed = if let Some(input) = self.elements.input_mut(id) {
            input.on_key(key)
        } else if let Some(sel) = self.elements.selector_mut(id) {
            sel.on_key(key)
        } else if matches!(id, WidgetId::VectorResults | WidgetId::EmbeddedResults) {
            id.panel()
                .and_then(|p| self.elements.results_mut(p))
                .is_some_and(|r| r.on_key(key))
        } else {
            false
        };
        if consumed {
            return Vec::new();
        }
        match shortcuts::activation(id, &key) {
            Some(action) => self.perform(action),
            None => Vec::new(),
        }
    }

    fn on_paste(&mut self, text: String) -> Vec<Effect> {
        match self.focused() {
            Some(WidgetId::UploadArea) | Some(WidgetId::FileInput) => {
                embedded::drop_path(self, &text)
            }
            Some(id) => {
                if let Some(input) = self.elements.input_mut(id) {
                    input.insert_str(&text);
                }
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn perform(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::ShowPanel(p) => {
                self.show_panel(p);
                Vec::new()
            }
            Action::Connect => vector::connect(self),
            Action::LoadCollections => {
                self.supersede_followup(Panel::Vector);
                vector::load_collections(self)
            }
            Action::ViewCollectionInfo => vector::view_collection_info(self),
            Action::ViewCollectionData => vector::view_collection_data(self),
            Action::UploadFile => embedded::upload_file(self),
            Action::LoadTables => {
                self.supersede_followup(Panel::Embedded);
                embedded::load_tables(self)
            }
            Action::ViewTableInfo => embedded::view_table_info(self),
            Action::ViewTableData => embedded::view_table_data(self),
            Action::ExecuteQuery => embedded::execute_query(self),
            Action::ClearResults => {
                embedded::clear_results(self);
                Vec::new()
            }
            Action::DismissBanners => {
                self.dismiss_banners();
                Vec::new()
            }
            Action::ExportResult => self.export_result(),
            Action::CopyResult => self.copy_result(),
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    fn on_loaded(&mut self, call: ApiCall, outcome: Result<ApiReply, RequestError>) -> Vec<Effect> {
        self.end_request(&call);
        match &outcome {
            Ok(_) => self.dbg(format!("<- {} ok", call.label())),
            Err(e) => {
                tracing::warn!(
                    call = %call.label(),
                    status = ?e.status(),
                    error = %e,
                    "request failed"
                );
                self.dbg(format!("<- {} failed: {e}", call.label()));
            }
        }
        match call {
            ApiCall::Health => {
                self.on_health(outcome);
                Vec::new()
            }
            ApiCall::Connect { .. }
            | ApiCall::ListCollections
            | ApiCall::CollectionInfo { .. }
            | ApiCall::CollectionData { .. } => vector::on_reply(self, call, outcome),
            ApiCall::Upload { .. }
            | ApiCall::ListTables
            | ApiCall::TableInfo { .. }
            | ApiCall::TableData { .. }
            | ApiCall::Query { .. } => embedded::on_reply(self, call, outcome),
        }
    }

    fn on_health(&mut self, outcome: Result<ApiReply, RequestError>) {
        match outcome {
            Ok(ApiReply::Health(h)) => {
                self.state.vector_connected = h.milvus_connected;
                self.state.embedded_loaded = h.duckdb_loaded;
                if h.milvus_connected && self.vector_phase == VectorPhase::Disconnected {
                    self.vector_phase = VectorPhase::Connected;
                }
                if h.duckdb_loaded && self.embedded_phase == EmbeddedPhase::Empty {
                    self.embedded_phase = EmbeddedPhase::Loaded;
                }
                vector::refresh_status(self, None);
                embedded::refresh_status(self, None);
            }
            Ok(other) => self.dbg(format!("health: unexpected reply {other:?}")),
            // Backend may simply not be up yet; the user finds out on first action.
            Err(e) => tracing::warn!(error = %e, "health check failed"),
        }
    }
}

pub fn update(app: &mut ViewerApp, msg: AppMsg) -> Vec<Effect> {
    match msg {
        AppMsg::Key(key) => app.on_key(key),
        AppMsg::Paste(text) => app.on_paste(text),
        AppMsg::Action(action) => app.perform(action),
        AppMsg::Loaded { call, outcome } => app.on_loaded(call, outcome),
        AppMsg::Unexpected(reason) => {
            tracing::error!(%reason, "unexpected error");
            if let Some(l) = &mut app.elements.loading {
                l.hide();
            }
            app.state.request_in_flight = false;
            app.show_error(format!("Unexpected error: {reason}"));
            Vec::new()
        }
        AppMsg::Tick => app.on_tick(),
    }
}

fn slugify(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "result".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests;
