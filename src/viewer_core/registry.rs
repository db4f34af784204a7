//! Named UI elements, resolved once at startup.
//!
//! Each slot is an `Option`: a widget listed in `hidden_widgets` is never
//! resolved, and every caller handles the absent case by skipping the work
//! that depended on it.

use crate::model::{AppConfig, Panel};
use crate::widgets::banner::{Banner, BannerKind};
use crate::widgets::result_view::ResultPane;
use crate::widgets::selector::Selector;
use crate::widgets::status_bar::{ConnectionStatus, LoadingIndicator};
use crate::widgets::text_input::TextInput;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WidgetId {
    Loading,
    ErrorBanner,
    SuccessBanner,
    VectorStatus,
    VectorHost,
    VectorPort,
    ConnectButton,
    LoadCollectionsButton,
    CollectionSelect,
    CollectionInfoButton,
    CollectionDataButton,
    VectorResults,
    EmbeddedStatus,
    UploadArea,
    FileInput,
    UploadButton,
    LoadTablesButton,
    TableSelect,
    TableInfoButton,
    TableDataButton,
    SqlInput,
    ExecuteButton,
    ClearButton,
    EmbeddedResults,
}

use WidgetId::*;

pub const ALL_WIDGETS: [WidgetId; 24] = [
    Loading,
    ErrorBanner,
    SuccessBanner,
    VectorStatus,
    VectorHost,
    VectorPort,
    ConnectButton,
    LoadCollectionsButton,
    CollectionSelect,
    CollectionInfoButton,
    CollectionDataButton,
    VectorResults,
    EmbeddedStatus,
    UploadArea,
    FileInput,
    UploadButton,
    LoadTablesButton,
    TableSelect,
    TableInfoButton,
    TableDataButton,
    SqlInput,
    ExecuteButton,
    ClearButton,
    EmbeddedResults,
];

const VECTOR_FOCUS: [WidgetId; 8] = [
    VectorHost,
    VectorPort,
    ConnectButton,
    LoadCollectionsButton,
    CollectionSelect,
    CollectionInfoButton,
    CollectionDataButton,
    VectorResults,
];

const EMBEDDED_FOCUS: [WidgetId; 11] = [
    UploadArea,
    FileInput,
    UploadButton,
    LoadTablesButton,
    TableSelect,
    TableInfoButton,
    TableDataButton,
    SqlInput,
    ExecuteButton,
    ClearButton,
    EmbeddedResults,
];

impl WidgetId {
    /// Name used in the config file's `hidden_widgets` list.
    pub fn name(self) -> &'static str {
        match self {
            Loading => "loading",
            ErrorBanner => "error-message",
            SuccessBanner => "success-message",
            VectorStatus => "vector-status",
            VectorHost => "vector-host",
            VectorPort => "vector-port",
            ConnectButton => "connect-button",
            LoadCollectionsButton => "load-collections-button",
            CollectionSelect => "collection-select",
            CollectionInfoButton => "collection-info-button",
            CollectionDataButton => "collection-data-button",
            VectorResults => "vector-data",
            EmbeddedStatus => "embedded-status",
            UploadArea => "upload-area",
            FileInput => "embedded-file",
            UploadButton => "upload-button",
            LoadTablesButton => "load-tables-button",
            TableSelect => "table-select",
            TableInfoButton => "table-info-button",
            TableDataButton => "table-data-button",
            SqlInput => "sql-query",
            ExecuteButton => "execute-button",
            ClearButton => "clear-button",
            EmbeddedResults => "embedded-data",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('_', "-");
        ALL_WIDGETS.iter().copied().find(|w| w.name() == name)
    }

    pub fn panel(self) -> Option<Panel> {
        match self {
            Loading | ErrorBanner | SuccessBanner => None,
            VectorStatus | VectorHost | VectorPort | ConnectButton | LoadCollectionsButton
            | CollectionSelect | CollectionInfoButton | CollectionDataButton | VectorResults => {
                Some(Panel::Vector)
            }
            _ => Some(Panel::Embedded),
        }
    }

    pub fn is_button(self) -> bool {
        matches!(
            self,
            ConnectButton
                | LoadCollectionsButton
                | CollectionInfoButton
                | CollectionDataButton
                | UploadButton
                | LoadTablesButton
                | TableInfoButton
                | TableDataButton
                | ExecuteButton
                | ClearButton
        )
    }

    pub fn is_text_input(self) -> bool {
        matches!(self, VectorHost | VectorPort | FileInput | SqlInput)
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectButton => "Connect",
            LoadCollectionsButton => "Load collections",
            CollectionInfoButton => "Collection info",
            CollectionDataButton => "View data",
            UploadButton => "Upload",
            LoadTablesButton => "Load tables",
            TableInfoButton => "Table info",
            TableDataButton => "View data",
            ExecuteButton => "Execute",
            ClearButton => "Clear",
            UploadArea => "Drop a .db / .duckdb file here (paste a path)",
            VectorHost => "Host",
            VectorPort => "Port",
            FileInput => "Database file",
            SqlInput => "SQL query",
            CollectionSelect => "Collection",
            TableSelect => "Table",
            VectorResults | EmbeddedResults => "Results",
            VectorStatus | EmbeddedStatus => "Status",
            Loading => "Loading",
            ErrorBanner => "Error",
            SuccessBanner => "Success",
        }
    }
}

#[derive(Default)]
pub struct ElementRegistry {
    pub loading: Option<LoadingIndicator>,
    pub error_banner: Option<Banner>,
    pub success_banner: Option<Banner>,

    pub vector_status: Option<ConnectionStatus>,
    pub vector_host: Option<TextInput>,
    pub vector_port: Option<TextInput>,
    pub collection_select: Option<Selector>,
    pub vector_results: Option<ResultPane>,

    pub embedded_status: Option<ConnectionStatus>,
    pub file_input: Option<TextInput>,
    pub table_select: Option<Selector>,
    pub sql_input: Option<TextInput>,
    pub embedded_results: Option<ResultPane>,

    // Buttons and the upload area carry no state beyond being present.
    controls: BTreeSet<WidgetId>,
}

impl ElementRegistry {
    /// Resolve every widget not hidden by config. Returns one warning per
    /// `hidden_widgets` entry that names no known widget.
    pub fn initialize(&mut self, cfg: &AppConfig) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut hidden = BTreeSet::new();
        for name in &cfg.hidden_widgets {
            match WidgetId::from_name(name) {
                Some(id) => {
                    hidden.insert(id);
                }
                None => warnings.push(format!("unknown widget in hidden_widgets: {name}")),
            }
        }
        let want = |id: WidgetId| !hidden.contains(&id);

        self.loading = want(Loading).then(LoadingIndicator::default);
        self.error_banner = want(ErrorBanner).then(|| Banner::new(BannerKind::Error));
        self.success_banner = want(SuccessBanner).then(|| Banner::new(BannerKind::Success));

        self.vector_status = want(VectorStatus).then(ConnectionStatus::default);
        self.vector_host = want(VectorHost).then(|| TextInput::single(VectorHost.label()));
        self.vector_port = want(VectorPort).then(|| TextInput::single(VectorPort.label()));
        self.collection_select =
            want(CollectionSelect).then(|| Selector::new(CollectionSelect.label(), "select a collection"));
        self.vector_results = want(VectorResults).then(|| ResultPane::new("Vector results"));

        self.embedded_status = want(EmbeddedStatus).then(ConnectionStatus::default);
        self.file_input = want(FileInput).then(|| TextInput::single(FileInput.label()));
        self.table_select =
            want(TableSelect).then(|| Selector::new(TableSelect.label(), "select a table"));
        self.sql_input = want(SqlInput).then(|| TextInput::multi(SqlInput.label()));
        self.embedded_results = want(EmbeddedResults).then(|| ResultPane::new("Query results"));

        self.controls = ALL_WIDGETS
            .iter()
            .copied()
            .filter(|id| (id.is_button() || *id == UploadArea) && want(*id))
            .collect();

        if let Some(host) = &mut self.vector_host {
            host.set_text(&cfg.default_host);
        }
        if let Some(port) = &mut self.vector_port {
            port.set_text(&cfg.default_port.to_string());
        }
        warnings
    }

    pub fn has(&self, id: WidgetId) -> bool {
        match id {
            Loading => self.loading.is_some(),
            ErrorBanner => self.error_banner.is_some(),
            SuccessBanner => self.success_banner.is_some(),
            VectorStatus => self.vector_status.is_some(),
            VectorHost => self.vector_host.is_some(),
            VectorPort => self.vector_port.is_some(),
            CollectionSelect => self.collection_select.is_some(),
            VectorResults => self.vector_results.is_some(),
            EmbeddedStatus => self.embedded_status.is_some(),
            FileInput => self.file_input.is_some(),
            TableSelect => self.table_select.is_some(),
            SqlInput => self.sql_input.is_some(),
            EmbeddedResults => self.embedded_results.is_some(),
            other => self.controls.contains(&other),
        }
    }

    /// Focusable widgets of a panel, in tab order, skipping unresolved ones.
    pub fn focus_order(&self, panel: Panel) -> Vec<WidgetId> {
        let order: &[WidgetId] = match panel {
            Panel::Vector => &VECTOR_FOCUS,
            Panel::Embedded => &EMBEDDED_FOCUS,
        };
        order.iter().copied().filter(|id| self.has(*id)).collect()
    }

    pub fn results(&self, panel: Panel) -> Option<&ResultPane> {
        match panel {
            Panel::Vector => self.vector_results.as_ref(),
            Panel::Embedded => self.embedded_results.as_ref(),
        }
    }

    pub fn results_mut(&mut self, panel: Panel) -> Option<&mut ResultPane> {
        match panel {
            Panel::Vector => self.vector_results.as_mut(),
            Panel::Embedded => self.embedded_results.as_mut(),
        }
    }

    pub fn input_mut(&mut self, id: WidgetId) -> Option<&mut TextInput> {
        match id {
            VectorHost => self.vector_host.as_mut(),
            VectorPort => self.vector_port.as_mut(),
            FileInput => self.file_input.as_mut(),
            SqlInput => self.sql_input.as_mut(),
            _ => None,
        }
    }

    pub fn selector_mut(&mut self, id: WidgetId) -> Option<&mut Selector> {
        match id {
            CollectionSelect => self.collection_select.as_mut(),
            TableSelect => self.table_select.as_mut(),
            _ => None,
        }
    }

    pub fn input_text(&self, id: WidgetId) -> Option<String> {
        let input = match id {
            VectorHost => self.vector_host.as_ref(),
            VectorPort => self.vector_port.as_ref(),
            FileInput => self.file_input.as_ref(),
            SqlInput => self.sql_input.as_ref(),
            _ => None,
        };
        input.map(|i| i.text())
    }

    pub fn selected_collection(&self) -> Option<String> {
        self.collection_select
            .as_ref()
            .and_then(|s| s.selected())
            .map(str::to_string)
    }

    pub fn selected_table(&self) -> Option<String> {
        self.table_select
            .as_ref()
            .and_then(|s| s.selected())
            .map(str::to_string)
    }
}
