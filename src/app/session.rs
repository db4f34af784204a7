use crate::model::Panel;
use thiserror::Error;

/// Session flags read by the controllers to gate actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub active_panel: Panel,
    pub vector_connected: bool,
    pub embedded_loaded: bool,
    pub request_in_flight: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VectorPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    CollectionsLoaded,
    DetailShown,
    DataShown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbeddedPhase {
    #[default]
    Empty,
    Uploading,
    Loaded,
    TablesLoaded,
    DataShown,
    QueryResultShown,
}

/// Failures caught before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please connect to the vector database first")]
    NotConnected,
    #[error("Please upload a database file first")]
    NoDatabase,
    #[error("Please select a collection first")]
    NoCollectionSelected,
    #[error("Please select a table first")]
    NoTableSelected,
    #[error("Please enter a SQL query")]
    EmptyQuery,
    #[error("Please choose a file")]
    NoFile,
    #[error("Please choose a .db or .duckdb file")]
    BadExtension(String),
    #[error("No collections found")]
    NoCollections,
    #[error("No tables found in the database")]
    NoTables,
    #[error("Nothing to export yet")]
    NoResult,
}
