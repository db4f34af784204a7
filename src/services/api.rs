//! Typed view of the backend REST surface.

use super::http_client::{HttpClient, RequestError, RequestOptions};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};

pub const HEALTH: &str = "/health";
pub const MILVUS_CONNECT: &str = "/milvus/connect";
pub const MILVUS_COLLECTIONS: &str = "/milvus/collections";
pub const DUCKDB_UPLOAD: &str = "/duckdb/upload";
pub const DUCKDB_TABLES: &str = "/duckdb/tables";
pub const DUCKDB_QUERY: &str = "/duckdb/query";

pub fn collection_info_path(name: &str) -> String {
    format!("/milvus/collection/{}/info", urlencoding::encode(name))
}

pub fn collection_data_path(name: &str, limit: u32) -> String {
    format!(
        "/milvus/collection/{}/data?limit={limit}",
        urlencoding::encode(name)
    )
}

pub fn table_info_path(name: &str) -> String {
    format!("/duckdb/table/{}/info", urlencoding::encode(name))
}

pub fn table_data_path(name: &str, limit: u32) -> String {
    format!(
        "/duckdb/table/{}/data?limit={limit}",
        urlencoding::encode(name)
    )
}

/// One result row: column name to value, in server order.
pub type Row = serde_json::Map<String, JsonValue>;
pub type RowSet = Vec<Row>;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub milvus_connected: bool,
    #[serde(default)]
    pub duckdb_loaded: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct CollectionsResponse {
    #[serde(default)]
    pub collections: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "is_primary", default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub auto_id: bool,
    #[serde(default)]
    pub dimension: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct CollectionSchema {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub num_entities: u64,
    #[serde(default)]
    pub is_empty: bool,
    #[serde(default)]
    pub schema: CollectionSchema,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct DataResponse {
    #[serde(default)]
    pub data: RowSet,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub returned_count: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub tables_count: u64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct TablesResponse {
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub null: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TableInfo {
    pub table_name: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

/// `data` present (even empty) means a row-producing statement.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Option<RowSet>,
    #[serde(default)]
    pub returned_count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub affected_rows: Option<i64>,
}

/// A backend call the UI wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Health,
    Connect { host: String, port: u16 },
    ListCollections,
    CollectionInfo { name: String },
    CollectionData { name: String, limit: u32 },
    Upload { file: PathBuf },
    ListTables,
    TableInfo { name: String },
    TableData { name: String, limit: u32 },
    Query { sql: String },
}

impl ApiCall {
    /// Whether the shared loading indicator is shown while this call runs.
    pub fn shows_loading(&self) -> bool {
        !matches!(self, ApiCall::Health | ApiCall::ListTables)
    }

    pub fn label(&self) -> String {
        match self {
            ApiCall::Health => "GET /health".to_string(),
            ApiCall::Connect { host, port } => format!("POST {MILVUS_CONNECT} {host}:{port}"),
            ApiCall::ListCollections => format!("GET {MILVUS_COLLECTIONS}"),
            ApiCall::CollectionInfo { name } => format!("GET {}", collection_info_path(name)),
            ApiCall::CollectionData { name, limit } => {
                format!("GET {}", collection_data_path(name, *limit))
            }
            ApiCall::Upload { file } => format!("POST {DUCKDB_UPLOAD} {}", file.display()),
            ApiCall::ListTables => format!("GET {DUCKDB_TABLES}"),
            ApiCall::TableInfo { name } => format!("GET {}", table_info_path(name)),
            ApiCall::TableData { name, limit } => format!("GET {}", table_data_path(name, *limit)),
            ApiCall::Query { .. } => format!("POST {DUCKDB_QUERY}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    Health(HealthResponse),
    Connected(JsonValue),
    Collections(CollectionsResponse),
    CollectionInfo(CollectionInfo),
    CollectionData(DataResponse),
    Uploaded(UploadResponse),
    Tables(TablesResponse),
    TableInfo(TableInfo),
    TableData(DataResponse),
    Query(QueryResponse),
}

/// Endpoints consumed by the viewer.
pub trait ViewerApi {
    fn health(&self) -> Result<HealthResponse, RequestError>;
    fn connect(&self, host: &str, port: u16) -> Result<JsonValue, RequestError>;
    fn list_collections(&self) -> Result<CollectionsResponse, RequestError>;
    fn collection_info(&self, name: &str) -> Result<CollectionInfo, RequestError>;
    fn collection_data(&self, name: &str, limit: u32) -> Result<DataResponse, RequestError>;
    fn upload(&self, file: &Path) -> Result<UploadResponse, RequestError>;
    fn list_tables(&self) -> Result<TablesResponse, RequestError>;
    fn table_info(&self, name: &str) -> Result<TableInfo, RequestError>;
    fn table_data(&self, name: &str, limit: u32) -> Result<DataResponse, RequestError>;
    fn query(&self, sql: &str) -> Result<QueryResponse, RequestError>;
}

/// Route a call to the matching endpoint.
pub fn dispatch(api: &dyn ViewerApi, call: &ApiCall) -> Result<ApiReply, RequestError> {
    Ok(match call {
        ApiCall::Health => ApiReply::Health(api.health()?),
        ApiCall::Connect { host, port } => ApiReply::Connected(api.connect(host, *port)?),
        ApiCall::ListCollections => ApiReply::Collections(api.list_collections()?),
        ApiCall::CollectionInfo { name } => ApiReply::CollectionInfo(api.collection_info(name)?),
        ApiCall::CollectionData { name, limit } => {
            ApiReply::CollectionData(api.collection_data(name, *limit)?)
        }
        ApiCall::Upload { file } => ApiReply::Uploaded(api.upload(file)?),
        ApiCall::ListTables => ApiReply::Tables(api.list_tables()?),
        ApiCall::TableInfo { name } => ApiReply::TableInfo(api.table_info(name)?),
        ApiCall::TableData { name, limit } => ApiReply::TableData(api.table_data(name, *limit)?),
        ApiCall::Query { sql } => ApiReply::Query(api.query(sql)?),
    })
}

fn decode<T: DeserializeOwned>(v: JsonValue) -> Result<T, RequestError> {
    serde_json::from_value(v).map_err(|e| RequestError::Decode(e.to_string()))
}

impl ViewerApi for HttpClient {
    fn health(&self) -> Result<HealthResponse, RequestError> {
        decode(self.request(HEALTH, RequestOptions::get())?)
    }

    fn connect(&self, host: &str, port: u16) -> Result<JsonValue, RequestError> {
        self.request(
            MILVUS_CONNECT,
            RequestOptions::post_json(json!({ "host": host, "port": port })),
        )
    }

    fn list_collections(&self) -> Result<CollectionsResponse, RequestError> {
        decode(self.request(MILVUS_COLLECTIONS, RequestOptions::get())?)
    }

    fn collection_info(&self, name: &str) -> Result<CollectionInfo, RequestError> {
        decode(self.request(&collection_info_path(name), RequestOptions::get())?)
    }

    fn collection_data(&self, name: &str, limit: u32) -> Result<DataResponse, RequestError> {
        decode(self.request(&collection_data_path(name, limit), RequestOptions::get())?)
    }

    fn upload(&self, file: &Path) -> Result<UploadResponse, RequestError> {
        decode(self.upload_file(DUCKDB_UPLOAD, file)?)
    }

    fn list_tables(&self) -> Result<TablesResponse, RequestError> {
        decode(self.request(DUCKDB_TABLES, RequestOptions::get())?)
    }

    fn table_info(&self, name: &str) -> Result<TableInfo, RequestError> {
        decode(self.request(&table_info_path(name), RequestOptions::get())?)
    }

    fn table_data(&self, name: &str, limit: u32) -> Result<DataResponse, RequestError> {
        decode(self.request(&table_data_path(name, limit), RequestOptions::get())?)
    }

    fn query(&self, sql: &str) -> Result<QueryResponse, RequestError> {
        decode(self.request(
            DUCKDB_QUERY,
            RequestOptions::post_json(json!({ "query": sql })),
        )?)
    }
}
