use super::*;
use crate::services::api::{
    CollectionInfo, CollectionsResponse, DataResponse, HealthResponse, QueryResponse,
    TableInfo, TablesResponse, UploadResponse,
};
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<String>>,
}

impl RecordingApi {
    fn record(&self, s: impl Into<String>) {
        self.calls.lock().unwrap().push(s.into());
    }
}

impl ViewerApi for RecordingApi {
    fn health(&self) -> Result<HealthResponse, RequestError> {
        self.record("health");
        Ok(HealthResponse {
            milvus_connected: true,
            ..Default::default()
        })
    }
    fn connect(&self, host: &str, port: u16) -> Result<JsonValue, RequestError> {
        self.record(format!("connect {host}:{port}"));
        Ok(json!({"status": "success"}))
    }
    fn list_collections(&self) -> Result<CollectionsResponse, RequestError> {
        self.record("collections");
        Ok(CollectionsResponse {
            collections: vec!["docs".into()],
        })
    }
    fn collection_info(&self, name: &str) -> Result<CollectionInfo, RequestError> {
        self.record(format!("info {name}"));
        Err(RequestError::Status {
            status: 404,
            message: format!("collection '{name}' does not exist"),
        })
    }
    fn collection_data(&self, name: &str, limit: u32) -> Result<DataResponse, RequestError> {
        self.record(format!("data {name} {limit}"));
        Ok(DataResponse::default())
    }
    fn upload(&self, file: &Path) -> Result<UploadResponse, RequestError> {
        self.record(format!("upload {}", file.display()));
        Ok(UploadResponse {
            tables_count: 2,
            ..Default::default()
        })
    }
    fn list_tables(&self) -> Result<TablesResponse, RequestError> {
        self.record("tables");
        Ok(TablesResponse::default())
    }
    fn table_info(&self, name: &str) -> Result<TableInfo, RequestError> {
        self.record(format!("table info {name}"));
        panic!("table info exploded");
    }
    fn table_data(&self, name: &str, limit: u32) -> Result<DataResponse, RequestError> {
        self.record(format!("table data {name} {limit}"));
        Ok(DataResponse::default())
    }
    fn query(&self, sql: &str) -> Result<QueryResponse, RequestError> {
        self.record(format!("query {sql}"));
        Ok(QueryResponse::default())
    }
}

#[test]
fn dispatch_routes_each_call_to_its_endpoint() {
    let api = RecordingApi::default();
    let _ = dispatch(
        &api,
        &ApiCall::Connect {
            host: "localhost".into(),
            port: 19530,
        },
    );
    let _ = dispatch(
        &api,
        &ApiCall::CollectionData {
            name: "docs".into(),
            limit: 100,
        },
    );
    let _ = dispatch(
        &api,
        &ApiCall::Upload {
            file: "backup.duckdb".into(),
        },
    );
    let _ = dispatch(&api, &ApiCall::Query { sql: "SELECT 1".into() });
    assert_eq!(
        *api.calls.lock().unwrap(),
        vec![
            "connect localhost:19530",
            "data docs 100",
            "upload backup.duckdb",
            "query SELECT 1"
        ]
    );
}

#[test]
fn request_errors_pass_through_unchanged() {
    let api = RecordingApi::default();
    match run_call(&api, ApiCall::CollectionInfo { name: "x".into() }) {
        LoadMsg::Finished { outcome, .. } => {
            assert_eq!(
                outcome.unwrap_err().to_string(),
                "collection 'x' does not exist"
            );
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn panicking_call_is_reported_as_crash() {
    let api = RecordingApi::default();
    match run_call(&api, ApiCall::TableInfo { name: "t".into() }) {
        LoadMsg::Crashed { call, reason } => {
            assert_eq!(call, ApiCall::TableInfo { name: "t".into() });
            assert!(reason.contains("table info exploded"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn spawned_call_delivers_over_channel() {
    let (tx, rx) = mpsc::channel();
    spawn_call(std::sync::Arc::new(RecordingApi::default()), ApiCall::Health, tx);
    let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    match msg {
        LoadMsg::Finished {
            call: ApiCall::Health,
            outcome: Ok(ApiReply::Health(h)),
        } => assert!(h.milvus_connected),
        other => panic!("unexpected {other:?}"),
    }
}
