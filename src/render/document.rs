//! Result documents written into a panel's result container.

use super::cell::{format_cell, CellValue};
use crate::services::api::{CollectionInfo, DataResponse, QueryResponse, Row, TableInfo};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableData {
    /// Columns come from the first row's keys; later rows are read against them.
    pub fn from_rows(rows: &[Row]) -> Self {
        let columns: Vec<String> = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        let rows = rows
            .iter()
            .map(|row| columns.iter().map(|c| format_cell(row.get(c))).collect())
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocBlock {
    Summary(String),
    Facts(Vec<(String, String)>),
    Heading(String),
    Table(TableData),
    NoData(String),
    Success(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultDoc {
    pub title: String,
    pub blocks: Vec<DocBlock>,
}

impl ResultDoc {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn with(mut self, block: DocBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn table(&self) -> Option<&TableData> {
        self.blocks.iter().find_map(|b| match b {
            DocBlock::Table(t) => Some(t),
            _ => None,
        })
    }
}

fn yes_no(b: bool) -> String {
    let s = if b { "Yes" } else { "No" };
    s.to_string()
}

pub fn collection_info_doc(name: &str, info: &CollectionInfo) -> ResultDoc {
    let fields = TableData {
        columns: ["Field", "Type", "Primary key", "Auto ID", "Dimension"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: info
            .schema
            .fields
            .iter()
            .map(|f| {
                vec![
                    CellValue::from(f.name.as_str()),
                    CellValue::from(f.kind.as_str()),
                    CellValue::from(yes_no(f.is_primary_key)),
                    CellValue::from(yes_no(f.auto_id)),
                    CellValue::from(
                        f.dimension
                            .filter(|d| *d > 0)
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                ]
            })
            .collect(),
    };
    ResultDoc::new(format!("Collection info: {name}"))
        .with(DocBlock::Facts(vec![
            ("Name".into(), info.name.clone()),
            ("Entities".into(), info.num_entities.to_string()),
            ("Empty".into(), yes_no(info.is_empty)),
        ]))
        .with(DocBlock::Heading("Fields".into()))
        .with(DocBlock::Table(fields))
}

pub fn collection_data_doc(name: &str, resp: &DataResponse) -> ResultDoc {
    let doc = ResultDoc::new(format!("Collection data: {name}"));
    if resp.data.is_empty() {
        return doc.with(DocBlock::NoData("This collection has no data".into()));
    }
    let total = resp
        .total_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    let shown = resp.returned_count.unwrap_or(resp.data.len() as u64);
    doc.with(DocBlock::Summary(format!(
        "total {total} records, showing {shown}"
    )))
    .with(DocBlock::Table(TableData::from_rows(&resp.data)))
}

/// Shared rendering for embedded-database row results.
pub fn rows_doc(title: &str, rows: &[Row], total: Option<u64>) -> ResultDoc {
    let doc = ResultDoc::new(title);
    if rows.is_empty() {
        return doc.with(DocBlock::NoData("Query returned no data".into()));
    }
    let summary = match total {
        Some(t) if t > 0 => format!("total {t} rows, showing {}", rows.len()),
        _ => format!("{} rows", rows.len()),
    };
    doc.with(DocBlock::Summary(summary))
        .with(DocBlock::Table(TableData::from_rows(rows)))
}

pub fn table_info_doc(info: &TableInfo) -> ResultDoc {
    let dash = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("-")
            .to_string()
    };
    let columns = TableData {
        columns: ["Column", "Type", "Nullable", "Key", "Default"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: info
            .columns
            .iter()
            .map(|c| {
                vec![
                    CellValue::from(c.name.as_str()),
                    CellValue::from(c.kind.as_str()),
                    CellValue::from(dash(&c.null)),
                    CellValue::from(dash(&c.key)),
                    CellValue::from(dash(&c.default)),
                ]
            })
            .collect(),
    };
    ResultDoc::new(format!("Table info: {}", info.table_name))
        .with(DocBlock::Facts(vec![
            ("Table".into(), info.table_name.clone()),
            ("Rows".into(), info.row_count.to_string()),
            ("Columns".into(), info.columns.len().to_string()),
        ]))
        .with(DocBlock::Heading("Columns".into()))
        .with(DocBlock::Table(columns))
}

pub const QUERY_OK: &str = "Query executed successfully";

/// Result of a statement that produced no rows (DDL/DML).
pub fn statement_doc(resp: &QueryResponse) -> ResultDoc {
    let mut doc = ResultDoc::new("Query execution result").with(DocBlock::Success(
        resp.message.clone().unwrap_or_else(|| QUERY_OK.to_string()),
    ));
    if let Some(n) = resp.affected_rows.filter(|n| *n != 0) {
        doc = doc.with(DocBlock::Summary(format!("Affected rows: {n}")));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::{CollectionSchema, ColumnInfo, FieldSchema};
    use serde_json::json;

    fn rows(v: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn columns_follow_first_row_order() {
        let t = TableData::from_rows(&rows(json!([
            {"zeta": 1, "alpha": 2, "mid": null},
            {"alpha": 3, "other": "x"}
        ])));
        assert_eq!(t.columns, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            t.rows[1],
            vec![CellValue::Null, CellValue::Plain("3".into()), CellValue::Null]
        );
    }

    #[test]
    fn collection_info_uses_placeholder_dimension() {
        let info = CollectionInfo {
            name: "docs".into(),
            num_entities: 3,
            is_empty: false,
            schema: CollectionSchema {
                description: None,
                fields: vec![
                    FieldSchema {
                        name: "id".into(),
                        kind: "INT64".into(),
                        is_primary_key: true,
                        auto_id: false,
                        dimension: None,
                    },
                    FieldSchema {
                        name: "vec".into(),
                        kind: "FLOAT_VECTOR".into(),
                        is_primary_key: false,
                        auto_id: false,
                        dimension: Some(128),
                    },
                ],
            },
        };
        let doc = collection_info_doc("docs", &info);
        let t = doc.table().unwrap();
        assert_eq!(t.rows[0][2], CellValue::Plain("Yes".into()));
        assert_eq!(t.rows[0][4], CellValue::Plain("-".into()));
        assert_eq!(t.rows[1][4], CellValue::Plain("128".into()));
        assert!(matches!(&doc.blocks[0], DocBlock::Facts(f) if f[1].1 == "3"));
    }

    #[test]
    fn collection_data_summary_and_empty() {
        let resp = DataResponse {
            data: rows(json!([{"id": 1}])),
            total_count: Some(250),
            returned_count: Some(1),
        };
        let doc = collection_data_doc("docs", &resp);
        assert_eq!(
            doc.blocks[0],
            DocBlock::Summary("total 250 records, showing 1".into())
        );
        let empty = collection_data_doc("docs", &DataResponse::default());
        assert!(empty.table().is_none());
        assert!(matches!(empty.blocks[0], DocBlock::NoData(_)));
    }

    #[test]
    fn rows_summary_depends_on_total() {
        let data = rows(json!([{"a": 1}, {"a": 2}]));
        let doc = rows_doc("T", &data, Some(10));
        assert_eq!(doc.blocks[0], DocBlock::Summary("total 10 rows, showing 2".into()));
        let doc = rows_doc("T", &data, None);
        assert_eq!(doc.blocks[0], DocBlock::Summary("2 rows".into()));
    }

    #[test]
    fn statement_doc_reports_affected_rows() {
        let doc = statement_doc(&QueryResponse {
            message: Some("Deleted".into()),
            affected_rows: Some(4),
            ..Default::default()
        });
        assert_eq!(doc.blocks[0], DocBlock::Success("Deleted".into()));
        assert_eq!(doc.blocks[1], DocBlock::Summary("Affected rows: 4".into()));

        let doc = statement_doc(&QueryResponse::default());
        assert_eq!(doc.blocks, vec![DocBlock::Success(QUERY_OK.into())]);
    }

    #[test]
    fn table_info_fills_missing_with_dash() {
        let doc = table_info_doc(&TableInfo {
            table_name: "users".into(),
            row_count: 12,
            columns: vec![ColumnInfo {
                name: "id".into(),
                kind: "INTEGER".into(),
                null: Some("NO".into()),
                key: None,
                default: Some(String::new()),
            }],
        });
        let t = doc.table().unwrap();
        assert_eq!(
            t.rows[0],
            vec![
                CellValue::from("id"),
                CellValue::from("INTEGER"),
                CellValue::from("NO"),
                CellValue::from("-"),
                CellValue::from("-"),
            ]
        );
    }
}
