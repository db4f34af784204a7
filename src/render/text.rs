//! Plain-text forms of a result document, used for clipboard copies.

use super::document::{DocBlock, ResultDoc};

fn tsv_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Tab-separated rendering. Tables carry full, untruncated cell text.
pub fn to_tsv(doc: &ResultDoc) -> String {
    let mut out = String::new();
    out.push_str(&doc.title);
    out.push('\n');
    for block in &doc.blocks {
        match block {
            DocBlock::Summary(s) | DocBlock::Heading(s) | DocBlock::NoData(s) | DocBlock::Success(s) => {
                out.push_str(s);
                out.push('\n');
            }
            DocBlock::Facts(items) => {
                for (k, v) in items {
                    out.push_str(&format!("{k}\t{v}\n"));
                }
            }
            DocBlock::Table(t) => {
                let header: Vec<String> = t.columns.iter().map(|c| tsv_field(c)).collect();
                out.push_str(&header.join("\t"));
                out.push('\n');
                for row in &t.rows {
                    let cells: Vec<String> = row.iter().map(|c| tsv_field(c.full_text())).collect();
                    out.push_str(&cells.join("\t"));
                    out.push('\n');
                }
            }
        }
    }
    out
}
