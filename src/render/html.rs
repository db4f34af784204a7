//! HTML markup for result documents.
//!
//! Every piece of text that reaches the markup, including column names and
//! tooltip attributes, goes through [`escape_into`].

use super::cell::{CellValue, ELLIPSIS, NULL_MARKER};
use super::document::{DocBlock, ResultDoc, TableData};

pub fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

fn no_data(out: &mut String, text: &str) {
    out.push_str("<p class=\"no-data\">");
    escape_into(out, text);
    out.push_str("</p>");
}

fn cell_into(out: &mut String, cell: &CellValue) {
    match cell {
        CellValue::Null => {
            out.push_str("<span class=\"null-value\">");
            out.push_str(NULL_MARKER);
            out.push_str("</span>");
        }
        CellValue::Json(s) => {
            out.push_str("<span class=\"json-value\">");
            escape_into(out, s);
            out.push_str("</span>");
        }
        CellValue::Truncated { shown, full } => {
            out.push_str("<span class=\"long-text\" title=\"");
            escape_into(out, full);
            out.push_str("\">");
            escape_into(out, shown);
            out.push_str(ELLIPSIS);
            out.push_str("</span>");
        }
        CellValue::Plain(s) => escape_into(out, s),
    }
}

/// Render a row set as an HTML table; a set with no rows and no columns renders
/// a "no data" paragraph instead.
pub fn render_table(table: &TableData, title: &str) -> String {
    let mut out = String::new();
    if table.is_empty() && table.columns.is_empty() {
        no_data(&mut out, "No data");
        return out;
    }
    out.push_str("<div class=\"table-container\">\n<table class=\"data-table\" aria-label=\"");
    escape_into(&mut out, title);
    out.push_str("\">\n<thead>\n<tr>");
    for col in &table.columns {
        out.push_str("<th>");
        escape_into(&mut out, col);
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            cell_into(&mut out, cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</div>");
    out
}

/// Markup for a whole result container.
pub fn render_doc(doc: &ResultDoc) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"data-summary\">\n<h4>");
    escape_into(&mut out, &doc.title);
    out.push_str("</h4>\n");
    for block in &doc.blocks {
        match block {
            DocBlock::Summary(s) => {
                out.push_str("<p>");
                escape_into(&mut out, s);
                out.push_str("</p>\n");
            }
            DocBlock::Facts(items) => {
                out.push_str("<div class=\"info-grid\">\n");
                for (k, v) in items {
                    out.push_str("<div class=\"info-item\"><strong>");
                    escape_into(&mut out, k);
                    out.push_str(":</strong> ");
                    escape_into(&mut out, v);
                    out.push_str("</div>\n");
                }
                out.push_str("</div>\n");
            }
            DocBlock::Heading(h) => {
                out.push_str("<h5>");
                escape_into(&mut out, h);
                out.push_str("</h5>\n");
            }
            DocBlock::Table(t) => {
                out.push_str(&render_table(t, &doc.title));
                out.push('\n');
            }
            DocBlock::NoData(s) => {
                no_data(&mut out, s);
                out.push('\n');
            }
            DocBlock::Success(s) => {
                out.push_str("<p class=\"success-message\">");
                escape_into(&mut out, s);
                out.push_str("</p>\n");
            }
        }
    }
    out.push_str("</div>");
    out
}

const PAGE_STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table.data-table{border-collapse:collapse}\
.data-table th,.data-table td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
.null-value{color:#999;font-style:italic}\
.json-value{font-family:monospace;color:#8e44ad}\
.no-data{color:#7f8c8d}\
.success-message{color:#27ae60}";

/// Standalone HTML page used for exports.
pub fn render_page(doc: &ResultDoc) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    escape_into(&mut out, &doc.title);
    out.push_str("</title>\n<style>");
    out.push_str(PAGE_STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&render_doc(doc));
    out.push_str("\n</body>\n</html>\n");
    out
}
