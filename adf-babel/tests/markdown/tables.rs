//! GFM tables ↔ ADF tables

use crate::common::{doc, to_adf, to_markdown, types};
use serde_json::json;

fn cell(cell_type: &str, text: &str) -> serde_json::Value {
    json!({"type": cell_type, "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": text}]}
    ]})
}

#[test]
fn test_header_row_and_defaults() {
    let doc = to_adf("| A | B |\n|---|---|\n| 1 | 2 |\n");
    let table = &doc.content[0];
    assert!(table.is("table"));
    assert_eq!(table.attr("isNumberColumnEnabled"), Some(&json!(false)));
    assert_eq!(table.attr_str("layout"), Some("default"));

    let rows = table.children();
    assert_eq!(types(rows), vec!["tableRow", "tableRow"]);
    assert_eq!(types(rows[0].children()), vec!["tableHeader", "tableHeader"]);
    assert_eq!(types(rows[1].children()), vec!["tableCell", "tableCell"]);
    assert_eq!(rows[1].children()[1].plain_text(), "2");
}

#[test]
fn test_br_in_cell_is_a_hard_break() {
    let doc = to_adf("| A |\n|---|\n| one<br>two |\n");
    let cell = &doc.content[0].children()[1].children()[0];
    let paragraph = &cell.children()[0];
    assert_eq!(types(paragraph.children()), vec!["text", "hardBreak", "text"]);
}

#[test]
fn test_simple_table_round_trip() {
    let document = doc(json!([
        {"type": "table", "attrs": {"isNumberColumnEnabled": false, "layout": "default"}, "content": [
            {"type": "tableRow", "content": [cell("tableHeader", "Name"), cell("tableHeader", "Role")]},
            {"type": "tableRow", "content": [cell("tableCell", "Ada"), cell("tableCell", "Engineer")]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(!markdown.contains("<!--"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_header_less_table_forces_cell_types() {
    let document = doc(json!([
        {"type": "table", "attrs": {"isNumberColumnEnabled": false, "layout": "default"}, "content": [
            {"type": "tableRow", "content": [cell("tableCell", "a"), cell("tableCell", "b")]},
            {"type": "tableRow", "content": [cell("tableCell", "c"), cell("tableCell", "d")]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("<!-- adf:tableCell -->"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_cell_attributes_round_trip() {
    let document = doc(json!([
        {"type": "table", "attrs": {"isNumberColumnEnabled": true, "layout": "wide"}, "content": [
            {"type": "tableRow", "content": [
                {"type": "tableHeader", "attrs": {"background": "#deebff"}, "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "H"}]}
                ]},
                cell("tableHeader", "I")
            ]},
            {"type": "tableRow", "content": [cell("tableCell", "x"), cell("tableCell", "y")]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("<!-- adf:table"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_hard_break_in_cell_round_trip() {
    let document = doc(json!([
        {"type": "table", "attrs": {"isNumberColumnEnabled": false, "layout": "default"}, "content": [
            {"type": "tableRow", "content": [cell("tableHeader", "H")]},
            {"type": "tableRow", "content": [
                {"type": "tableCell", "content": [
                    {"type": "paragraph", "content": [
                        {"type": "text", "text": "one"},
                        {"type": "hardBreak"},
                        {"type": "text", "text": "two"}
                    ]}
                ]}
            ]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("one<br>two"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_spanning_cells_are_padded() {
    let document = doc(json!([
        {"type": "table", "content": [
            {"type": "tableRow", "content": [cell("tableHeader", "A"), cell("tableHeader", "B")]},
            {"type": "tableRow", "content": [
                {"type": "tableCell", "attrs": {"colspan": 2}, "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "wide"}]}
                ]}
            ]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    let back = to_adf(&markdown);
    let row = &back.content[0].children()[1];
    assert_eq!(row.children().len(), 2);
    assert_eq!(row.children()[0].attr("colspan"), Some(&json!(2)));
}
