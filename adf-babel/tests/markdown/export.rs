//! ADF → markdown

use crate::common::{doc, strict, to_markdown};
use adf_babel::adf::Document;
use adf_babel::{ConvertError, Converter, Stage};
use serde_json::json;

#[test]
fn test_heading_and_paragraph() {
    let document = doc(json!([
        {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Title"}]},
        {"type": "paragraph", "content": [
            {"type": "text", "text": "Hello "},
            {"type": "text", "text": "world", "marks": [{"type": "strong"}]}
        ]}
    ]));
    assert_eq!(to_markdown(&document), "## Title\n\nHello **world**\n");
}

#[test]
fn test_empty_document_is_empty_text() {
    assert_eq!(to_markdown(&Document::empty()), "");
}

#[test]
fn test_social_nodes_are_written_as_tokens() {
    let document = doc(json!([
        {"type": "paragraph", "content": [
            {"type": "mention", "attrs": {"id": "abc", "text": "@Alice"}},
            {"type": "text", "text": " "},
            {"type": "emoji", "attrs": {"shortName": ":smile:", "id": "1f604", "text": "😄"}},
            {"type": "text", "text": " "},
            {"type": "date", "attrs": {"timestamp": "1705276800000"}}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("{user:abc}"), "{markdown}");
    assert!(markdown.contains(":smile:"), "{markdown}");
    assert!(markdown.contains("{date:2024-01-15}"), "{markdown}");
}

#[test]
fn test_panel_becomes_fence() {
    let document = doc(json!([
        {"type": "panel", "attrs": {"panelType": "warning"}, "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "Careful"}]}
        ]}
    ]));
    assert_eq!(
        to_markdown(&document).trim_end(),
        "~~~panel type=\"warning\"\nCareful\n~~~"
    );
}

#[test]
fn test_nested_containers_grade_their_fences() {
    let document = doc(json!([
        {"type": "expand", "attrs": {"title": "More"}, "content": [
            {"type": "panel", "attrs": {"panelType": "note"}, "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Inner"}]}
            ]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.starts_with("~~~~expand title=\"More\"\n~~~panel type=\"note\"\n"), "{markdown}");
    assert!(markdown.trim_end().ends_with("~~~\n~~~~"), "{markdown}");
}

#[test]
fn test_code_block_language() {
    let document = doc(json!([
        {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [
            {"type": "text", "text": "fn main() {}"}
        ]}
    ]));
    assert_eq!(to_markdown(&document), "```rust\nfn main() {}\n```\n");
}

#[test]
fn test_task_list_checkboxes() {
    let document = doc(json!([
        {"type": "taskList", "attrs": {"localId": "l1"}, "content": [
            {"type": "taskItem", "attrs": {"localId": "t1", "state": "DONE"}, "content": [
                {"type": "text", "text": "ship"}
            ]},
            {"type": "taskItem", "attrs": {"localId": "t2", "state": "TODO"}, "content": [
                {"type": "text", "text": "review"}
            ]}
        ]}
    ]));
    assert_eq!(to_markdown(&document), "- [x] ship\n- [ ] review\n");
}

#[test]
fn test_unknown_block_keeps_a_placeholder() {
    let document = doc(json!([
        {"type": "extension", "attrs": {"extensionKey": "toc"}},
        {"type": "paragraph", "content": [{"type": "text", "text": "after"}]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("extension"), "{markdown}");
    assert!(markdown.contains("after"), "{markdown}");
}

#[test]
fn test_unknown_block_fails_in_strict_mode() {
    let document = doc(json!([{"type": "extension"}]));
    let err = strict().convert_reverse(&document).unwrap_err();
    assert!(matches!(err, ConvertError::Stage { stage: Stage::Mapping, .. }));
}

#[test]
fn test_root_must_be_a_doc() {
    let mut document = doc(json!([
        {"type": "paragraph", "content": [{"type": "text", "text": "x"}]}
    ]));
    document.doc_type = "paragraph".to_string();

    assert_eq!(Converter::default().convert_reverse(&document).unwrap(), "x\n");
    let err = strict().convert_reverse(&document).unwrap_err();
    assert!(matches!(err, ConvertError::Stage { stage: Stage::Input, .. }));
}

#[test]
fn test_crate_level_convert_reverse() {
    let document = doc(json!([{"type": "rule"}]));
    let markdown = adf_babel::convert_reverse(&document).unwrap();
    assert!(markdown.trim_end().chars().all(|c| c == '-' || c == '*'), "{markdown}");
}
