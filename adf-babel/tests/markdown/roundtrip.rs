//! ADF → markdown → ADF, and markdown → ADF → markdown

use crate::common::{doc, strip_local_ids, to_adf, to_markdown};
use serde_json::json;

#[test]
fn test_kitchen_sink_document() {
    let document = doc(json!([
        {"type": "heading", "attrs": {"level": 1, "id": "intro"}, "content": [
            {"type": "text", "text": "Release notes"}
        ]},
        {"type": "paragraph", "content": [
            {"type": "text", "text": "Read "},
            {"type": "text", "text": "carefully", "marks": [{"type": "strong"}]},
            {"type": "text", "text": " and see "},
            {"type": "text", "text": "the docs", "marks": [{"type": "link", "attrs": {"href": "https://example.com/docs"}}]},
            {"type": "text", "text": " now"}
        ]},
        {"type": "bulletList", "content": [
            {"type": "listItem", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "first"}]}
            ]},
            {"type": "listItem", "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "second"}]}
            ]}
        ]},
        {"type": "panel", "attrs": {"panelType": "success"}, "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "Shipped"}]}
        ]},
        {"type": "codeBlock", "attrs": {"language": "json"}, "content": [
            {"type": "text", "text": "{\"ok\": true}"}
        ]},
        {"type": "rule"},
        {"type": "paragraph", "content": [
            {"type": "text", "text": "Owner "},
            {"type": "mention", "attrs": {"id": "557058:abc"}},
            {"type": "text", "text": " "},
            {"type": "emoji", "attrs": {"shortName": ":smile:", "id": "1f604", "text": "😄"}},
            {"type": "text", "text": " due "},
            {"type": "date", "attrs": {"timestamp": "1705276800000"}},
            {"type": "text", "text": " "},
            {"type": "status", "attrs": {"text": "Done", "color": "green"}}
        ]}
    ]));

    let markdown = to_markdown(&document);
    assert_eq!(to_adf(&markdown), document, "{markdown}");
}

#[test]
fn test_task_lists_keep_structure() {
    let mut document = doc(json!([
        {"type": "taskList", "attrs": {"localId": "list"}, "content": [
            {"type": "taskItem", "attrs": {"localId": "a", "state": "TODO"}, "content": [
                {"type": "text", "text": "draft"}
            ]},
            {"type": "taskList", "attrs": {"localId": "nested"}, "content": [
                {"type": "taskItem", "attrs": {"localId": "b", "state": "DONE"}, "content": [
                    {"type": "text", "text": "outline"}
                ]}
            ]},
            {"type": "taskItem", "attrs": {"localId": "c", "state": "DONE"}, "content": [
                {"type": "text", "text": "publish"}
            ]}
        ]}
    ]));
    let mut back = to_adf(&to_markdown(&document));
    strip_local_ids(&mut document.content);
    strip_local_ids(&mut back.content);
    assert_eq!(back, document);
}

#[test]
fn test_nested_containers() {
    let document = doc(json!([
        {"type": "expand", "attrs": {"title": "Details"}, "content": [
            {"type": "panel", "attrs": {"panelType": "note"}, "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "Inside"}]}
            ]},
            {"type": "paragraph", "content": [{"type": "text", "text": "After the panel"}]}
        ]},
        {"type": "paragraph", "content": [{"type": "text", "text": "Outside"}]}
    ]));
    assert_eq!(to_adf(&to_markdown(&document)), document);
}

#[test]
fn test_wide_media_single() {
    let document = doc(json!([
        {"type": "mediaSingle", "attrs": {"layout": "wide", "width": 80}, "content": [
            {"type": "media", "attrs": {"type": "file", "id": "abc", "collection": ""}}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.starts_with("~~~mediaSingle"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_media_group() {
    let document = doc(json!([
        {"type": "mediaGroup", "content": [
            {"type": "media", "attrs": {"type": "file", "id": "one", "collection": "", "alt": "a"}},
            {"type": "media", "attrs": {"type": "file", "id": "two", "collection": ""}}
        ]}
    ]));
    assert_eq!(to_adf(&to_markdown(&document)), document);
}

#[test]
fn test_markdown_is_stable_after_one_cycle() {
    let source = "# Plan\n\nShip it by {date:2024-06-30} with {user:abc} :rocket:\n\n~~~panel type=\"warning\"\nCheck **twice**\n~~~\n\n| Step | Owner |\n|---|---|\n| build | ci |\n";
    let first = to_markdown(&to_adf(source));
    let second = to_markdown(&to_adf(&first));
    assert_eq!(first, second);
}

fn titled_expand(title: &str) -> serde_json::Value {
    json!({"type": "expand", "attrs": {"title": title}, "content": [
        {"type": "paragraph", "content": [{"type": "text", "text": "body"}]}
    ]})
}

#[test]
fn test_container_titles_with_quotes_and_backslashes() {
    for title in [r#"Say "hi""#, r"C:\dir", r#"a "b" \ c & d"#] {
        let document = doc(json!([titled_expand(title)]));
        let markdown = to_markdown(&document);
        assert_eq!(to_adf(&markdown), document, "{markdown}");
    }
}

#[test]
fn test_nested_container_titles_with_quotes_and_backslashes() {
    for title in [r#"a "b""#, r"C:\dir\sub", r#"say \"x\""#] {
        let document = doc(json!([
            {"type": "panel", "attrs": {"panelType": "info"}, "content": [
                titled_expand(title)
            ]}
        ]));
        let markdown = to_markdown(&document);
        assert_eq!(to_adf(&markdown), document, "{markdown}");
    }
}
