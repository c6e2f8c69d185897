//! Annotation comments: ADF attributes markdown cannot express

use crate::common::{doc, to_adf, to_markdown};
use adf_babel::adf::Mark;
use adf_babel::{ConvertOptions, Converter, Stage};
use serde_json::json;

#[test]
fn test_heading_attributes_round_trip() {
    let document = doc(json!([
        {"type": "heading", "attrs": {"level": 1, "id": "x", "textAlign": "center"},
         "content": [{"type": "text", "text": "Title"}]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.starts_with("<!-- adf:heading"), "{markdown}");
    assert!(markdown.contains("# Title"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_block_annotation_on_paragraph() {
    let doc = to_adf("<!-- adf:paragraph id=\"p1\" -->\nText\n");
    assert_eq!(doc.content.len(), 1);
    assert_eq!(doc.content[0].attr_str("id"), Some("p1"));
}

#[test]
fn test_span_marks() {
    let doc = to_adf(
        "Some <!-- adf:span underline=true textColor=\"#ff0000\" -->red<!-- /adf:span --> text.\n",
    );
    let red = doc.content[0]
        .children()
        .iter()
        .find(|n| n.text.as_deref() == Some("red"))
        .unwrap();
    assert_eq!(
        red.marks(),
        &[
            Mark::new(Mark::UNDERLINE),
            Mark::new(Mark::TEXT_COLOR).with_attr("color", "#ff0000"),
        ]
    );
    assert_eq!(doc.content[0].plain_text(), "Some red text.");
}

#[test]
fn test_span_marks_round_trip() {
    let document = doc(json!([
        {"type": "paragraph", "content": [
            {"type": "text", "text": "plain "},
            {"type": "text", "text": "under", "marks": [{"type": "underline"}]},
            {"type": "text", "text": " and "},
            {"type": "text", "text": "sub", "marks": [{"type": "subsup", "attrs": {"type": "sub"}}]}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("<!-- /adf:span -->"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_block_marks_round_trip() {
    let document = doc(json!([
        {"type": "paragraph",
         "marks": [{"type": "alignment", "attrs": {"align": "end"}}],
         "content": [{"type": "text", "text": "Right"}]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("attrs='"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}

#[test]
fn test_malformed_json_warns_and_keeps_the_string() {
    let conversion = Converter::default()
        .convert("<!-- adf:paragraph attrs='{not json' -->\nText\n")
        .unwrap();
    let paragraph = &conversion.document.content[0];
    assert_eq!(paragraph.attr_str("attrs"), Some("{not json"));
    assert_eq!(paragraph.plain_text(), "Text");
    assert!(conversion
        .warnings
        .iter()
        .any(|warning| warning.stage == Stage::Annotations));
}

#[test]
fn test_mismatched_kind_is_a_warning() {
    let conversion = Converter::default()
        .convert("<!-- adf:heading id=\"x\" -->\nJust text\n")
        .unwrap();
    assert_eq!(conversion.document.content[0].attr("id"), None);
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].stage, Stage::Annotations);
}

#[test]
fn test_custom_namespace() {
    let converter = Converter::new(ConvertOptions {
        namespace: "x".to_string(),
        ..ConvertOptions::default()
    });
    let doc = converter
        .convert("<!-- x:heading id=\"a\" -->\n# One\n\n<!-- adf:heading id=\"b\" -->\n# Two\n")
        .unwrap()
        .document;
    assert_eq!(doc.content[0].attr_str("id"), Some("a"));
    let headings: Vec<_> = doc.content.iter().filter(|n| n.is("heading")).collect();
    assert_eq!(headings[1].attr("id"), None);

    let markdown = converter.convert_reverse(&doc).unwrap();
    assert!(markdown.contains("<!-- x:heading id=\"a\" -->"), "{markdown}");
}

#[test]
fn test_media_attributes_round_trip() {
    let document = doc(json!([
        {"type": "mediaSingle", "attrs": {"layout": "center"}, "content": [
            {"type": "media", "attrs": {
                "type": "file", "id": "abc", "collection": "c1", "width": 640, "alt": "chart"
            }}
        ]}
    ]));
    let markdown = to_markdown(&document);
    assert!(markdown.contains("![chart](media:abc)"), "{markdown}");
    assert!(markdown.contains("<!-- adf:media"), "{markdown}");
    assert_eq!(to_adf(&markdown), document);
}
