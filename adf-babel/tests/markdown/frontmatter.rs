//! Frontmatter: YAML metadata ahead of the document body

use crate::common::{doc, strict, types};
use adf_babel::{ConvertError, Converter, Stage};
use serde_json::json;

#[test]
fn test_frontmatter_is_returned_next_to_the_document() {
    let conversion = Converter::default()
        .convert("---\ntitle: Notes\ntags:\n  - a\n  - b\n---\n\n# Body\n")
        .unwrap();
    assert_eq!(
        conversion.frontmatter,
        Some(json!({"title": "Notes", "tags": ["a", "b"]}))
    );
    assert_eq!(types(&conversion.document.content), vec!["heading"]);
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_no_frontmatter() {
    let conversion = Converter::default().convert("# Body\n").unwrap();
    assert_eq!(conversion.frontmatter, None);
}

#[test]
fn test_malformed_frontmatter_is_ignored_with_a_warning() {
    let conversion = Converter::default()
        .convert("---\ntitle: [unclosed\n---\n\nBody\n")
        .unwrap();
    assert_eq!(conversion.frontmatter, None);
    assert_eq!(conversion.document.content[0].plain_text(), "Body");
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].stage, Stage::Frontmatter);
}

#[test]
fn test_malformed_frontmatter_fails_in_strict_mode() {
    let err = strict()
        .convert("---\ntitle: [unclosed\n---\n\nBody\n")
        .unwrap_err();
    assert!(matches!(err, ConvertError::Stage { stage: Stage::Frontmatter, .. }));
}

#[test]
fn test_reverse_writes_frontmatter_first() {
    let document = doc(json!([
        {"type": "paragraph", "content": [{"type": "text", "text": "Body"}]}
    ]));
    let frontmatter = json!({"title": "Notes"});
    let markdown = Converter::default()
        .convert_reverse_with_frontmatter(&document, Some(&frontmatter))
        .unwrap();
    assert!(markdown.starts_with("---\ntitle: Notes\n---\n"), "{markdown}");
    assert!(markdown.trim_end().ends_with("Body"), "{markdown}");

    let conversion = Converter::default().convert(&markdown).unwrap();
    assert_eq!(conversion.frontmatter, Some(frontmatter));
    assert_eq!(conversion.document, document);
}

#[tokio::test]
async fn test_convert_async_matches_convert() {
    let source = "---\nowner: ops\n---\n\nHello {user:abc}\n";
    let converter = Converter::default();
    let asynchronous = converter.convert_async(source).await.unwrap();
    let synchronous = converter.convert(source).unwrap();
    assert_eq!(asynchronous, synchronous);
    assert_eq!(asynchronous.frontmatter, Some(json!({"owner": "ops"})));
}
