//! Format registry: conversion by format name

use adf_babel::adf::Document;
use adf_babel::{ConvertError, ConvertOptions, FormatRegistry};

#[test]
fn test_markdown_to_adf_json() {
    let registry = FormatRegistry::default();
    let json = registry.convert("# Title\n\nHi {user:abc}\n", "markdown", "adf").unwrap();
    let document = Document::from_json(&json).unwrap();
    assert_eq!(document.content[0].node_type, "heading");
    assert_eq!(document.content[1].children()[1].node_type, "mention");
}

#[test]
fn test_adf_json_to_markdown() {
    let registry = FormatRegistry::default();
    let json = r#"{"version":1,"type":"doc","content":[
        {"type":"paragraph","content":[{"type":"text","text":"Hello"}]}
    ]}"#;
    assert_eq!(registry.convert(json, "adf", "markdown").unwrap(), "Hello\n");
}

#[test]
fn test_invalid_json_is_an_error() {
    let registry = FormatRegistry::default();
    let result = registry.convert("{not json", "adf", "markdown");
    assert!(matches!(result, Err(ConvertError::Json(_))));
}

#[test]
fn test_unknown_format() {
    let registry = FormatRegistry::default();
    assert!(matches!(
        registry.convert("x", "markdown", "docx"),
        Err(ConvertError::FormatNotFound(name)) if name == "docx"
    ));
}

#[test]
fn test_detection_drives_conversion() {
    let registry = FormatRegistry::with_options(ConvertOptions::strict());
    let from = registry.detect_format_from_filename("notes.md").unwrap();
    let to = registry.detect_format_from_filename("page.adf").unwrap();
    assert!(registry.convert("plain", &from, &to).is_ok());
    assert!(registry.convert("", &from, &to).is_err());
}
