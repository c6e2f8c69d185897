//! Container fences: panel, expand, nestedExpand, mediaSingle, mediaGroup

use crate::common::{to_adf, types};
use adf_babel::{ConvertOptions, Converter, Stage};
use serde_json::json;

#[test]
fn test_panel_type_becomes_panel_type_attribute() {
    let doc = to_adf("~~~panel type=warning\nCareful **now**.\n~~~\n");
    let panel = &doc.content[0];
    assert!(panel.is("panel"));
    assert_eq!(panel.attr_str("panelType"), Some("warning"));
    assert_eq!(panel.attr("type"), None);
    assert_eq!(types(panel.children()), vec!["paragraph"]);
}

#[test]
fn test_panel_without_type_is_info() {
    let doc = to_adf("~~~panel\nNote\n~~~\n");
    assert_eq!(doc.content[0].attr_str("panelType"), Some("info"));
}

#[test]
fn test_graded_fences_nest() {
    let doc = to_adf("~~~~expand title=\"More\"\n~~~panel type=note\nInner\n~~~\n~~~~\n");
    assert_eq!(types(&doc.content), vec!["expand"]);
    let expand = &doc.content[0];
    assert_eq!(expand.attr_str("title"), Some("More"));
    let panel = &expand.children()[0];
    assert!(panel.is("panel"));
    assert_eq!(panel.attr_str("panelType"), Some("note"));
    assert_eq!(panel.plain_text(), "Inner");
}

#[test]
fn test_same_length_fences_nest() {
    let source = "~~~expand title=\"Outer\"\n~~~panel type=info\n~~~expand title=\"Inner\"\nDeep content\n~~~\n~~~\n~~~\n";
    let conversion = Converter::default().convert(source).unwrap();
    assert!(conversion.warnings.is_empty(), "{:?}", conversion.warnings);

    let doc = conversion.document;
    assert_eq!(types(&doc.content), vec!["expand"]);
    let panel = &doc.content[0].children()[0];
    assert!(panel.is("panel"));
    let inner = &panel.children()[0];
    assert!(inner.is("expand"));
    assert_eq!(inner.plain_text(), "Deep content");
}

#[test]
fn test_content_after_inner_close_stays_in_the_outer_container() {
    let doc = to_adf("~~~panel\n~~~expand\nx\n~~~\nafter inner\n~~~\noutside\n");
    assert_eq!(types(&doc.content), vec!["panel", "paragraph"]);
    assert_eq!(types(doc.content[0].children()), vec!["expand", "paragraph"]);
    assert_eq!(doc.content[1].plain_text(), "outside");
}

#[test]
fn test_consecutive_panels_are_siblings() {
    let doc = to_adf("~~~panel\none\n~~~\n\n~~~panel\ntwo\n~~~\n");
    assert_eq!(types(&doc.content), vec!["panel", "panel"]);
}

#[test]
fn test_media_group() {
    let doc = to_adf("~~~mediaGroup\n![a](media:one) ![b](media:two)\n~~~\n");
    let group = &doc.content[0];
    assert!(group.is("mediaGroup"));
    let ids: Vec<_> = group.children().iter().map(|m| m.attr_str("id")).collect();
    assert_eq!(ids, vec![Some("one"), Some("two")]);
    assert_eq!(group.children()[0].attr_str("type"), Some("file"));
}

#[test]
fn test_media_single_fence() {
    let doc = to_adf("~~~mediaSingle layout=wide width=80\n![chart](media:c-1)\n~~~\n");
    let single = &doc.content[0];
    assert!(single.is("mediaSingle"));
    assert_eq!(single.attr_str("layout"), Some("wide"));
    assert_eq!(single.attr("width"), Some(&json!(80)));
    let media = &single.children()[0];
    assert_eq!(media.attr_str("id"), Some("c-1"));
    assert_eq!(media.attr_str("alt"), Some("chart"));
}

#[test]
fn test_regular_code_blocks_are_not_containers() {
    let doc = to_adf("~~~python\nprint(1)\n~~~\n");
    assert!(doc.content[0].is("codeBlock"));
    assert_eq!(doc.content[0].attr_str("language"), Some("python"));
}

#[test]
fn test_exhausted_passes_leave_literal_code() {
    let converter = Converter::new(ConvertOptions {
        max_fence_passes: 1,
        ..ConvertOptions::default()
    });
    let conversion = converter
        .convert("~~~~panel\n~~~expand\ndeep\n~~~\n~~~~\n")
        .unwrap();
    let panel = &conversion.document.content[0];
    assert!(panel.is("panel"));
    let literal = &panel.children()[0];
    assert!(literal.is("codeBlock"));
    assert!(literal.plain_text().starts_with("~~~expand"));
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].stage, Stage::Fences);
}

#[test]
fn test_exhausted_passes_warn_even_in_strict_mode() {
    let converter = Converter::new(ConvertOptions {
        max_fence_passes: 1,
        ..ConvertOptions::strict()
    });
    let conversion = converter
        .convert("~~~~panel\n~~~expand\ndeep\n~~~\n~~~~\n")
        .unwrap();
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].stage, Stage::Fences);
}

#[tracing_test::traced_test]
#[test]
fn test_exhausted_passes_are_logged() {
    let converter = Converter::new(ConvertOptions {
        max_fence_passes: 1,
        ..ConvertOptions::default()
    });
    converter
        .convert("~~~~panel\n~~~expand\ndeep\n~~~\n~~~~\n")
        .unwrap();
    assert!(logs_contain("resolution passes"));
}
