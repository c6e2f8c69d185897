//! Markdown → ADF: block and inline mapping

use crate::common::{strict, to_adf, types};
use adf_babel::adf::Mark;
use adf_babel::{ConvertError, Converter, Stage};
use serde_json::json;

#[test]
fn test_headings_and_marks() {
    let doc = to_adf("## Title\n\nHello **world** and _you_ ~~not~~ `code`.\n");
    assert_eq!(types(&doc.content), vec!["heading", "paragraph"]);
    assert_eq!(doc.content[0].attr("level"), Some(&json!(2)));

    let inline = doc.content[1].children();
    let strong = inline.iter().find(|n| n.text.as_deref() == Some("world")).unwrap();
    assert_eq!(strong.marks(), &[Mark::new(Mark::STRONG)]);
    let em = inline.iter().find(|n| n.text.as_deref() == Some("you")).unwrap();
    assert_eq!(em.marks(), &[Mark::new(Mark::EM)]);
    let strike = inline.iter().find(|n| n.text.as_deref() == Some("not")).unwrap();
    assert_eq!(strike.marks(), &[Mark::new(Mark::STRIKE)]);
    let code = inline.iter().find(|n| n.text.as_deref() == Some("code")).unwrap();
    assert_eq!(code.marks(), &[Mark::code()]);
}

#[test]
fn test_links_become_link_marks() {
    let doc = to_adf("See [the docs](https://example.com \"Docs\").\n");
    let link = doc.content[0]
        .children()
        .iter()
        .find(|n| n.text.as_deref() == Some("the docs"))
        .unwrap();
    assert_eq!(link.marks(), &[Mark::link("https://example.com", Some("Docs"))]);
}

#[test]
fn test_code_is_exclusive() {
    let doc = to_adf("***`x`***\n");
    let text = &doc.content[0].children()[0];
    assert_eq!(text.text.as_deref(), Some("x"));
    assert_eq!(text.marks(), &[Mark::code()]);
}

#[test]
fn test_social_tokens() {
    let doc = to_adf("Ping {user:557058:abc} on {date:2024-01-15} {status:In progress|color:blue} :smile:\n");
    let inline = doc.content[0].children();
    assert_eq!(
        types(inline),
        vec!["text", "mention", "text", "date", "text", "status", "text", "emoji"]
    );
    assert_eq!(inline[1].attr_str("id"), Some("557058:abc"));
    assert_eq!(inline[3].attr_str("timestamp"), Some("1705276800000"));
    assert_eq!(inline[5].attr_str("text"), Some("In progress"));
    assert_eq!(inline[5].attr_str("color"), Some("blue"));
    assert_eq!(inline[7].attr_str("shortName"), Some(":smile:"));
    assert_eq!(inline[7].attr_str("text"), Some("😄"));
}

#[test]
fn test_bare_dates_are_dates() {
    let doc = to_adf("Due 2024-03-01.\n");
    let inline = doc.content[0].children();
    assert_eq!(types(inline), vec!["text", "date", "text"]);
    assert_eq!(inline[2].text.as_deref(), Some("."));
}

#[test]
fn test_unknown_status_color_is_neutral() {
    let doc = to_adf("{status:Odd|color:magenta}\n");
    assert_eq!(doc.content[0].children()[0].attr_str("color"), Some("neutral"));
}

#[test]
fn test_status_text_may_contain_pipes() {
    let doc = to_adf("{status:A|B|color:red}\n");
    let status = &doc.content[0].children()[0];
    assert!(status.is("status"));
    assert_eq!(status.attr_str("text"), Some("A|B"));
    assert_eq!(status.attr_str("color"), Some("red"));
}

#[test]
fn test_task_list() {
    let doc = to_adf("- [ ] open\n- [x] done\n");
    let list = &doc.content[0];
    assert!(list.is("taskList"));
    assert!(list.attr_str("localId").is_some());
    let states: Vec<_> = list.children().iter().map(|i| i.attr_str("state")).collect();
    assert_eq!(states, vec![Some("TODO"), Some("DONE")]);
    assert_eq!(list.children()[1].plain_text(), "done");
}

#[test]
fn test_lists() {
    let doc = to_adf("- a\n- b\n\n3. c\n4. d\n\n1) e\n");
    assert_eq!(types(&doc.content), vec!["bulletList", "orderedList", "orderedList"]);
    assert_eq!(doc.content[1].attr("order"), Some(&json!(3)));
    assert_eq!(doc.content[2].attr("order"), None);
    assert_eq!(types(doc.content[0].children()), vec!["listItem", "listItem"]);
    assert_eq!(types(doc.content[0].children()[0].children()), vec!["paragraph"]);
}

#[test]
fn test_code_block_language() {
    let doc = to_adf("```rust\nfn main() {}\n```\n\n```\nplain\n```\n");
    assert_eq!(doc.content[0].attr_str("language"), Some("rust"));
    assert_eq!(doc.content[0].plain_text(), "fn main() {}");
    assert_eq!(doc.content[1].attr("language"), None);
}

#[test]
fn test_media_reference_is_lifted_out_of_the_paragraph() {
    let doc = to_adf("Before ![diagram](media:abc-123) after\n");
    assert_eq!(types(&doc.content), vec!["paragraph", "mediaSingle", "paragraph"]);
    let media = &doc.content[1].children()[0];
    assert_eq!(media.attr_str("type"), Some("file"));
    assert_eq!(media.attr_str("id"), Some("abc-123"));
    assert_eq!(media.attr_str("alt"), Some("diagram"));
}

#[test]
fn test_external_image() {
    let doc = to_adf("![logo](https://example.com/logo.png)\n");
    assert_eq!(types(&doc.content), vec!["mediaSingle"]);
    assert_eq!(doc.content[0].attr_str("layout"), Some("center"));
    let media = &doc.content[0].children()[0];
    assert_eq!(media.attr_str("type"), Some("external"));
    assert_eq!(media.attr_str("url"), Some("https://example.com/logo.png"));
}

#[test]
fn test_inline_card() {
    let doc = to_adf("[PROJ-1](card:https://jira.example.com/browse/PROJ-1)\n");
    let card = &doc.content[0].children()[0];
    assert!(card.is("inlineCard"));
    assert_eq!(card.attr_str("url"), Some("https://jira.example.com/browse/PROJ-1"));
}

#[test]
fn test_blockquote_rule_and_hard_break() {
    let doc = to_adf("> quoted\n\n---\n\nline one  \nline two\n");
    assert_eq!(types(&doc.content), vec!["blockquote", "rule", "paragraph"]);
    assert_eq!(
        types(doc.content[2].children()),
        vec!["text", "hardBreak", "text"]
    );
}

#[test]
fn test_raw_html_becomes_placeholder_with_warning() {
    let conversion = Converter::default()
        .convert("<div>custom</div>\n\nafter\n")
        .unwrap();
    assert_eq!(types(&conversion.document.content), vec!["paragraph", "paragraph"]);
    assert!(conversion.document.content[0].plain_text().contains("custom"));
    assert_eq!(conversion.warnings.len(), 1);
    assert_eq!(conversion.warnings[0].stage, Stage::Mapping);
}

#[test]
fn test_raw_html_fails_in_strict_mode() {
    let err = strict().convert("<div>custom</div>\n").unwrap_err();
    assert!(matches!(err, ConvertError::Stage { stage: Stage::Mapping, .. }));
}

#[test]
fn test_plain_comments_are_ignored() {
    let conversion = Converter::default()
        .convert("<!-- a note for editors -->\n\nText\n")
        .unwrap();
    assert_eq!(types(&conversion.document.content), vec!["paragraph"]);
    assert!(conversion.warnings.is_empty());
}

#[test]
fn test_crate_level_convert() {
    let doc = adf_babel::convert("# Hi\n").unwrap();
    assert_eq!(doc.doc_type, "doc");
    assert_eq!(doc.version, 1);
    assert_eq!(doc.content[0].plain_text(), "Hi");
}
