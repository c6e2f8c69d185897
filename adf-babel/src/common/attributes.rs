//! Attribute strings: `key="quoted" key=bare attrs='{"json":true}'`.
//!
//! Used by both annotation comments and fence headers. Parsing never fails:
//! anything it cannot make sense of is kept as a string and reported.
//!
//! Quoted values are literal strings. Bare values are coerced to a boolean or a
//! number when they parse unambiguously (`true`, `false`, `42`, `-1.5`), else
//! kept as strings. When a key appears both quoted and bare, the quoted value
//! wins regardless of order. The reserved key `attrs` carries a JSON object that
//! is merged into the map (explicit keys win over JSON entries).

use crate::adf::Attributes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

/// Reserved key carrying a JSON object of extra attributes.
pub const JSON_ESCAPE_KEY: &str = "attrs";

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"((?:[^"\\]|\\.)*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern compiles")
});
static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][\w-]*$").expect("key pattern compiles"));
static INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9]\d*)$").expect("integer pattern compiles"));
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9]\d*)\.\d+$").expect("decimal pattern compiles"));

/// Result of parsing an attribute string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAttributes {
    pub attributes: Attributes,
    /// Human-readable reasons for every degraded value
    pub problems: Vec<String>,
}

/// Parse an attribute string. Unparseable fragments are skipped, invalid JSON in
/// the `attrs` escape is kept as a plain string attribute.
pub fn parse_attributes(input: &str) -> ParsedAttributes {
    let mut bare = Attributes::new();
    let mut quoted = Attributes::new();

    for caps in ATTRIBUTE.captures_iter(input) {
        let key = caps[1].to_string();
        if let Some(value) = caps.get(2) {
            quoted.insert(key, Value::String(unescape(value.as_str())));
        } else if let Some(value) = caps.get(3) {
            quoted.insert(key, Value::String(value.as_str().to_string()));
        } else if let Some(value) = caps.get(4) {
            bare.insert(key, coerce(value.as_str()));
        }
    }

    let mut attributes = bare;
    attributes.extend(quoted);

    let mut problems = Vec::new();
    if let Some(Value::String(json)) = attributes.get(JSON_ESCAPE_KEY).cloned() {
        match serde_json::from_str::<Value>(&json) {
            Ok(Value::Object(extra)) => {
                attributes.remove(JSON_ESCAPE_KEY);
                for (key, value) in extra {
                    attributes.entry(key).or_insert(value);
                }
            }
            Ok(_) => problems.push(format!("`{JSON_ESCAPE_KEY}` is not a JSON object")),
            Err(err) => problems.push(format!("invalid JSON in `{JSON_ESCAPE_KEY}`: {err}")),
        }
    }

    ParsedAttributes {
        attributes,
        problems,
    }
}

/// Coerce a bare value to bool or number when unambiguous.
pub fn coerce(value: &str) -> Value {
    match value {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if INTEGER.is_match(value) {
        if let Ok(n) = value.parse::<i64>() {
            return Value::Number(n.into());
        }
        if let Ok(n) = value.parse::<u64>() {
            return Value::Number(n.into());
        }
    }
    if DECIMAL.is_match(value) {
        if let Some(n) = value.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(value.to_string())
}

/// Render attributes so that [`parse_attributes`] reproduces them exactly.
///
/// Strings are quoted, booleans and numbers bare, everything else (and keys that
/// are not plain identifiers) goes through the `attrs='{json}'` escape. Nulls are
/// skipped.
pub fn render_attributes(attrs: &Attributes) -> String {
    render(attrs, false)
}

/// Render attributes for a fence header line.
///
/// The markdown parser applies backslash escapes and entity references to a
/// fence info string before [`parse_attributes`] sees it. Strings that would
/// need either move into the `attrs='{json}'` escape, written with `\uXXXX`
/// sequences only, so the header reads back unchanged.
pub fn render_fence_header(attrs: &Attributes) -> String {
    render(attrs, true)
}

fn render(attrs: &Attributes, fence_header: bool) -> String {
    let mut parts = Vec::new();
    let mut escaped = Attributes::new();

    for (key, value) in attrs {
        if !KEY.is_match(key) || key == JSON_ESCAPE_KEY {
            escaped.insert(key.clone(), value.clone());
            continue;
        }
        match value {
            Value::Null => {}
            Value::String(s) if fence_header && s.contains(INFO_STRING_SPECIALS) => {
                escaped.insert(key.clone(), value.clone());
            }
            Value::String(s) => parts.push(format!("{key}=\"{}\"", escape(s))),
            Value::Bool(b) => parts.push(format!("{key}={b}")),
            Value::Number(n) => parts.push(format!("{key}={n}")),
            Value::Array(_) | Value::Object(_) => {
                escaped.insert(key.clone(), value.clone());
            }
        }
    }

    if !escaped.is_empty() {
        let mut json = Value::Object(escaped).to_string();
        if fence_header {
            json = unicode_escapes_only(&json);
        }
        // Keep the JSON inside single quotes and the surrounding comment intact
        let json = json.replace('\'', "\\u0027").replace('>', "\\u003e");
        parts.push(format!("{JSON_ESCAPE_KEY}='{json}'"));
    }

    parts.join(" ")
}

/// Characters a fence info string does not carry through verbatim.
const INFO_STRING_SPECIALS: &[char] = &['"', '\\', '&', '\n', '\r'];

/// Rewrite `\\` and `\"` in serialized JSON as `\u005c` and `\u0022`, and `&`
/// as `\u0026`. Other JSON escapes are a backslash before a letter, which info
/// strings leave alone.
fn unicode_escapes_only(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('\\') => out.push_str("\\u005c"),
                Some('"') => out.push_str("\\u0022"),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '&' => out.push_str("\\u0026"),
            other => out.push(other),
        }
    }
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '>' => out.push_str("\\>"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
