//! Emoji short-name lookup.
//!
//! The converter only needs `name -> {id, text}`; callers with a complete emoji
//! catalogue plug it in through [`EmojiResolver`]. [`BuiltinEmoji`] covers the
//! common short names.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A resolved emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiInfo {
    /// Codepoint id, e.g. `1f604`
    pub id: Option<String>,
    /// Display text, e.g. the emoji character itself
    pub text: String,
}

/// Resolves an emoji short name (without colons) to its codepoint and text.
pub trait EmojiResolver: Send + Sync {
    fn resolve(&self, short_name: &str) -> Option<EmojiInfo>;
}

/// Static table of frequently used short names.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinEmoji;

static TABLE: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    [
        ("smile", ("1f604", "😄")),
        ("smiley", ("1f603", "😃")),
        ("grinning", ("1f600", "😀")),
        ("joy", ("1f602", "😂")),
        ("wink", ("1f609", "😉")),
        ("slight_smile", ("1f642", "🙂")),
        ("thinking", ("1f914", "🤔")),
        ("cry", ("1f622", "😢")),
        ("heart", ("2764", "❤️")),
        ("+1", ("1f44d", "👍")),
        ("thumbsup", ("1f44d", "👍")),
        ("-1", ("1f44e", "👎")),
        ("thumbsdown", ("1f44e", "👎")),
        ("clap", ("1f44f", "👏")),
        ("wave", ("1f44b", "👋")),
        ("pray", ("1f64f", "🙏")),
        ("eyes", ("1f440", "👀")),
        ("tada", ("1f389", "🎉")),
        ("rocket", ("1f680", "🚀")),
        ("fire", ("1f525", "🔥")),
        ("star", ("2b50", "⭐")),
        ("sparkles", ("2728", "✨")),
        ("bulb", ("1f4a1", "💡")),
        ("warning", ("26a0", "⚠️")),
        ("white_check_mark", ("2705", "✅")),
        ("heavy_check_mark", ("2714", "✔️")),
        ("x", ("274c", "❌")),
        ("question", ("2753", "❓")),
        ("exclamation", ("2757", "❗")),
        ("100", ("1f4af", "💯")),
        ("memo", ("1f4dd", "📝")),
        ("calendar", ("1f4c5", "📅")),
        ("lock", ("1f512", "🔒")),
        ("bug", ("1f41b", "🐛")),
        ("construction", ("1f6a7", "🚧")),
    ]
    .into_iter()
    .collect()
});

impl EmojiResolver for BuiltinEmoji {
    fn resolve(&self, short_name: &str) -> Option<EmojiInfo> {
        TABLE.get(short_name).map(|(id, text)| EmojiInfo {
            id: Some((*id).to_string()),
            text: (*text).to_string(),
        })
    }
}
