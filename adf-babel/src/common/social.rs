//! Social token scanning.
//!
//! Splits a plain text run around the inline micro-syntax of the dialect:
//!
//! | Syntax                          | Token            |
//! |---------------------------------|------------------|
//! | `{user:ID}`                     | mention          |
//! | `:name:`                        | emoji            |
//! | `{date:YYYY-MM-DD}`             | date             |
//! | bare `YYYY-MM-DD`               | date             |
//! | `{status:TEXT}` / `{status:TEXT\|color:C}` | status |
//! | `[text](card:URL)`              | inline card      |
//! | `![alt](media:ID)`              | media reference  |
//!
//! Every round evaluates all patterns against the remaining text and takes the
//! match with the smallest start offset; ties go to the pattern listed first.
//! Scanning is total: concatenating the raw text of all segments reproduces the
//! input exactly.

use crate::common::emoji::EmojiResolver;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

/// An inline token recognized inside a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialToken {
    Mention { id: String },
    Emoji { short_name: String, text: String, id: Option<String> },
    /// UTC-midnight epoch milliseconds, as decimal digits
    Date { timestamp: String },
    Status { text: String, color: StatusColor },
    InlineCard { url: String },
    MediaReference { id: String, alt: String },
}

/// Allowed status chip colors. Anything else falls back to neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusColor {
    #[default]
    Neutral,
    Purple,
    Blue,
    Red,
    Yellow,
    Green,
}

impl StatusColor {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "purple" => StatusColor::Purple,
            "blue" => StatusColor::Blue,
            "red" => StatusColor::Red,
            "yellow" => StatusColor::Yellow,
            "green" => StatusColor::Green,
            _ => StatusColor::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusColor::Neutral => "neutral",
            StatusColor::Purple => "purple",
            StatusColor::Blue => "blue",
            StatusColor::Red => "red",
            StatusColor::Yellow => "yellow",
            StatusColor::Green => "green",
        }
    }
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of a scanned text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Token { token: SocialToken, raw: String },
}

impl Segment {
    pub fn raw(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Token { raw, .. } => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Mention,
    Emoji,
    ExplicitDate,
    BareDate,
    Status,
    InlineCard,
    MediaReference,
}

const PATTERNS: [Pattern; 7] = [
    Pattern::MediaReference,
    Pattern::InlineCard,
    Pattern::Mention,
    Pattern::ExplicitDate,
    Pattern::Status,
    Pattern::Emoji,
    Pattern::BareDate,
];

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{user:([^{}\s]+)\}").expect("mention pattern compiles"));
static EMOJI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_+\-]+):").expect("emoji pattern compiles"));
static EXPLICIT_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{date:(\d{4}-\d{2}-\d{2})\}").expect("date pattern compiles")
});
static BARE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("bare date pattern compiles"));
static STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{status:([^{}]+?)(?:\|color:([A-Za-z]*))?\}").expect("status pattern compiles")
});
static INLINE_CARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]*)\]\(card:([^)\s]+)\)").expect("inline card pattern compiles")
});
static MEDIA_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(media:([^)\s]+)\)").expect("media pattern compiles")
});

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Pattern::Mention => &MENTION,
            Pattern::Emoji => &EMOJI,
            Pattern::ExplicitDate => &EXPLICIT_DATE,
            Pattern::BareDate => &BARE_DATE,
            Pattern::Status => &STATUS,
            Pattern::InlineCard => &INLINE_CARD,
            Pattern::MediaReference => &MEDIA_REFERENCE,
        }
    }

    /// Build the token for a match, or `None` when the match is not a real token.
    fn token(self, text: &str, caps: &Captures<'_>, emoji: &dyn EmojiResolver) -> Option<SocialToken> {
        match self {
            Pattern::Mention => Some(SocialToken::Mention {
                id: caps[1].to_string(),
            }),
            Pattern::Emoji => {
                let whole = caps.get(0)?;
                let name = &caps[1];
                let resolved = emoji.resolve(name);
                let wordlike = name.chars().any(|c| c.is_ascii_alphabetic());
                if resolved.is_none() && !wordlike {
                    return None;
                }
                let glued_before = text[..whole.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_alphanumeric());
                let glued_after = text[whole.end()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric());
                if glued_before || glued_after {
                    return None;
                }
                let short_name = format!(":{name}:");
                Some(match resolved {
                    Some(info) => SocialToken::Emoji {
                        short_name,
                        text: info.text,
                        id: info.id,
                    },
                    None => SocialToken::Emoji {
                        text: short_name.clone(),
                        short_name,
                        id: None,
                    },
                })
            }
            Pattern::ExplicitDate | Pattern::BareDate => {
                date_to_timestamp(&caps[1]).map(|timestamp| SocialToken::Date { timestamp })
            }
            Pattern::Status => {
                let label = caps[1].trim();
                if label.is_empty() {
                    return None;
                }
                let color = caps
                    .get(2)
                    .map(|m| StatusColor::parse(m.as_str()))
                    .unwrap_or_default();
                Some(SocialToken::Status {
                    text: label.to_string(),
                    color,
                })
            }
            Pattern::InlineCard => Some(SocialToken::InlineCard {
                url: caps[2].to_string(),
            }),
            Pattern::MediaReference => Some(SocialToken::MediaReference {
                id: caps[2].to_string(),
                alt: caps[1].to_string(),
            }),
        }
    }

    /// First valid token of this pattern at or after `from`.
    fn find(
        self,
        text: &str,
        from: usize,
        emoji: &dyn EmojiResolver,
    ) -> Option<(usize, usize, SocialToken)> {
        let regex = self.regex();
        let mut start = from;
        while start <= text.len() {
            let caps = regex.captures_at(text, start)?;
            let whole = caps.get(0)?;
            if let Some(token) = self.token(text, &caps, emoji) {
                return Some((whole.start(), whole.end(), token));
            }
            // Retry one character further on
            let step = text[whole.start()..].chars().next().map_or(1, char::len_utf8);
            start = whole.start() + step;
        }
        None
    }
}

/// Split `text` into plain segments and social tokens, in original order.
pub fn scan(text: &str, emoji: &dyn EmojiResolver) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let earliest = PATTERNS
            .iter()
            .filter_map(|pattern| pattern.find(text, pos, emoji))
            .min_by_key(|(start, _, _)| *start);

        let Some((start, end, token)) = earliest else {
            break;
        };
        if start > pos {
            segments.push(Segment::Text(text[pos..start].to_string()));
        }
        segments.push(Segment::Token {
            token,
            raw: text[start..end].to_string(),
        });
        pos = end;
    }

    if pos < text.len() {
        segments.push(Segment::Text(text[pos..].to_string()));
    }
    segments
}

/// Media references found in `text`, ignoring every other token kind.
pub fn media_references(text: &str, emoji: &dyn EmojiResolver) -> Vec<(String, String)> {
    scan(text, emoji)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Token {
                token: SocialToken::MediaReference { id, alt },
                ..
            } => Some((id, alt)),
            _ => None,
        })
        .collect()
}

/// `YYYY-MM-DD` to UTC-midnight epoch milliseconds.
pub fn date_to_timestamp(date: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(midnight.and_utc().timestamp_millis().to_string())
}

/// Epoch milliseconds back to `YYYY-MM-DD` (UTC).
pub fn timestamp_to_date(timestamp: &str) -> Option<String> {
    let millis = timestamp.trim().parse::<i64>().ok()?;
    let datetime = DateTime::from_timestamp_millis(millis)?;
    Some(datetime.date_naive().format("%Y-%m-%d").to_string())
}

impl SocialToken {
    /// Markup that scans back to this token.
    pub fn to_markup(&self) -> String {
        match self {
            SocialToken::Mention { id } => format!("{{user:{id}}}"),
            SocialToken::Emoji { short_name, .. } => {
                let name = short_name.trim_matches(':');
                format!(":{name}:")
            }
            SocialToken::Date { timestamp } => match timestamp_to_date(timestamp) {
                Some(date) => format!("{{date:{date}}}"),
                None => timestamp.clone(),
            },
            SocialToken::Status { text, color } => match color {
                StatusColor::Neutral => format!("{{status:{text}}}"),
                other => format!("{{status:{text}|color:{other}}}"),
            },
            SocialToken::InlineCard { url } => format!("[{url}](card:{url})"),
            SocialToken::MediaReference { id, alt } => format!("![{alt}](media:{id})"),
        }
    }
}
