//! Schema tree builders.
//!
//! [`to_adf`] maps a fully resolved generic tree (annotations attached, fences
//! materialized) to ADF; [`from_adf`] maps ADF back to a generic tree whose
//! annotations carry every attribute the markdown syntax cannot imply.
//!
//! | generic                    | ADF                                  |
//! |----------------------------|--------------------------------------|
//! | heading (depth d)          | heading, `level = clamp(d, 1, 6)`    |
//! | list (ordered, start)      | orderedList, `order` only if ≠ 1     |
//! | list (unordered)           | bulletList                           |
//! | list of task items         | taskList / taskItem (`state`)        |
//! | table                      | table, `isNumberColumnEnabled=false`, `layout=default` |
//! | code block                 | codeBlock, `language` if present     |
//! | blockquote / thematic break| blockquote / rule                    |
//! | `~~~panel`                 | panel, `panelType = type ?? "info"`  |
//! | `~~~expand` / `~~~nestedExpand` | expand / nestedExpand            |
//! | `~~~mediaSingle`           | mediaSingle, `layout ?? "center"`    |
//! | `~~~mediaGroup`            | mediaGroup of media from raw text    |
//! | `![alt](media:ID)`         | mediaSingle > media (file)           |
//! | `![alt](url)`              | mediaSingle > media (external)       |
//! | hard line break            | hardBreak                            |

pub mod from_adf;
pub mod to_adf;

use crate::adf::Attributes;
use crate::common::emoji::EmojiResolver;
use crate::options::ConvertOptions;
use serde_json::Value;

/// Everything a builder needs besides the tree itself.
pub struct MappingContext<'a> {
    pub options: &'a ConvertOptions,
    pub emoji: &'a dyn EmojiResolver,
}

/// ADF table defaults, implied when absent.
pub(crate) fn table_defaults() -> Attributes {
    let mut defaults = Attributes::new();
    defaults.insert("isNumberColumnEnabled".to_string(), Value::Bool(false));
    defaults.insert("layout".to_string(), Value::String("default".to_string()));
    defaults
}

/// Reserved annotation attribute carrying a block node's marks.
pub(crate) const MARKS_ATTRIBUTE: &str = "marks";
