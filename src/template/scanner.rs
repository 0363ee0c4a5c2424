//! Token scanning.
//!
//! Three token shapes exist in a template:
//!
//! ```text
//! {{ MOVIE.TITLE }}                                   scalar placeholder
//! {{ BEGIN_BLOCK_TAGS }} ... {{ END_BLOCK_TAGS }}     block marker pair
//! {{ IMAGE.poster[300,450] }}                         image placeholder
//! ```
//!
//! Placeholders are matched literally and case-sensitively. Blocks are
//! matched non-greedily so two adjacent blocks of the same name never merge
//! into one span. When a name occurs more than once, [`BlockMatch`] decides
//! which occurrence is used.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

use super::TemplateError;

static IMAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{ IMAGE\.(.*?)\[(\d*), ?(\d*)\] \}\}").expect("image token pattern is valid")
});

static ANY_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{ ([A-Z_]+(?:\.[A-Z_]+)*) \}\}").expect("placeholder pattern is valid")
});

/// Which occurrence of a repeated block is captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMatch {
    /// The first complete block in the text.
    #[default]
    First,
    /// The last block found by scanning forward past each match, for
    /// entity blocks. Value blocks still use their first occurrence, and
    /// every identical copy of the captured block is replaced. Older
    /// template packs were written against this behavior.
    Last,
}

/// A located `BEGIN_BLOCK_X ... END_BLOCK_X` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    /// Byte range of the whole block, markers included.
    pub span: Range<usize>,
    /// Text between the markers, trimmed.
    pub inner: String,
}

/// An `{{ IMAGE.role[w,h] }}` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageToken {
    pub span: Range<usize>,
    /// Literal token text, used to replace every identical occurrence.
    pub text: String,
    /// Role, case-folded to lowercase.
    pub role: String,
    pub width: u32,
    pub height: u32,
}

/// Format a placeholder name as it appears in a template.
pub fn placeholder(name: &str) -> String {
    format!("{{{{ {name} }}}}")
}

/// Byte range of the first literal occurrence of placeholder `name`.
pub fn find_placeholder(text: &str, name: &str) -> Option<Range<usize>> {
    let token = placeholder(name);
    text.find(&token).map(|start| start..start + token.len())
}

fn block_regex(name: &str) -> Result<Regex, TemplateError> {
    let name = regex::escape(name);
    let pattern = format!(r"(?s)\{{\{{ BEGIN_BLOCK_{name} \}}\}}(.*?)\{{\{{ END_BLOCK_{name} \}}\}}");
    Ok(Regex::new(&pattern)?)
}

/// Locate block `name` in `text`.
pub fn find_block(
    text: &str,
    name: &str,
    mode: BlockMatch,
) -> Result<Option<BlockSpan>, TemplateError> {
    let re = block_regex(name)?;
    let captures = match mode {
        BlockMatch::First => re.captures(text),
        BlockMatch::Last => {
            let mut last = None;
            let mut pos = 0;
            while let Some(caps) = re.captures_at(text, pos) {
                let whole = caps.get(0).map(|m| m.range()).unwrap_or(pos..pos);
                pos = whole.end.max(pos + 1);
                last = Some(caps);
                if pos > text.len() {
                    break;
                }
            }
            last
        }
    };

    Ok(captures.and_then(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        Some(BlockSpan {
            span: whole.range(),
            inner: inner.as_str().trim().to_string(),
        })
    }))
}

/// All well-formed image tokens in `text`, in order.
///
/// Tokens whose width or height is empty, zero or out of range are skipped
/// and stay in the text unexpanded.
pub fn image_tokens(text: &str) -> Vec<ImageToken> {
    IMAGE_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let width: u32 = caps.get(2)?.as_str().parse().ok()?;
            let height: u32 = caps.get(3)?.as_str().parse().ok()?;
            if width == 0 || height == 0 {
                return None;
            }
            Some(ImageToken {
                span: whole.range(),
                text: whole.as_str().to_string(),
                role: caps.get(1)?.as_str().to_lowercase(),
                width,
                height,
            })
        })
        .collect()
}

/// Names of every `{{ NAME }}`-shaped placeholder still present in `text`.
///
/// Block markers and image tokens are not reported.
pub fn remaining_placeholders(text: &str) -> Vec<String> {
    ANY_PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|name| !name.starts_with("BEGIN_BLOCK_") && !name.starts_with("END_BLOCK_"))
        .collect()
}
