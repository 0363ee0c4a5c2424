//! Block expansion.
//!
//! A block is captured once, its inner template is rendered per item, and
//! the joined result replaces the whole block span. A block that does not
//! exist in the text is not an error: the text comes back unchanged.

use super::TemplateError;
use super::fields::escape_html;
use super::scanner::{BlockMatch, BlockSpan, find_block, placeholder};
use tracing::debug;

/// Separator between rendered list values (tags, actors, ...).
const VALUE_SEPARATOR: &str = " ";
/// Separator between rendered entities (movies, seasons, episodes, ...).
const ENTITY_SEPARATOR: &str = "\n";

/// Replace `block`'s span in `buffer` with `rendered`.
pub fn splice(buffer: &str, block: &BlockSpan, rendered: &str) -> String {
    let mut out = String::with_capacity(buffer.len() + rendered.len());
    out.push_str(&buffer[..block.span.start]);
    out.push_str(rendered);
    out.push_str(&buffer[block.span.end..]);
    out
}

/// Put `rendered` in place of a captured block.
///
/// [`BlockMatch::First`] replaces the captured span only.
/// [`BlockMatch::Last`] replaces every copy of the block that is
/// identical to the captured one, markers included.
pub fn replace_block(buffer: &str, block: &BlockSpan, rendered: &str, mode: BlockMatch) -> String {
    match mode {
        BlockMatch::First => splice(buffer, block, rendered),
        BlockMatch::Last => buffer.replace(&buffer[block.span.clone()], rendered),
    }
}

/// Expand a block whose items substitute one placeholder each.
///
/// ```text
/// {{ BEGIN_BLOCK_TAGS }}<li>{{ TAG.NAME }}</li>{{ END_BLOCK_TAGS }}
/// ```
pub fn expand_single_block(
    buffer: &str,
    block_name: &str,
    item_name: &str,
    values: &[String],
    mode: BlockMatch,
) -> Result<String, TemplateError> {
    expand_multi_block(buffer, block_name, &[item_name], &[values], mode)
}

/// Expand a block over parallel value lists.
///
/// Item `i` substitutes `item_names[k]` with `columns[k][i]`. All columns
/// must have the same length. Value blocks are always captured at their
/// first occurrence; `mode` only decides how the result is put back.
pub fn expand_multi_block(
    buffer: &str,
    block_name: &str,
    item_names: &[&str],
    columns: &[&[String]],
    mode: BlockMatch,
) -> Result<String, TemplateError> {
    if item_names.len() != columns.len() {
        return Err(TemplateError::InvalidTemplateData {
            block: block_name.to_string(),
            expected: item_names.len(),
            found: columns.len(),
        });
    }
    let rows = columns.first().map_or(0, |c| c.len());
    if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
        return Err(TemplateError::InvalidTemplateData {
            block: block_name.to_string(),
            expected: rows,
            found: bad.len(),
        });
    }

    let Some(block) = find_block(buffer, block_name, BlockMatch::First)? else {
        debug!(block = block_name, "block not present in template");
        return Ok(buffer.to_string());
    };

    let tokens: Vec<String> = item_names.iter().map(|n| placeholder(n)).collect();
    let items: Vec<String> = (0..rows)
        .map(|i| {
            let mut item = block.inner.clone();
            for (token, column) in tokens.iter().zip(columns) {
                item = item.replace(token, &escape_html(&column[i]));
            }
            item
        })
        .collect();

    Ok(replace_block(buffer, &block, &items.join(VALUE_SEPARATOR), mode))
}

/// Expand a block once per entity, rendering each with `render`.
///
/// `render` receives a fresh copy of the inner template for every item.
pub fn expand_entity_block<T>(
    buffer: &str,
    block_name: &str,
    items: &[T],
    mode: BlockMatch,
    mut render: impl FnMut(&str, &T) -> Result<String, TemplateError>,
) -> Result<String, TemplateError> {
    let Some(block) = find_block(buffer, block_name, mode)? else {
        debug!(block = block_name, "block not present in template");
        return Ok(buffer.to_string());
    };

    let rendered = items
        .iter()
        .map(|item| render(&block.inner, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(replace_block(buffer, &block, &join_entities(&rendered), mode))
}

/// Join rendered entities the way entity-collection blocks do.
pub fn join_entities(rendered: &[String]) -> String {
    rendered.join(ENTITY_SEPARATOR)
}
