//! Template engine: token scanning, substitution, block expansion and the
//! per-entity renderer that ties them together.
//!
//! - **Scanner**: locates placeholders, blocks and image tokens
//! - **Fields**: per-variant field tables and value formatting
//! - **Blocks**: list, parallel-list and entity-collection expansion
//! - **Render**: composes the above per entity, including the
//!   show → season → episode hierarchy

pub mod blocks;
pub mod fields;
pub mod render;
pub mod scanner;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("block {block}: mismatched value lists (expected {expected}, found {found})")]
    InvalidTemplateData {
        block: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid block pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub use blocks::{expand_entity_block, expand_multi_block, expand_single_block};
pub use fields::{escape_html, recognized_placeholders, render_scalar};
pub use render::{ImageResolver, Renderer};
pub use scanner::{BlockMatch, BlockSpan, find_block};
