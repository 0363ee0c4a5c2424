//! # Media Export
//!
//! Exports a movie, TV show and concert library as a static HTML site.
//! Every page comes from a user-supplied *template pack*: plain HTML files
//! with `{{ PLACEHOLDER }}` tokens, repeatable `BEGIN_BLOCK_X`/`END_BLOCK_X`
//! regions and `{{ IMAGE.role[w,h] }}` artwork tokens.
//!
//! # Architecture
//!
//! ```text
//! library.json ─┐
//!               ├─→ Exporter ─→ Renderer ─→ <output>/movies/7.html
//! template pack ┘       │           │
//!                       │           └─→ ArtworkPipeline ─→ <output>/movie_images/7-poster_300x450.jpg
//!                       └─→ list pages after all sections ─→ <output>/movies.html
//! ```
//!
//! Rendering is a pure function of template text and entity: the
//! [`template`] module never touches the filesystem except through the
//! [`template::ImageResolver`] it is handed. File layout, counting and
//! cancellation live in [`export`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Section`, `EntityKind`, `ImageRole`, `PageDepth` shared across stages |
//! | [`library`] | Read-only library snapshot and its JSON loading |
//! | [`entity`] | The renderable entity variants (movie, show, season, episode, concert) |
//! | [`template`] | Token scanning, field substitution, block expansion, per-entity rendering |
//! | [`templates`] | Directory-backed template packs and their optional manifest |
//! | [`locator`] | Finds the source file of an entity's artwork |
//! | [`imaging`] | Pure-Rust image backend: identify, fit-within resize, encode |
//! | [`artwork`] | Turns image tokens into transcoded files or fallback paths |
//! | [`export`] | Export orchestration, output layout, progress events, cancellation |
//! | [`config`] | Layered `config.toml` loading and validation |
//! | [`output`] | CLI output formatting for export runs and pack checks |
//!
//! # Design Decisions
//!
//! ## Templates Are Data, Not Code
//!
//! Unlike a compile-time HTML macro, a template pack is shipped and edited
//! by users. Unknown placeholders are left in the output untouched so a
//! typo is visible on the page; `media-export check` lists them ahead of
//! time.
//!
//! ## One Transcode Per Image
//!
//! The same poster is usually referenced by the list page and the item
//! page at the same size. [`artwork::ArtworkPipeline`] remembers every
//! request of a run and encodes each `(entity, role, size)` once.
//!
//! ## Cooperative Cancellation
//!
//! The export loop checks a shared flag between units of work and hands
//! the progress callback a [`export::CancelHandle`]. Pages written before
//! the stop stay on disk; list pages are only written when every section
//! finished.

pub mod artwork;
pub mod config;
pub mod entity;
pub mod export;
pub mod imaging;
pub mod library;
pub mod locator;
pub mod output;
pub mod template;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
