//! Artwork transcoding in pure Rust.
//!
//! | Step | Where |
//! |---|---|
//! | Read source size | [`ImageBackend::identify`] (`image` reader, format sniffed) |
//! | Choose output size | [`calculate_fit_dimensions`], fit within the token's box, at most [`MAX_EDGE`] |
//! | Resize and encode | [`ImageBackend::resize`]: Lanczos3, then JPEG or PNG |
//!
//! [`transcode`] strings the steps together. Size math and parameter
//! types carry no I/O, so most of this module is tested against the
//! recording mock backend.

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use operations::{get_dimensions, transcode};
pub use params::{MAX_EDGE, OutputFormat, Quality, ResizeParams};
pub use rust_backend::RustBackend;
