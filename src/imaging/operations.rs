//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take the requested box, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::params::{OutputFormat, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Plan a fit-within resize without executing it.
pub fn plan_transcode(
    source: &Path,
    output: &Path,
    source_dims: (u32, u32),
    bounds: (u32, u32),
    format: OutputFormat,
) -> ResizeParams {
    let (width, height) = calculate_fit_dimensions(source_dims, bounds);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        format,
    }
}

/// Scale `source` to fit within `bounds` and write it to `output`.
///
/// Returns the dimensions actually written. Sizes over
/// [`MAX_EDGE`](super::params::MAX_EDGE) fail without reaching the backend.
pub fn transcode(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    bounds: (u32, u32),
    format: OutputFormat,
) -> Result<(u32, u32)> {
    let dims = get_dimensions(backend, source)?;
    let params = plan_transcode(source, output, dims, bounds, format);
    params.check_limits()?;
    backend.resize(&params)?;
    Ok((params.width, params.height))
}
