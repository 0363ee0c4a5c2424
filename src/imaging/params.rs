//! What a transcode should produce.
//!
//! [`operations`](super::operations) fills these in and a
//! [`backend`](super::backend) carries them out, which keeps the size
//! decisions testable without touching pixels.

use super::backend::BackendError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest edge, in pixels, a transcode may write. Image tokens carry
/// their box straight from the template, so anything above this is
/// refused before a buffer is allocated.
pub const MAX_EDGE: u32 = 4096;

/// JPEG quality, always within 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoding of a transcoded file.
///
/// The file name does not follow the format: every artwork file is named
/// `.jpg` and the bytes decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg(Quality),
    Png,
}

/// Parameters for a resize operation. `width`/`height` are final.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl ResizeParams {
    /// Refuse output sizes above [`MAX_EDGE`].
    pub fn check_limits(&self) -> Result<(), BackendError> {
        if self.width > MAX_EDGE || self.height > MAX_EDGE {
            return Err(BackendError::TooLarge {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
