//! The seam between artwork planning and pixel work.
//!
//! [`ImageBackend`] has exactly the two calls a transcode makes: read the
//! source size, then write the resized copy. Production code uses
//! [`RustBackend`](super::rust_backend::RustBackend); tests use the
//! recording [`tests::MockBackend`] so no real pixels are needed.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Output size {width}x{height} exceeds the {}px limit", super::params::MAX_EDGE)]
    TooLarge { width: u32, height: u32 },
}

/// Pixel size of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

pub trait ImageBackend {
    /// Read the size of the image at `path` without decoding all of it.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode `params.source`, resize to exactly `width`×`height` and
    /// encode to `params.output` in `params.format`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, Quality};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// A call seen by [`MockBackend`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(PathBuf),
        Resize(ResizeParams),
    }

    /// Backend that answers from canned sizes and writes nothing.
    ///
    /// Sizes are handed out in order; once they run out every source is a
    /// 1000x1500 poster. Identify fails for paths in `broken`.
    #[derive(Default)]
    pub struct MockBackend {
        sizes: Mutex<Vec<Dimensions>>,
        broken: Vec<PathBuf>,
        log: Mutex<Vec<RecordedOp>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(mut sizes: Vec<Dimensions>) -> Self {
            sizes.reverse();
            Self {
                sizes: Mutex::new(sizes),
                ..Self::default()
            }
        }

        pub fn failing_on(path: &Path) -> Self {
            Self {
                broken: vec![path.to_path_buf()],
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.log.lock().unwrap().clone()
        }

        pub fn resize_count(&self) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Resize(_)))
                .count()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.log
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_path_buf()));
            if self.broken.iter().any(|p| p == path) {
                return Err(BackendError::ProcessingFailed(format!(
                    "cannot decode {}",
                    path.display()
                )));
            }
            let next = self.sizes.lock().unwrap().pop();
            Ok(next.unwrap_or(Dimensions {
                width: 1000,
                height: 1500,
            }))
        }

        fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
            self.log
                .lock()
                .unwrap()
                .push(RecordedOp::Resize(params.clone()));
            Ok(())
        }
    }

    #[test]
    fn sizes_are_served_in_order() {
        let backend = MockBackend::with_dimensions(vec![
            Dimensions {
                width: 800,
                height: 600,
            },
            Dimensions {
                width: 10,
                height: 20,
            },
        ]);

        let first = backend.identify(Path::new("/a.jpg")).unwrap();
        let second = backend.identify(Path::new("/b.jpg")).unwrap();
        let fallback = backend.identify(Path::new("/c.jpg")).unwrap();
        assert_eq!((first.width, first.height), (800, 600));
        assert_eq!((second.width, second.height), (10, 20));
        assert_eq!((fallback.width, fallback.height), (1000, 1500));
        assert_eq!(
            backend.get_operations()[0],
            RecordedOp::Identify(PathBuf::from("/a.jpg"))
        );
    }

    #[test]
    fn broken_path_fails_identify() {
        let backend = MockBackend::failing_on(Path::new("/broken.jpg"));
        assert!(backend.identify(Path::new("/broken.jpg")).is_err());
        assert!(backend.identify(Path::new("/fine.jpg")).is_ok());
    }

    #[test]
    fn resize_is_logged_not_executed() {
        let backend = MockBackend::new();
        let params = ResizeParams {
            source: "/poster.png".into(),
            output: "/nowhere/7-poster_300x450.jpg".into(),
            width: 300,
            height: 450,
            format: OutputFormat::Jpeg(Quality::new(85)),
        };

        backend.resize(&params).unwrap();
        assert_eq!(backend.get_operations(), vec![RecordedOp::Resize(params)]);
        assert_eq!(backend.resize_count(), 1);
        assert!(!Path::new("/nowhere").exists());
    }
}
