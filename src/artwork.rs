//! Image resolution and transcoding.
//!
//! Every `{{ IMAGE.role[w,h] }}` token ends up here as a
//! `(entity, role, width, height)` request and leaves as a path relative to
//! the export root:
//!
//! | Situation | Result |
//! |---|---|
//! | Role unknown for the entity kind | `defaults/<kind>_<role>_<w>x<h>.png` |
//! | Locator finds no source | same fallback |
//! | Decode or encode fails | same fallback, logged |
//! | Fitted size over `MAX_EDGE` | same fallback, logged |
//! | Success | `<kind>_images/<id>-<role>_<w>x<h>.jpg` |
//!
//! Photographic roles are JPEG encoded, the rest PNG; the file name always
//! ends in `.jpg`. Each distinct request is transcoded at most once per
//! pipeline, so list and item pages share the same file.

use crate::entity::Entity;
use crate::imaging::{ImageBackend, OutputFormat, Quality, transcode};
use crate::locator::ImageLocator;
use crate::template::ImageResolver;
use crate::types::{EntityKind, ImageRole};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Directory (relative to the export root) holding the pack's stock artwork.
pub const DEFAULTS_DIR: &str = "defaults";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ArtworkKey {
    kind: EntityKind,
    id: u64,
    role: ImageRole,
    width: u32,
    height: u32,
}

/// Fallback path for a request that produced no image.
pub fn fallback_path(kind: EntityKind, role: &str, width: u32, height: u32) -> String {
    format!("{DEFAULTS_DIR}/{}_{role}_{width}x{height}.png", kind.as_str())
}

/// Destination path of a transcoded image, relative to the export root.
pub fn artwork_path(image_dir: &str, id: u64, role: ImageRole, width: u32, height: u32) -> String {
    format!("{image_dir}/{id}-{}_{width}x{height}.jpg", role.as_str())
}

/// Encoding used for `role`.
pub fn output_format(role: ImageRole, quality: Quality) -> OutputFormat {
    if role.is_photographic() {
        OutputFormat::Jpeg(quality)
    } else {
        OutputFormat::Png
    }
}

/// Resolves image tokens against a locator and writes transcoded files
/// under `output_root`.
pub struct ArtworkPipeline<B: ImageBackend, L: ImageLocator> {
    backend: B,
    locator: L,
    output_root: PathBuf,
    quality: Quality,
    /// `None` records a request that already fell back.
    cache: RefCell<HashMap<ArtworkKey, Option<String>>>,
    written: Cell<usize>,
}

impl<B: ImageBackend, L: ImageLocator> ArtworkPipeline<B, L> {
    pub fn new(backend: B, locator: L, output_root: impl Into<PathBuf>, quality: Quality) -> Self {
        Self {
            backend,
            locator,
            output_root: output_root.into(),
            quality,
            cache: RefCell::new(HashMap::new()),
            written: Cell::new(0),
        }
    }

    /// Number of image files written so far.
    pub fn written(&self) -> usize {
        self.written.get()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Forget cached results, e.g. before a second run into the same root.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
        self.written.set(0);
    }

    fn transcode_source(
        &self,
        entity: &Entity<'_>,
        image_dir: &str,
        role: ImageRole,
        width: u32,
        height: u32,
    ) -> Option<String> {
        let source = self.locator.locate(entity, role)?;
        let relative = artwork_path(image_dir, entity.id(), role, width, height);
        let output = self.output_root.join(&relative);

        if let Err(e) = std::fs::create_dir_all(self.output_root.join(image_dir)) {
            warn!(dir = image_dir, error = %e, "cannot create image directory");
            return None;
        }
        match transcode(
            &self.backend,
            &source,
            &output,
            (width, height),
            output_format(role, self.quality),
        ) {
            Ok((w, h)) => {
                debug!(source = %source.display(), output = %relative, width = w, height = h, "transcoded");
                self.written.set(self.written.get() + 1);
                Some(relative)
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "artwork could not be transcoded");
                None
            }
        }
    }
}

impl<B: ImageBackend, L: ImageLocator> ImageResolver for ArtworkPipeline<B, L> {
    fn resolve(&self, entity: &Entity<'_>, role: &str, width: u32, height: u32) -> String {
        let kind = entity.kind();
        let fallback = || fallback_path(kind, role, width, height);

        let (Some(image_dir), Some(image_role)) = (kind.image_dir(), ImageRole::for_kind(kind, role))
        else {
            debug!(kind = kind.as_str(), role, "image role not supported");
            return fallback();
        };

        let key = ArtworkKey {
            kind,
            id: entity.id(),
            role: image_role,
            width,
            height,
        };
        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone().unwrap_or_else(fallback);
        }

        let resolved = self.transcode_source(entity, image_dir, image_role, width, height);
        self.cache.borrow_mut().insert(key, resolved.clone());
        resolved.unwrap_or_else(fallback)
    }
}
