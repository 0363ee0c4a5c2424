//! Image source lookup.
//!
//! The export engine never decides where artwork lives; it asks an
//! [`ImageLocator`]. The default one reads the paths recorded in the library
//! snapshot and only reports files that actually exist.

use crate::entity::Entity;
use crate::types::ImageRole;
use std::path::PathBuf;
use tracing::debug;

pub trait ImageLocator {
    /// Source file for `entity`'s `role` artwork, if there is one.
    fn locate(&self, entity: &Entity<'_>, role: ImageRole) -> Option<PathBuf>;
}

/// Locator backed by the image paths stored on each library record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryImageLocator;

impl ImageLocator for LibraryImageLocator {
    fn locate(&self, entity: &Entity<'_>, role: ImageRole) -> Option<PathBuf> {
        let path = entity.image(role)?;
        if path.is_file() {
            Some(path.to_path_buf())
        } else {
            debug!(
                kind = entity.kind().as_str(),
                id = entity.id(),
                role = role.as_str(),
                path = %path.display(),
                "recorded artwork does not exist"
            );
            None
        }
    }
}
