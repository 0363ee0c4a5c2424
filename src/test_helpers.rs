//! Shared test utilities for the media-export test suite.
//!
//! Provides minimal library records, an in-memory template pack, a
//! resolver that always falls back, and a helper that writes a template
//! pack to disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut s = show(3, "Show");
//! s.episodes = vec![episode(30, 1, 1), episode(31, 1, 2)];
//!
//! let pack = StaticPack::new(&[(Section::TvShow, "{{ TVSHOW.TITLE }}")]);
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::artwork::fallback_path;
use crate::entity::Entity;
use crate::library::{Concert, Episode, EpisodeNumber, Movie, SeasonNumber, TvShow};
use crate::template::ImageResolver;
use crate::templates::{TemplatePack, TemplatePackError};
use crate::types::Section;

// =========================================================================
// Library records
// =========================================================================

/// Movie with only an id and a title set.
pub fn movie(id: u64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        ..Movie::default()
    }
}

/// Show with no episodes.
pub fn show(id: u64, title: &str) -> TvShow {
    TvShow {
        id,
        title: title.to_string(),
        ..TvShow::default()
    }
}

/// Episode titled `S<season>E<number>`.
pub fn episode(id: u64, season: u16, number: u16) -> Episode {
    Episode {
        id,
        title: format!("S{season}E{number}"),
        season: SeasonNumber(season),
        episode: EpisodeNumber(number),
        ..Episode::default()
    }
}

pub fn concert(id: u64, title: &str) -> Concert {
    Concert {
        id,
        title: title.to_string(),
        ..Concert::default()
    }
}

// =========================================================================
// Template packs
// =========================================================================

/// Write `templates` as section files under `dir`.
pub fn write_pack(dir: &Path, templates: &[(Section, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (section, text) in templates {
        fs::write(dir.join(section.template_file()), text).unwrap();
    }
}

/// In-memory template pack without static assets.
#[derive(Debug, Default)]
pub struct StaticPack {
    templates: HashMap<Section, String>,
}

impl StaticPack {
    pub fn new(templates: &[(Section, &str)]) -> Self {
        Self {
            templates: templates
                .iter()
                .map(|(s, t)| (*s, t.to_string()))
                .collect(),
        }
    }
}

impl TemplatePack for StaticPack {
    fn template(&self, section: Section) -> String {
        self.templates.get(&section).cloned().unwrap_or_default()
    }

    fn copy_static_assets(&self, _dest: &Path) -> Result<usize, TemplatePackError> {
        Ok(0)
    }
}

// =========================================================================
// Images
// =========================================================================

/// Resolver that never finds artwork.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackImages;

impl ImageResolver for FallbackImages {
    fn resolve(&self, entity: &Entity<'_>, role: &str, width: u32, height: u32) -> String {
        fallback_path(entity.kind(), role, width, height)
    }
}
