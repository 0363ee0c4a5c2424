//! Template packs.
//!
//! A pack is a directory with one HTML file per section plus any static
//! assets the pages reference:
//!
//! ```text
//! my-pack/
//! ├── template.toml      # optional manifest
//! ├── config.toml        # optional export config layer
//! ├── movies.html        # list pages
//! ├── tvshows.html
//! ├── concerts.html
//! ├── movie.html         # item pages
//! ├── tvshow.html
//! ├── episode.html
//! ├── concert.html
//! ├── style.css          # everything else is copied verbatim
//! └── defaults/
//!     └── movie_poster_300x450.png
//! ```
//!
//! A missing section file is not an error; that section renders from an
//! empty template.

use crate::config::CONFIG_FILE;
use crate::template::fields::BLOCK_ITEM_PLACEHOLDERS;
use crate::template::recognized_placeholders;
use crate::template::scanner::remaining_placeholders;
use crate::types::{EntityKind, Section};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const MANIFEST_FILE: &str = "template.toml";

#[derive(Error, Debug)]
pub enum TemplatePackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid {MANIFEST_FILE}: {0}")]
    Manifest(#[from] toml::de::Error),
    #[error("Template pack not found: {0}")]
    NotFound(PathBuf),
}

/// Source of section templates and static assets.
pub trait TemplatePack {
    /// Template text for `section`; empty when the pack has none.
    fn template(&self, section: Section) -> String;

    /// Copy every static asset into `dest`. Returns the number of files copied.
    fn copy_static_assets(&self, dest: &Path) -> Result<usize, TemplatePackError>;
}

/// Optional `template.toml` describing a pack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateManifest {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Sections the pack provides. Empty means "not declared".
    pub sections: Vec<Section>,
}

impl TemplateManifest {
    /// Whether the manifest claims `section`. Packs without a declaration
    /// claim everything.
    pub fn declares(&self, section: Section) -> bool {
        self.sections.is_empty() || self.sections.contains(&section)
    }
}

/// Template pack read from a directory.
#[derive(Debug, Clone)]
pub struct DirTemplatePack {
    root: PathBuf,
    manifest: TemplateManifest,
    templates: HashMap<Section, String>,
}

impl DirTemplatePack {
    /// Read the manifest and all section templates under `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, TemplatePackError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TemplatePackError::NotFound(root));
        }

        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            toml::from_str(&fs::read_to_string(&manifest_path)?)?
        } else {
            TemplateManifest::default()
        };

        let mut templates = HashMap::new();
        for section in Section::ALL {
            let path = root.join(section.template_file());
            if path.is_file() {
                templates.insert(section, fs::read_to_string(&path)?);
            } else {
                debug!(section = %section, path = %path.display(), "section template missing");
            }
        }

        Ok(Self {
            root,
            manifest,
            templates,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    pub fn has_template(&self, section: Section) -> bool {
        self.templates.contains_key(&section)
    }

    /// Warn about requested sections the manifest does not list.
    pub fn check_sections(&self, requested: &[Section]) {
        for &section in requested {
            if !self.manifest.declares(section) {
                warn!(
                    pack = %self.manifest.name,
                    section = %section,
                    "section not declared by template pack"
                );
            }
        }
    }

    /// Whether `relative` (a path inside the pack) is a template, the
    /// manifest or the pack config rather than a static asset.
    fn is_pack_file(relative: &Path) -> bool {
        if relative.components().count() != 1 {
            return false;
        }
        let Some(name) = relative.to_str() else {
            return false;
        };
        name == MANIFEST_FILE
            || name == CONFIG_FILE
            || Section::ALL.iter().any(|s| s.template_file() == name)
    }
}

impl TemplatePack for DirTemplatePack {
    fn template(&self, section: Section) -> String {
        self.templates.get(&section).cloned().unwrap_or_default()
    }

    fn copy_static_assets(&self, dest: &Path) -> Result<usize, TemplatePackError> {
        let root = self.root.canonicalize()?;
        // An output directory inside the pack is never walked into.
        let output = dest.canonicalize().ok();
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| output.as_deref() != Some(e.path()));

        let mut copied = 0;
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let target = dest.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if !Self::is_pack_file(relative) {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }
        debug!(copied, dest = %dest.display(), "static assets copied");
        Ok(copied)
    }
}

/// Result of checking one section template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCheck {
    pub section: Section,
    pub present: bool,
    /// Placeholders no entity in this section would ever fill, sorted.
    pub unknown: Vec<String>,
}

/// Entity kinds whose fields may appear in `section`'s template.
fn section_kinds(section: Section) -> &'static [EntityKind] {
    match section {
        Section::Movies | Section::Movie => &[EntityKind::Movie],
        Section::TvShows | Section::TvShow => {
            &[EntityKind::TvShow, EntityKind::Season, EntityKind::Episode]
        }
        Section::Episode => &[EntityKind::Episode],
        Section::Concerts | Section::Concert => &[EntityKind::Concert],
    }
}

/// Check every section template of `pack` for presence and for
/// placeholders that would survive rendering.
pub fn check_pack(pack: &DirTemplatePack) -> Vec<SectionCheck> {
    Section::ALL
        .iter()
        .map(|&section| {
            let known: BTreeSet<&str> = section_kinds(section)
                .iter()
                .flat_map(|&kind| recognized_placeholders(kind))
                .chain(BLOCK_ITEM_PLACEHOLDERS.iter().copied())
                .collect();
            let unknown: BTreeSet<String> = remaining_placeholders(&pack.template(section))
                .into_iter()
                .filter(|name| !known.contains(name.as_str()))
                .collect();
            SectionCheck {
                section,
                present: pack.has_template(section),
                unknown: unknown.into_iter().collect(),
            }
        })
        .collect()
}
