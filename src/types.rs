//! Shared types used across the export stages.
//!
//! Sections select templates, entity kinds select output directories, and
//! image roles name the artwork a template can ask for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named template role.
///
/// `Movies`, `TvShows` and `Concerts` are *list* templates (one page per
/// section); the others are *item* templates (one page per entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Movies,
    Movie,
    TvShows,
    TvShow,
    Episode,
    Concerts,
    Concert,
}

impl Section {
    /// List sections in the fixed order an export processes them.
    pub const LISTS: [Section; 3] = [Section::Movies, Section::TvShows, Section::Concerts];

    pub const ALL: [Section; 7] = [
        Section::Movies,
        Section::Movie,
        Section::TvShows,
        Section::TvShow,
        Section::Episode,
        Section::Concerts,
        Section::Concert,
    ];

    pub fn is_list(self) -> bool {
        matches!(self, Section::Movies | Section::TvShows | Section::Concerts)
    }

    /// File name of this section's template inside a template pack.
    pub fn template_file(self) -> &'static str {
        match self {
            Section::Movies => "movies.html",
            Section::Movie => "movie.html",
            Section::TvShows => "tvshows.html",
            Section::TvShow => "tvshow.html",
            Section::Episode => "episode.html",
            Section::Concerts => "concerts.html",
            Section::Concert => "concert.html",
        }
    }

    /// Name of the entity-collection block inside a list template.
    pub fn list_block(self) -> Option<&'static str> {
        match self {
            Section::Movies => Some("MOVIE"),
            Section::TvShows => Some("TVSHOW"),
            Section::Concerts => Some("CONCERT"),
            _ => None,
        }
    }

    /// Item template used for each entity of a list section.
    pub fn item_section(self) -> Option<Section> {
        match self {
            Section::Movies => Some(Section::Movie),
            Section::TvShows => Some(Section::TvShow),
            Section::Concerts => Some(Section::Concert),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Movies => "movies",
            Section::Movie => "movie",
            Section::TvShows => "tvshows",
            Section::TvShow => "tvshow",
            Section::Episode => "episode",
            Section::Concerts => "concerts",
            Section::Concert => "concert",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a renderable entity, as far as file layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Movie,
    TvShow,
    Season,
    Episode,
    Concert,
}

impl EntityKind {
    /// Lowercase name used in fallback image paths (`defaults/<kind>_...`).
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::TvShow => "tvshow",
            EntityKind::Season => "season",
            EntityKind::Episode => "episode",
            EntityKind::Concert => "concert",
        }
    }

    /// Directory holding one item page per entity.
    pub fn page_dir(self) -> Option<&'static str> {
        match self {
            EntityKind::Movie => Some("movies"),
            EntityKind::TvShow => Some("tvshows"),
            EntityKind::Episode => Some("episodes"),
            EntityKind::Concert => Some("concerts"),
            EntityKind::Season => None,
        }
    }

    /// Directory holding transcoded artwork.
    pub fn image_dir(self) -> Option<&'static str> {
        match self {
            EntityKind::Movie => Some("movie_images"),
            EntityKind::TvShow => Some("tvshow_images"),
            EntityKind::Episode => Some("episode_images"),
            EntityKind::Concert => Some("concert_images"),
            EntityKind::Season => None,
        }
    }
}

/// Typed image role a template token can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    Poster,
    Fanart,
    Banner,
    Logo,
    ClearArt,
    Disc,
    CharacterArt,
    Thumbnail,
}

impl ImageRole {
    /// Map a case-folded token role to the roles supported by `kind`.
    pub fn for_kind(kind: EntityKind, role: &str) -> Option<ImageRole> {
        let role = match role {
            "poster" => ImageRole::Poster,
            "fanart" => ImageRole::Fanart,
            "banner" => ImageRole::Banner,
            "logo" => ImageRole::Logo,
            "clearart" => ImageRole::ClearArt,
            "disc" => ImageRole::Disc,
            "characterart" => ImageRole::CharacterArt,
            "thumbnail" => ImageRole::Thumbnail,
            _ => return None,
        };
        let supported: &[ImageRole] = match kind {
            EntityKind::Movie | EntityKind::Concert => &[
                ImageRole::Poster,
                ImageRole::Fanart,
                ImageRole::Logo,
                ImageRole::ClearArt,
                ImageRole::Disc,
            ],
            EntityKind::TvShow => &[
                ImageRole::Poster,
                ImageRole::Fanart,
                ImageRole::Banner,
                ImageRole::Logo,
                ImageRole::ClearArt,
                ImageRole::CharacterArt,
            ],
            EntityKind::Episode => &[ImageRole::Thumbnail],
            EntityKind::Season => &[],
        };
        supported.contains(&role).then_some(role)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageRole::Poster => "poster",
            ImageRole::Fanart => "fanart",
            ImageRole::Banner => "banner",
            ImageRole::Logo => "logo",
            ImageRole::ClearArt => "clearart",
            ImageRole::Disc => "disc",
            ImageRole::CharacterArt => "characterart",
            ImageRole::Thumbnail => "thumbnail",
        }
    }

    /// Photographic roles are stored as JPEG, everything else stays lossless.
    pub fn is_photographic(self) -> bool {
        matches!(
            self,
            ImageRole::Poster
                | ImageRole::Fanart
                | ImageRole::Banner
                | ImageRole::Disc
                | ImageRole::Thumbnail
        )
    }
}

/// Where a rendered page lives relative to the export root.
///
/// Item pages sit one directory deep (`movies/7.html`), so every relative
/// asset path they emit needs a `../` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDepth {
    Root,
    Item,
}

impl PageDepth {
    pub fn prefix(self) -> &'static str {
        match self {
            PageDepth::Root => "",
            PageDepth::Item => "../",
        }
    }
}
