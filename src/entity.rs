//! One renderable record, dispatched by variant.

use crate::library::{Concert, Episode, ImagePaths, Movie, SeasonNumber, TvShow};
use crate::types::{EntityKind, ImageRole};
use std::path::Path;

/// Borrowed view of a library record that a template can be rendered against.
///
/// Episodes and seasons carry their show so show-level placeholders
/// (`{{ SHOW.TITLE }}`) resolve inside them.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Movie(&'a Movie),
    TvShow(&'a TvShow),
    Season {
        show: &'a TvShow,
        season: SeasonNumber,
    },
    Episode {
        show: &'a TvShow,
        episode: &'a Episode,
    },
    Concert(&'a Concert),
}

impl<'a> Entity<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Movie(_) => EntityKind::Movie,
            Entity::TvShow(_) => EntityKind::TvShow,
            Entity::Season { .. } => EntityKind::Season,
            Entity::Episode { .. } => EntityKind::Episode,
            Entity::Concert(_) => EntityKind::Concert,
        }
    }

    /// Library id; seasons have none of their own and report the show's.
    pub fn id(&self) -> u64 {
        match self {
            Entity::Movie(m) => m.id,
            Entity::TvShow(s) | Entity::Season { show: s, .. } => s.id,
            Entity::Episode { episode, .. } => episode.id,
            Entity::Concert(c) => c.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            Entity::Movie(m) => &m.title,
            Entity::TvShow(s) | Entity::Season { show: s, .. } => &s.title,
            Entity::Episode { episode, .. } => &episode.title,
            Entity::Concert(c) => &c.title,
        }
    }

    fn images(&self) -> Option<&'a ImagePaths> {
        match self {
            Entity::Movie(m) => Some(&m.images),
            Entity::TvShow(s) => Some(&s.images),
            Entity::Episode { episode, .. } => Some(&episode.images),
            Entity::Concert(c) => Some(&c.images),
            Entity::Season { .. } => None,
        }
    }

    /// Artwork source recorded in the library for `role`, if any.
    pub fn image(&self, role: ImageRole) -> Option<&'a Path> {
        self.images()?.get(&role).map(|p| p.as_path())
    }
}
