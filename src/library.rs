//! The media library snapshot consumed by an export.
//!
//! The exporter never mutates anything in here. A [`Library`] is normally
//! loaded from a JSON snapshot written by the application that owns the
//! database; every field is optional in the JSON and falls back to its
//! default, so sparse snapshots are fine.
//!
//! ```json
//! {
//!   "movies": [{ "id": 7, "title": "Alpha", "genres": ["Drama"] }],
//!   "tv_shows": [{
//!     "id": 3, "title": "Show",
//!     "episodes": [{ "id": 30, "title": "Pilot", "season": 1, "episode": 1 }]
//!   }],
//!   "concerts": []
//! }
//! ```
//!
//! Image paths in the snapshot (`"images": { "poster": "art/alpha.jpg" }`)
//! are resolved against the directory of the snapshot file on load.

use crate::types::ImageRole;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Artwork source files keyed by role.
pub type ImagePaths = BTreeMap<ImageRole, PathBuf>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    pub movies: Vec<Movie>,
    pub tv_shows: Vec<TvShow>,
    pub concerts: Vec<Concert>,
}

impl Library {
    /// Load a JSON snapshot, resolving relative image paths against its directory.
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        let mut library: Library = serde_json::from_str(&content)?;
        if let Some(base) = path.parent() {
            library.resolve_image_paths(base);
        }
        Ok(library)
    }

    fn resolve_image_paths(&mut self, base: &Path) {
        let resolve = |images: &mut ImagePaths| {
            for path in images.values_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        };
        for movie in &mut self.movies {
            resolve(&mut movie.images);
        }
        for show in &mut self.tv_shows {
            resolve(&mut show.images);
            for episode in &mut show.episodes {
                resolve(&mut episode.images);
            }
        }
        for concert in &mut self.concerts {
            resolve(&mut concert.images);
        }
    }

    /// Movies in export order.
    pub fn sorted_movies(&self) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = self.movies.iter().collect();
        movies.sort_by(|a, b| compare_titles(a.sort_key(), a.id, b.sort_key(), b.id));
        movies
    }

    /// Shows in export order.
    pub fn sorted_tv_shows(&self) -> Vec<&TvShow> {
        let mut shows: Vec<&TvShow> = self.tv_shows.iter().collect();
        shows.sort_by(|a, b| compare_titles(a.sort_key(), a.id, b.sort_key(), b.id));
        shows
    }

    /// Concerts in export order.
    pub fn sorted_concerts(&self) -> Vec<&Concert> {
        let mut concerts: Vec<&Concert> = self.concerts.iter().collect();
        concerts.sort_by(|a, b| compare_titles(a.sort_key(), a.id, b.sort_key(), b.id));
        concerts
    }
}

/// Case-folded title first, id as tiebreaker, so the order is total.
fn compare_titles(a: String, a_id: u64, b: String, b_id: u64) -> Ordering {
    a.cmp(&b).then(a_id.cmp(&b_id))
}

/// One rating from one source. Only the first rating of an entity is exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rating {
    pub source: String,
    pub rating: f64,
    pub vote_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    pub name: String,
    pub role: String,
}

/// User-assigned color label on a movie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorLabel {
    #[default]
    #[serde(alias = "white")]
    None,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Grey,
}

impl ColorLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorLabel::None => "white",
            ColorLabel::Red => "red",
            ColorLabel::Orange => "orange",
            ColorLabel::Yellow => "yellow",
            ColorLabel::Green => "green",
            ColorLabel::Blue => "blue",
            ColorLabel::Purple => "purple",
            ColorLabel::Grey => "grey",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoDetail {
    Codec,
    Aspect,
    Width,
    Height,
    #[serde(rename = "durationinseconds")]
    DurationInSeconds,
    #[serde(rename = "scantype")]
    ScanType,
    #[serde(rename = "stereomode")]
    StereoMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioDetail {
    Codec,
    Language,
    Channels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleDetail {
    Language,
}

/// Technical details of a media file: one video stream, any number of
/// audio and subtitle tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamDetails {
    pub video: BTreeMap<VideoDetail, String>,
    pub audio: Vec<BTreeMap<AudioDetail, String>>,
    pub subtitles: Vec<BTreeMap<SubtitleDetail, String>>,
}

impl StreamDetails {
    pub fn video_value<'a>(&'a self, detail: VideoDetail, default: &'a str) -> &'a str {
        self.video.get(&detail).map(String::as_str).unwrap_or(default)
    }

    /// One value per audio track; tracks without the attribute yield `""`.
    pub fn audio_values(&self, detail: AudioDetail) -> Vec<&str> {
        self.audio
            .iter()
            .map(|track| track.get(&detail).map(String::as_str).unwrap_or(""))
            .collect()
    }

    pub fn subtitle_values(&self, detail: SubtitleDetail) -> Vec<&str> {
        self.subtitles
            .iter()
            .map(|track| track.get(&detail).map(String::as_str).unwrap_or(""))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub original_title: String,
    /// Title used for ordering; `title` when absent.
    pub sort_title: Option<String>,
    pub imdb_id: String,
    pub tmdb_id: String,
    pub overview: String,
    pub outline: String,
    pub tagline: String,
    pub set: Option<String>,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub studios: Vec<String>,
    pub tags: Vec<String>,
    pub writer: String,
    pub director: String,
    pub certification: String,
    pub trailer: String,
    pub label: ColorLabel,
    pub ratings: Vec<Rating>,
    /// Runtime in minutes.
    pub runtime: u32,
    pub play_count: u32,
    pub released: Option<NaiveDate>,
    pub last_played: Option<NaiveDateTime>,
    pub date_added: Option<NaiveDateTime>,
    pub file_last_modified: Option<NaiveDateTime>,
    pub files: Vec<PathBuf>,
    pub actors: Vec<Actor>,
    pub stream_details: StreamDetails,
    pub images: ImagePaths,
}

impl Movie {
    pub fn sort_key(&self) -> String {
        self.sort_title.as_deref().unwrap_or(&self.title).to_lowercase()
    }
}

/// Season number of an episode. Season `0` holds specials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonNumber(pub u16);

impl SeasonNumber {
    /// Two-digit form used in episode pages (`01`).
    pub fn padded(self) -> String {
        format!("{:02}", self.0)
    }
}

impl fmt::Display for SeasonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeNumber(pub u16);

impl EpisodeNumber {
    pub fn padded(self) -> String {
        format!("{:02}", self.0)
    }
}

impl fmt::Display for EpisodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TvShow {
    pub id: u64,
    pub title: String,
    pub sort_title: Option<String>,
    pub imdb_id: String,
    pub ratings: Vec<Rating>,
    pub certification: String,
    pub first_aired: Option<NaiveDate>,
    pub network: String,
    pub overview: String,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    pub actors: Vec<Actor>,
    pub images: ImagePaths,
    pub episodes: Vec<Episode>,
}

impl TvShow {
    pub fn sort_key(&self) -> String {
        self.sort_title.as_deref().unwrap_or(&self.title).to_lowercase()
    }

    /// Distinct seasons of all non-dummy episodes, ascending.
    pub fn seasons(&self) -> Vec<SeasonNumber> {
        let seasons: BTreeSet<SeasonNumber> = self
            .episodes
            .iter()
            .filter(|e| !e.dummy)
            .map(|e| e.season)
            .collect();
        seasons.into_iter().collect()
    }

    /// Non-dummy episodes of one season, ordered by episode number.
    pub fn episodes_in(&self, season: SeasonNumber) -> Vec<&Episode> {
        let mut episodes: Vec<&Episode> = self
            .episodes
            .iter()
            .filter(|e| !e.dummy && e.season == season)
            .collect();
        episodes.sort_by(|a, b| a.order(b));
        episodes
    }

    /// All non-dummy episodes ordered by (season, episode).
    pub fn sorted_episodes(&self) -> Vec<&Episode> {
        let mut episodes: Vec<&Episode> = self.episodes.iter().filter(|e| !e.dummy).collect();
        episodes.sort_by(|a, b| a.order(b));
        episodes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub id: u64,
    pub title: String,
    pub season: SeasonNumber,
    pub episode: EpisodeNumber,
    pub ratings: Vec<Rating>,
    pub certification: String,
    pub first_aired: Option<NaiveDate>,
    pub last_played: Option<NaiveDateTime>,
    pub network: String,
    pub overview: String,
    pub writers: Vec<String>,
    pub directors: Vec<String>,
    pub stream_details: StreamDetails,
    pub images: ImagePaths,
    /// Placeholder for a missing episode; never exported.
    pub dummy: bool,
}

impl Episode {
    fn order(&self, other: &Episode) -> Ordering {
        (self.season, self.episode, self.id).cmp(&(other.season, other.episode, other.id))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Concert {
    pub id: u64,
    pub title: String,
    pub sort_title: Option<String>,
    pub artist: String,
    pub album: String,
    pub tagline: String,
    pub ratings: Vec<Rating>,
    pub released: Option<NaiveDate>,
    pub runtime: u32,
    pub certification: String,
    pub trailer: String,
    pub play_count: u32,
    pub last_played: Option<NaiveDateTime>,
    pub overview: String,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    pub stream_details: StreamDetails,
    pub images: ImagePaths,
}

impl Concert {
    pub fn sort_key(&self) -> String {
        self.sort_title.as_deref().unwrap_or(&self.title).to_lowercase()
    }
}
