//! Scalar placeholder substitution.
//!
//! Each entity variant has a static field table mapping a placeholder name
//! to an accessor. [`render_scalar`] walks the table for the entity it is
//! given and replaces every literal occurrence of each placeholder. Names
//! that are not in the table are left alone, so a template may mention
//! fields of other entities (or typos) without failing.
//!
//! Formatting rules:
//!
//! | Value | Rendering |
//! |---|---|
//! | free text | HTML-escaped, newlines become `<br />` in plots |
//! | list (genres, tags, ...) | joined with `", "`, then escaped |
//! | date | `%Y-%m-%d`, empty when unset |
//! | timestamp | `%Y-%m-%d %H:%M`, empty when unset |
//! | id, counts, runtime | plain integer |
//! | rating | one decimal; `n/a` without ratings (also for votes) |

use crate::entity::Entity;
use crate::library::{
    AudioDetail, Concert, Episode, Movie, Rating, SeasonNumber, StreamDetails, SubtitleDetail,
    TvShow, VideoDetail,
};
use crate::types::EntityKind;
use chrono::{NaiveDate, NaiveDateTime};
use maud::html;

use super::scanner::{find_placeholder, placeholder};

type Field<T> = (&'static str, fn(&T) -> String);

/// HTML-escape `&`, `<`, `>` and `"`.
///
/// `{` becomes `&#123;` as well: later passes scan the substituted text for
/// blocks and image tokens, and library text must never form one.
pub fn escape_html(value: &str) -> String {
    html! { (value) }.into_string().replace('{', "&#123;")
}

/// Escape multi-line prose, turning line breaks into `<br />`.
pub fn escape_multiline(value: &str) -> String {
    escape_html(value).replace('\n', "<br />")
}

fn escape_list(values: &[String]) -> String {
    escape_html(&values.join(", "))
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn year(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y").to_string()).unwrap_or_default()
}

fn timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn rating(ratings: &[Rating]) -> String {
    ratings
        .first()
        .map(|r| format!("{:.1}", r.rating))
        .unwrap_or_else(|| "n/a".to_string())
}

fn votes(ratings: &[Rating]) -> String {
    ratings
        .first()
        .map(|r| r.vote_count.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn first_file(movie: &Movie) -> String {
    movie
        .files
        .first()
        .map(|f| escape_html(&f.display().to_string()))
        .unwrap_or_default()
}

fn first_file_dir(movie: &Movie) -> String {
    movie
        .files
        .first()
        .and_then(|f| f.parent())
        .map(|d| escape_html(&d.display().to_string()))
        .unwrap_or_default()
}

const MOVIE_FIELDS: &[Field<Movie>] = &[
    ("MOVIE.ID", |m| m.id.to_string()),
    ("MOVIE.LINK", |m| format!("movies/{}.html", m.id)),
    ("MOVIE.IMDB_ID", |m| m.imdb_id.clone()),
    ("MOVIE.TMDB_ID", |m| m.tmdb_id.clone()),
    ("MOVIE.TITLE", |m| escape_html(&m.title)),
    ("MOVIE.YEAR", |m| year(m.released)),
    ("MOVIE.ORIGINAL_TITLE", |m| escape_html(&m.original_title)),
    ("MOVIE.PLOT", |m| escape_multiline(&m.overview)),
    ("MOVIE.PLOT_SIMPLE", |m| escape_multiline(&m.outline)),
    ("MOVIE.SET", |m| escape_html(m.set.as_deref().unwrap_or(""))),
    ("MOVIE.TAGLINE", |m| escape_html(&m.tagline)),
    ("MOVIE.GENRES", |m| escape_list(&m.genres)),
    ("MOVIE.COUNTRIES", |m| escape_list(&m.countries)),
    ("MOVIE.STUDIOS", |m| escape_list(&m.studios)),
    ("MOVIE.TAGS", |m| escape_list(&m.tags)),
    ("MOVIE.WRITER", |m| escape_html(&m.writer)),
    ("MOVIE.DIRECTOR", |m| escape_html(&m.director)),
    ("MOVIE.CERTIFICATION", |m| escape_html(&m.certification)),
    ("MOVIE.TRAILER", |m| escape_html(&m.trailer)),
    ("MOVIE.LABEL", |m| m.label.as_str().to_string()),
    ("MOVIE.RATING", |m| rating(&m.ratings)),
    ("MOVIE.VOTES", |m| votes(&m.ratings)),
    ("MOVIE.RUNTIME", |m| m.runtime.to_string()),
    ("MOVIE.PLAY_COUNT", |m| m.play_count.to_string()),
    ("MOVIE.LAST_PLAYED", |m| timestamp(m.last_played)),
    ("MOVIE.DATE_ADDED", |m| timestamp(m.date_added)),
    ("MOVIE.FILE_LAST_MODIFIED", |m| timestamp(m.file_last_modified)),
    ("MOVIE.FILENAME", first_file),
    ("MOVIE.DIR", first_file_dir),
];

const TVSHOW_FIELDS: &[Field<TvShow>] = &[
    ("TVSHOW.ID", |s| s.id.to_string()),
    ("TVSHOW.LINK", |s| format!("tvshows/{}.html", s.id)),
    ("TVSHOW.IMDB_ID", |s| s.imdb_id.clone()),
    ("TVSHOW.TITLE", |s| escape_html(&s.title)),
    ("TVSHOW.RATING", |s| rating(&s.ratings)),
    ("TVSHOW.VOTES", |s| votes(&s.ratings)),
    ("TVSHOW.CERTIFICATION", |s| escape_html(&s.certification)),
    ("TVSHOW.FIRST_AIRED", |s| date(s.first_aired)),
    ("TVSHOW.STUDIO", |s| escape_html(&s.network)),
    ("TVSHOW.PLOT", |s| escape_multiline(&s.overview)),
    ("TVSHOW.TAGS", |s| escape_list(&s.tags)),
    ("TVSHOW.GENRES", |s| escape_list(&s.genres)),
];

const SEASON_FIELDS: &[Field<SeasonNumber>] = &[("SEASON", |s| s.to_string())];

const EPISODE_SHOW_FIELDS: &[Field<TvShow>] = &[
    ("SHOW.TITLE", |s| escape_html(&s.title)),
    ("SHOW.LINK", |s| format!("../tvshows/{}.html", s.id)),
];

const EPISODE_FIELDS: &[Field<Episode>] = &[
    ("EPISODE.LINK", |e| format!("../episodes/{}.html", e.id)),
    ("EPISODE.TITLE", |e| escape_html(&e.title)),
    ("EPISODE.SEASON", |e| e.season.padded()),
    ("EPISODE.EPISODE", |e| e.episode.padded()),
    ("EPISODE.RATING", |e| rating(&e.ratings)),
    ("EPISODE.CERTIFICATION", |e| escape_html(&e.certification)),
    ("EPISODE.FIRST_AIRED", |e| date(e.first_aired)),
    ("EPISODE.LAST_PLAYED", |e| timestamp(e.last_played)),
    ("EPISODE.STUDIO", |e| escape_html(&e.network)),
    ("EPISODE.PLOT", |e| escape_multiline(&e.overview)),
    ("EPISODE.WRITERS", |e| escape_list(&e.writers)),
    ("EPISODE.DIRECTORS", |e| escape_list(&e.directors)),
];

const CONCERT_FIELDS: &[Field<Concert>] = &[
    ("CONCERT.ID", |c| c.id.to_string()),
    ("CONCERT.LINK", |c| format!("concerts/{}.html", c.id)),
    ("CONCERT.TITLE", |c| escape_html(&c.title)),
    ("CONCERT.ARTIST", |c| escape_html(&c.artist)),
    ("CONCERT.ALBUM", |c| escape_html(&c.album)),
    ("CONCERT.TAGLINE", |c| escape_html(&c.tagline)),
    ("CONCERT.RATING", |c| rating(&c.ratings)),
    ("CONCERT.YEAR", |c| year(c.released)),
    ("CONCERT.RUNTIME", |c| c.runtime.to_string()),
    ("CONCERT.CERTIFICATION", |c| escape_html(&c.certification)),
    ("CONCERT.TRAILER", |c| escape_html(&c.trailer)),
    ("CONCERT.PLAY_COUNT", |c| c.play_count.to_string()),
    ("CONCERT.LAST_PLAYED", |c| timestamp(c.last_played)),
    ("CONCERT.PLOT", |c| escape_multiline(&c.overview)),
    ("CONCERT.TAGS", |c| escape_list(&c.tags)),
    ("CONCERT.GENRES", |c| escape_list(&c.genres)),
];

/// Absent video attributes render as `0`, except the codec which is empty.
const STREAM_FIELDS: &[Field<StreamDetails>] = &[
    ("FILEINFO.WIDTH", |d| d.video_value(VideoDetail::Width, "0").to_string()),
    ("FILEINFO.HEIGHT", |d| d.video_value(VideoDetail::Height, "0").to_string()),
    ("FILEINFO.ASPECT", |d| d.video_value(VideoDetail::Aspect, "0").to_string()),
    ("FILEINFO.CODEC", |d| d.video_value(VideoDetail::Codec, "").to_string()),
    ("FILEINFO.DURATION", |d| {
        d.video_value(VideoDetail::DurationInSeconds, "0").to_string()
    }),
    ("FILEINFO.AUDIO.CODEC", |d| d.audio_values(AudioDetail::Codec).join("|")),
    ("FILEINFO.AUDIO.CHANNELS", |d| d.audio_values(AudioDetail::Channels).join("|")),
    ("FILEINFO.AUDIO.LANGUAGE", |d| d.audio_values(AudioDetail::Language).join("|")),
    ("FILEINFO.SUBTITLES.LANGUAGE", |d| {
        d.subtitle_values(SubtitleDetail::Language).join("|")
    }),
];

fn apply<T>(buffer: &mut String, fields: &[Field<T>], value: &T) {
    for (name, accessor) in fields {
        if find_placeholder(buffer, name).is_some() {
            *buffer = buffer.replace(&placeholder(name), &accessor(value));
        }
    }
}

/// Replace every recognized scalar placeholder of `entity` in `buffer`.
pub fn render_scalar(buffer: &str, entity: &Entity<'_>) -> String {
    let mut out = buffer.to_string();
    match *entity {
        Entity::Movie(movie) => {
            apply(&mut out, MOVIE_FIELDS, movie);
            apply(&mut out, STREAM_FIELDS, &movie.stream_details);
        }
        Entity::TvShow(show) => apply(&mut out, TVSHOW_FIELDS, show),
        Entity::Season { season, .. } => apply(&mut out, SEASON_FIELDS, &season),
        Entity::Episode { show, episode } => {
            apply(&mut out, EPISODE_SHOW_FIELDS, show);
            apply(&mut out, EPISODE_FIELDS, episode);
            apply(&mut out, STREAM_FIELDS, &episode.stream_details);
        }
        Entity::Concert(concert) => {
            apply(&mut out, CONCERT_FIELDS, concert);
            apply(&mut out, STREAM_FIELDS, &concert.stream_details);
        }
    }
    out
}

/// Scalar placeholder names [`render_scalar`] understands for `kind`.
pub fn recognized_placeholders(kind: EntityKind) -> Vec<&'static str> {
    fn names<T>(fields: &[Field<T>]) -> Vec<&'static str> {
        fields.iter().map(|(name, _)| *name).collect()
    }
    match kind {
        EntityKind::Movie => [names(MOVIE_FIELDS), names(STREAM_FIELDS)].concat(),
        EntityKind::TvShow => names(TVSHOW_FIELDS),
        EntityKind::Season => names(SEASON_FIELDS),
        EntityKind::Episode => [
            names(EPISODE_SHOW_FIELDS),
            names(EPISODE_FIELDS),
            names(STREAM_FIELDS),
        ]
        .concat(),
        EntityKind::Concert => [names(CONCERT_FIELDS), names(STREAM_FIELDS)].concat(),
    }
}

/// Placeholders that only have meaning inside a list or actors block.
pub const BLOCK_ITEM_PLACEHOLDERS: &[&str] = &[
    "TAG.NAME",
    "GENRE.NAME",
    "COUNTRY.NAME",
    "STUDIO.NAME",
    "WRITER.NAME",
    "DIRECTOR.NAME",
    "ACTOR.NAME",
    "ACTOR.ROLE",
];

/// A single-field list block: `BEGIN_BLOCK_<block>` repeated per value,
/// substituting `{{ <item> }}`.
#[derive(Debug, Clone, Copy)]
pub struct ListBlock<'a> {
    pub block: &'static str,
    pub item: &'static str,
    pub values: &'a [String],
}

/// The single-field list blocks an entity provides.
pub fn list_blocks<'a>(entity: &Entity<'a>) -> Vec<ListBlock<'a>> {
    let block = |block, item, values| ListBlock {
        block,
        item,
        values,
    };
    match *entity {
        Entity::Movie(m) => vec![
            block("TAGS", "TAG.NAME", &m.tags[..]),
            block("GENRES", "GENRE.NAME", &m.genres[..]),
            block("COUNTRIES", "COUNTRY.NAME", &m.countries[..]),
            block("STUDIOS", "STUDIO.NAME", &m.studios[..]),
        ],
        Entity::TvShow(s) => vec![
            block("TAGS", "TAG.NAME", &s.tags[..]),
            block("GENRES", "GENRE.NAME", &s.genres[..]),
        ],
        Entity::Episode { episode, .. } => vec![
            block("WRITERS", "WRITER.NAME", &episode.writers[..]),
            block("DIRECTORS", "DIRECTOR.NAME", &episode.directors[..]),
        ],
        Entity::Concert(c) => vec![
            block("TAGS", "TAG.NAME", &c.tags[..]),
            block("GENRES", "GENRE.NAME", &c.genres[..]),
        ],
        Entity::Season { .. } => Vec::new(),
    }
}
