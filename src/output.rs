//! CLI output formatting for export runs and pack checks.
//!
//! # Information-First Display
//!
//! Every exported entity is shown by its semantic identity (kind, running
//! count, title) with the written page as secondary context after `→`.
//! Skips are shown indented under the entity that caused them, and an
//! entity whose page was not written gets no `→`.
//!
//! # Output Format
//!
//! ## Export
//!
//! ```text
//! Movies (2)
//!     001 Alpha → movies/1.html
//!     002 Beta → movies/2.html
//! TV Shows (1)
//!     003 Show → tvshows/3.html
//!         004 Pilot → episodes/30.html
//! Lists
//!     movies → movies.html (2 items)
//!
//! Completed: 4 pages, 1 list, 3 images, 5 assets
//! ```
//!
//! ## Check
//!
//! ```text
//! movies.html       ok
//! movie.html        ok, unknown: MOVIE.TITEL
//! concerts.html     missing
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::export::{ExportEvent, ExportOutcome, ExportState};
use crate::templates::SectionCheck;
use crate::types::{EntityKind, Section};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based running count as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn section_title(section: Section) -> &'static str {
    match section {
        Section::Movies => "Movies",
        Section::TvShows => "TV Shows",
        Section::Concerts => "Concerts",
        Section::Movie => "Movie",
        Section::TvShow => "TV Show",
        Section::Episode => "Episode",
        Section::Concert => "Concert",
    }
}

/// Show `path` relative to `root` when it lives below it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// ============================================================================
// Export
// ============================================================================

/// Format a single export progress event as display lines.
///
/// Episodes are nested one level deeper than the entities of a section.
/// The `Lists` header is printed before the first list page.
pub fn format_export_event(event: &ExportEvent, root: &Path, first_list: bool) -> Vec<String> {
    match event {
        ExportEvent::SectionStarted { section, total } => {
            vec![format!("{} ({})", section_title(*section), total)]
        }
        ExportEvent::ItemExported {
            count,
            kind,
            title,
            path,
            ..
        } => {
            let depth = if *kind == EntityKind::Episode { 2 } else { 1 };
            let mut line = format!("{}{} {}", indent(depth), format_index(*count), title);
            if let Some(path) = path {
                line.push_str(&format!(" \u{2192} {}", display_path(path, root)));
            }
            vec![line]
        }
        ExportEvent::ItemSkipped { kind, id, error } => {
            vec![format!(
                "{}skipped {} {}: {}",
                indent(1),
                kind.as_str(),
                id,
                error
            )]
        }
        ExportEvent::FileSkipped { path, error } => {
            vec![format!(
                "{}not written: {} ({})",
                indent(2),
                display_path(path, root),
                error
            )]
        }
        ExportEvent::ListWritten {
            section,
            path,
            items,
        } => {
            let mut lines = Vec::new();
            if first_list {
                lines.push("Lists".to_string());
            }
            lines.push(format!(
                "{}{} \u{2192} {} ({})",
                indent(1),
                section,
                display_path(path, root),
                plural(*items, "item", "items")
            ));
            lines
        }
    }
}

/// Format the closing summary of a run.
pub fn format_summary(outcome: &ExportOutcome, images_written: usize) -> Vec<String> {
    let state = match outcome.state {
        ExportState::Completed => "Completed",
        ExportState::Cancelled => "Cancelled",
        ExportState::Running => "Running",
        ExportState::Idle => "Idle",
    };
    vec![
        String::new(),
        format!(
            "{}: {}, {}, {}, {}",
            state,
            plural(outcome.exported, "page", "pages"),
            plural(outcome.lists_written, "list", "lists"),
            plural(images_written, "image", "images"),
            plural(outcome.assets_copied, "asset", "assets"),
        ),
    ]
}

/// Prints export events as they arrive, tracking the `Lists` header.
#[derive(Debug, Default)]
pub struct EventPrinter {
    lists_seen: bool,
}

impl EventPrinter {
    pub fn print(&mut self, event: &ExportEvent, root: &Path) {
        let first_list = matches!(event, ExportEvent::ListWritten { .. }) && !self.lists_seen;
        if first_list {
            self.lists_seen = true;
        }
        for line in format_export_event(event, root, first_list) {
            println!("{}", line);
        }
    }
}

pub fn print_summary(outcome: &ExportOutcome, images_written: usize) {
    for line in format_summary(outcome, images_written) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a template pack check, one line per section.
pub fn format_check_report(report: &[SectionCheck]) -> Vec<String> {
    report
        .iter()
        .map(|check| {
            let file = check.section.template_file();
            let status = if !check.present {
                "missing".to_string()
            } else if check.unknown.is_empty() {
                "ok".to_string()
            } else {
                format!("ok, unknown: {}", check.unknown.join(", "))
            };
            format!("{:<18}{}", file, status)
        })
        .collect()
}

pub fn print_check_report(report: &[SectionCheck]) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome(state: ExportState) -> ExportOutcome {
        ExportOutcome {
            state,
            exported: 4,
            lists_written: 1,
            assets_copied: 5,
        }
    }

    // =========================================================================
    // Export events
    // =========================================================================

    #[test]
    fn section_header_shows_total() {
        let lines = format_export_event(
            &ExportEvent::SectionStarted {
                section: Section::TvShows,
                total: 3,
            },
            Path::new("/out"),
            false,
        );
        assert_eq!(lines, vec!["TV Shows (3)"]);
    }

    #[test]
    fn item_line_is_indexed_and_relative() {
        let lines = format_export_event(
            &ExportEvent::ItemExported {
                count: 1,
                kind: EntityKind::Movie,
                id: 7,
                title: "Alpha".into(),
                path: Some(PathBuf::from("/out/movies/7.html")),
            },
            Path::new("/out"),
            false,
        );
        assert_eq!(lines, vec!["    001 Alpha \u{2192} movies/7.html"]);
    }

    #[test]
    fn episodes_are_nested() {
        let lines = format_export_event(
            &ExportEvent::ItemExported {
                count: 12,
                kind: EntityKind::Episode,
                id: 30,
                title: "Pilot".into(),
                path: Some(PathBuf::from("/out/episodes/30.html")),
            },
            Path::new("/out"),
            false,
        );
        assert_eq!(lines, vec!["        012 Pilot \u{2192} episodes/30.html"]);
    }

    #[test]
    fn unwritten_item_has_no_arrow() {
        let lines = format_export_event(
            &ExportEvent::ItemExported {
                count: 1,
                kind: EntityKind::Movie,
                id: 1,
                title: "Alpha".into(),
                path: None,
            },
            Path::new("/out"),
            false,
        );
        assert_eq!(lines, vec!["    001 Alpha"]);
    }

    #[test]
    fn first_list_gets_header() {
        let event = ExportEvent::ListWritten {
            section: Section::Movies,
            path: PathBuf::from("/out/movies.html"),
            items: 1,
        };
        let first = format_export_event(&event, Path::new("/out"), true);
        assert_eq!(first, vec!["Lists", "    movies \u{2192} movies.html (1 item)"]);
        let later = format_export_event(&event, Path::new("/out"), false);
        assert_eq!(later.len(), 1);
    }

    #[test]
    fn file_skip_shows_error() {
        let lines = format_export_event(
            &ExportEvent::FileSkipped {
                path: PathBuf::from("/out/movies/1.html"),
                error: "Is a directory".into(),
            },
            Path::new("/out"),
            false,
        );
        assert_eq!(lines, vec!["        not written: movies/1.html (Is a directory)"]);
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_counts() {
        let lines = format_summary(&outcome(ExportState::Completed), 3);
        assert_eq!(lines[1], "Completed: 4 pages, 1 list, 3 images, 5 assets");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn summary_of_cancelled_run() {
        let lines = format_summary(&outcome(ExportState::Cancelled), 0);
        assert_eq!(lines, vec!["", "Cancelled: 4 pages, 1 list, 0 images, 5 assets"]);
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_report_lines() {
        let report = vec![
            SectionCheck {
                section: Section::Movies,
                present: true,
                unknown: vec![],
            },
            SectionCheck {
                section: Section::Movie,
                present: true,
                unknown: vec!["MOVIE.TITEL".into()],
            },
            SectionCheck {
                section: Section::Concerts,
                present: false,
                unknown: vec![],
            },
        ];
        assert_eq!(
            format_check_report(&report),
            vec![
                "movies.html       ok",
                "movie.html        ok, unknown: MOVIE.TITEL",
                "concerts.html     missing",
            ]
        );
    }
}
