//! Export orchestration.
//!
//! An [`Exporter`] is built fresh for each export and owns no hidden state
//! across runs. [`Exporter::run`] walks the requested sections in a fixed
//! order and writes one page per entity:
//!
//! ```text
//! Idle ──run──▶ Running ──all sections done──▶ Completed
//!                  │
//!                  └──cancel flag seen──▶ Cancelled
//! ```
//!
//! | Output | Path |
//! |---|---|
//! | List pages | `movies.html`, `tvshows.html`, `concerts.html` |
//! | Item pages | `movies/<id>.html`, `tvshows/<id>.html`, `episodes/<id>.html`, `concerts/<id>.html` |
//! | Artwork | `<kind>_images/` (written by the image resolver) |
//! | Static assets | copied from the template pack |
//!
//! Every written entity or episode is one unit of work: the counter
//! advances, an [`ExportEvent`] goes to the progress callback, and the
//! cancel flag is checked before the next unit starts. List pages are only
//! written once every requested section has finished, so a cancelled run
//! leaves item pages behind but no list page.
//!
//! Failures are contained per item. A render error skips that entity, a
//! write error skips that file; only setup failures (output root, static
//! assets) abort the run with an [`ExportError`].

use crate::entity::Entity;
use crate::library::Library;
use crate::template::blocks::{join_entities, replace_block};
use crate::template::{BlockMatch, BlockSpan, ImageResolver, Renderer, TemplateError, find_block};
use crate::templates::{TemplatePack, TemplatePackError};
use crate::types::{EntityKind, PageDepth, Section};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template pack error: {0}")]
    TemplatePack(#[from] TemplatePackError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Shared cancel flag. Cloning shares the flag; [`CancelHandle::cancel`]
/// may be called from any thread at any time.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Progress notifications, delivered in order to the progress callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    SectionStarted {
        section: Section,
        total: usize,
    },
    /// One unit of work finished. `count` never decreases within a run.
    /// `path` is the written page, `None` when the write failed.
    ItemExported {
        count: usize,
        kind: EntityKind,
        id: u64,
        title: String,
        path: Option<PathBuf>,
    },
    /// The entity could not be rendered and was left out.
    ItemSkipped {
        kind: EntityKind,
        id: u64,
        error: String,
    },
    /// A page could not be written.
    FileSkipped {
        path: PathBuf,
        error: String,
    },
    ListWritten {
        section: Section,
        path: PathBuf,
        items: usize,
    },
}

/// Summary of one run. Skipped items and files are reported through
/// events and the log only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub state: ExportState,
    pub exported: usize,
    pub lists_written: usize,
    pub assets_copied: usize,
}

/// Output directory layout.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    root: PathBuf,
}

impl ExportTarget {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Item page for an entity, relative to the root. Seasons have none.
    pub fn item_relative(kind: EntityKind, id: u64) -> Option<String> {
        kind.page_dir().map(|dir| format!("{dir}/{id}.html"))
    }

    pub fn item_path(&self, kind: EntityKind, id: u64) -> Option<PathBuf> {
        Self::item_relative(kind, id).map(|rel| self.root.join(rel))
    }

    pub fn list_path(&self, section: Section) -> PathBuf {
        self.root.join(section.template_file())
    }

    /// Create the page directory for `kind`.
    fn ensure_dir(&self, kind: EntityKind) -> std::io::Result<()> {
        match kind.page_dir() {
            Some(dir) => fs::create_dir_all(self.root.join(dir)),
            None => Ok(()),
        }
    }
}

type ProgressCallback<'a> = Box<dyn FnMut(&ExportEvent, &CancelHandle) + 'a>;

/// A list page waiting for the end of the run.
struct PendingList {
    section: Section,
    template: String,
    block: Option<BlockSpan>,
    entries: Vec<String>,
}

enum Flow {
    Continue,
    Cancelled,
}

pub struct Exporter<'a> {
    library: &'a Library,
    pack: &'a dyn TemplatePack,
    renderer: Renderer<'a>,
    block_match: BlockMatch,
    target: ExportTarget,
    state: ExportState,
    count: usize,
    outcome: ExportOutcome,
    cancel: CancelHandle,
    on_event: Option<ProgressCallback<'a>>,
}

impl<'a> Exporter<'a> {
    pub fn new(
        library: &'a Library,
        pack: &'a dyn TemplatePack,
        images: &'a dyn ImageResolver,
        target: ExportTarget,
        block_match: BlockMatch,
    ) -> Self {
        Self {
            library,
            pack,
            renderer: Renderer::new(images, block_match),
            block_match,
            target,
            state: ExportState::Idle,
            count: 0,
            outcome: empty_outcome(ExportState::Idle),
            cancel: CancelHandle::default(),
            on_event: None,
        }
    }

    /// Install a callback run after every event. It is the cooperative
    /// yield point of the export loop and may request cancellation through
    /// the handle it receives.
    pub fn with_progress(mut self, callback: impl FnMut(&ExportEvent, &CancelHandle) + 'a) -> Self {
        self.on_event = Some(Box::new(callback));
        self
    }

    /// Request a cooperative stop at the next unit boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Units exported so far in the current or last run.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn target(&self) -> &ExportTarget {
        &self.target
    }

    /// Back to `Idle` with counters and cancel flag cleared.
    pub fn reset(&mut self) {
        self.state = ExportState::Idle;
        self.count = 0;
        self.outcome = empty_outcome(ExportState::Idle);
        self.cancel.clear();
    }

    /// Export `sections`. Only list sections count; they always run in the
    /// order movies, tvshows, concerts whatever order they are given in.
    pub fn run(&mut self, sections: &[Section]) -> Result<ExportOutcome, ExportError> {
        self.reset();

        fs::create_dir_all(self.target.root())?;
        let assets_copied = self.pack.copy_static_assets(self.target.root())?;

        self.state = ExportState::Running;
        self.outcome.assets_copied = assets_copied;
        info!(root = %self.target.root().display(), assets_copied, "export started");

        for &ignored in sections.iter().filter(|s| !s.is_list()) {
            warn!(section = %ignored, "not a list section, ignored");
        }

        let mut pending = Vec::new();
        for section in Section::LISTS {
            if !sections.contains(&section) {
                continue;
            }
            match self.export_section(section, &mut pending) {
                Flow::Continue => {}
                Flow::Cancelled => {
                    info!(exported = self.count, "export cancelled");
                    return Ok(self.finish(ExportState::Cancelled));
                }
            }
        }

        for list in pending {
            self.write_list(list);
        }
        info!(exported = self.count, "export completed");
        Ok(self.finish(ExportState::Completed))
    }

    /// Render one entity against a template. Pure: no files, no counter.
    pub fn render_item(
        &self,
        template: &str,
        entity: &Entity<'_>,
        depth: PageDepth,
    ) -> Result<String, TemplateError> {
        self.renderer.render(template, entity, depth)
    }

    fn export_section(&mut self, section: Section, pending: &mut Vec<PendingList>) -> Flow {
        let library = self.library;
        let entities: Vec<Entity<'a>> = match section {
            Section::Movies => library.sorted_movies().into_iter().map(Entity::Movie).collect(),
            Section::TvShows => library
                .sorted_tv_shows()
                .into_iter()
                .map(Entity::TvShow)
                .collect(),
            Section::Concerts => library
                .sorted_concerts()
                .into_iter()
                .map(Entity::Concert)
                .collect(),
            _ => Vec::new(),
        };

        info!(section = %section, total = entities.len(), "exporting section");
        self.notify(ExportEvent::SectionStarted {
            section,
            total: entities.len(),
        });

        let list_template = self.pack.template(section);
        let block = section
            .list_block()
            .and_then(|name| match find_block(&list_template, name, self.block_match) {
                Ok(block) => block,
                Err(e) => {
                    error!(section = %section, error = %e, "cannot scan list template");
                    None
                }
            });
        if block.is_none() {
            debug!(section = %section, "list template has no entity block");
        }

        let item_template = section
            .item_section()
            .map(|s| self.pack.template(s))
            .unwrap_or_default();
        let episode_template = self.pack.template(Section::Episode);

        for kind in [EntityKind::Movie, EntityKind::TvShow, EntityKind::Episode, EntityKind::Concert] {
            let needed = match section {
                Section::Movies => kind == EntityKind::Movie,
                Section::TvShows => matches!(kind, EntityKind::TvShow | EntityKind::Episode),
                Section::Concerts => kind == EntityKind::Concert,
                _ => false,
            };
            if !needed {
                continue;
            }
            if let Err(e) = self.target.ensure_dir(kind) {
                warn!(kind = kind.as_str(), error = %e, "cannot create page directory");
            }
        }

        let mut entries = Vec::with_capacity(entities.len());
        for entity in entities {
            if self.cancel.is_cancelled() {
                return Flow::Cancelled;
            }

            let page = match self.render_item(&item_template, &entity, PageDepth::Item) {
                Ok(page) => page,
                Err(e) => {
                    self.skip_item(&entity, &e);
                    continue;
                }
            };
            if let Some(span) = &block {
                match self.render_item(&span.inner, &entity, PageDepth::Root) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => self.skip_item(&entity, &e),
                }
            }
            self.emit(&entity, &page);

            if let Entity::TvShow(show) = entity {
                for episode in show.sorted_episodes() {
                    if self.cancel.is_cancelled() {
                        return Flow::Cancelled;
                    }
                    let entity = Entity::Episode { show, episode };
                    match self.render_item(&episode_template, &entity, PageDepth::Item) {
                        Ok(page) => self.emit(&entity, &page),
                        Err(e) => self.skip_item(&entity, &e),
                    }
                }
            }
        }

        pending.push(PendingList {
            section,
            template: list_template,
            block,
            entries,
        });
        Flow::Continue
    }

    /// Write an item page and account for it as one unit of work.
    fn emit(&mut self, entity: &Entity<'_>, page: &str) {
        let kind = entity.kind();
        let Some(path) = self.target.item_path(kind, entity.id()) else {
            return;
        };

        let written = match fs::write(&path, page) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot write page, skipped");
                self.notify(ExportEvent::FileSkipped {
                    path,
                    error: e.to_string(),
                });
                None
            }
        };

        self.count += 1;
        debug!(count = self.count, kind = kind.as_str(), id = entity.id(), "exported");
        self.notify(ExportEvent::ItemExported {
            count: self.count,
            kind,
            id: entity.id(),
            title: entity.title().to_string(),
            path: written,
        });
    }

    fn skip_item(&mut self, entity: &Entity<'_>, e: &TemplateError) {
        error!(kind = entity.kind().as_str(), id = entity.id(), error = %e, "cannot render, skipped");
        self.notify(ExportEvent::ItemSkipped {
            kind: entity.kind(),
            id: entity.id(),
            error: e.to_string(),
        });
    }

    fn write_list(&mut self, list: PendingList) {
        let page = match &list.block {
            Some(block) => replace_block(
                &list.template,
                block,
                &join_entities(&list.entries),
                self.block_match,
            ),
            None => list.template,
        };
        let path = self.target.list_path(list.section);
        match fs::write(&path, page) {
            Ok(()) => {
                self.outcome.lists_written += 1;
                self.notify(ExportEvent::ListWritten {
                    section: list.section,
                    path,
                    items: list.entries.len(),
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot write list page, skipped");
                self.notify(ExportEvent::FileSkipped {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    fn notify(&mut self, event: ExportEvent) {
        if let Some(callback) = self.on_event.as_mut() {
            callback(&event, &self.cancel);
        }
    }

    fn finish(&mut self, state: ExportState) -> ExportOutcome {
        self.state = state;
        self.outcome.state = state;
        self.outcome.exported = self.count;
        self.outcome.clone()
    }
}

fn empty_outcome(state: ExportState) -> ExportOutcome {
    ExportOutcome {
        state,
        exported: 0,
        lists_written: 0,
        assets_copied: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FallbackImages, StaticPack, concert, episode, movie, show};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn library() -> Library {
        let mut s = show(3, "Show");
        s.episodes = vec![episode(31, 1, 2), episode(30, 1, 1)];
        Library {
            movies: vec![movie(2, "Beta"), movie(1, "Alpha")],
            tv_shows: vec![s],
            concerts: vec![concert(9, "Live")],
        }
    }

    fn pack() -> StaticPack {
        StaticPack::new(&[
            (Section::Movies, "<ul>{{ BEGIN_BLOCK_MOVIE }}<li>{{ MOVIE.TITLE }}</li>{{ END_BLOCK_MOVIE }}</ul>"),
            (Section::Movie, "<h1>{{ MOVIE.TITLE }}</h1>"),
            (Section::TvShows, "{{ BEGIN_BLOCK_TVSHOW }}{{ TVSHOW.TITLE }}{{ END_BLOCK_TVSHOW }}"),
            (Section::TvShow, "{{ TVSHOW.TITLE }}"),
            (Section::Episode, "{{ EPISODE.SEASON }}x{{ EPISODE.EPISODE }}"),
            (Section::Concerts, "{{ BEGIN_BLOCK_CONCERT }}{{ CONCERT.TITLE }}{{ END_BLOCK_CONCERT }}"),
            (Section::Concert, "{{ CONCERT.TITLE }}"),
        ])
    }

    // =========================================================================
    // State machine
    // =========================================================================

    #[test]
    fn completed_run_writes_items_and_lists() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        );
        assert_eq!(exporter.state(), ExportState::Idle);

        let outcome = exporter.run(&Section::LISTS).unwrap();
        assert_eq!(outcome.state, ExportState::Completed);
        assert_eq!(exporter.state(), ExportState::Completed);
        // 2 movies + 1 show + 2 episodes + 1 concert
        assert_eq!(outcome.exported, 6);
        assert_eq!(outcome.lists_written, 3);

        let root = tmp.path();
        assert_eq!(fs::read_to_string(root.join("movies/1.html")).unwrap(), "<h1>Alpha</h1>");
        assert_eq!(
            fs::read_to_string(root.join("movies.html")).unwrap(),
            "<ul><li>Alpha</li>\n<li>Beta</li></ul>"
        );
        assert_eq!(fs::read_to_string(root.join("episodes/30.html")).unwrap(), "01x01");
        assert!(root.join("tvshows/3.html").exists());
        assert!(root.join("concerts/9.html").exists());
        assert!(root.join("concerts.html").exists());
    }

    #[test]
    fn sections_run_in_fixed_order() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let started = Rc::new(RefCell::new(Vec::new()));
        let seen = started.clone();
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        )
        .with_progress(move |event, _| {
            if let ExportEvent::SectionStarted { section, .. } = event {
                seen.borrow_mut().push(*section);
            }
        });

        exporter
            .run(&[Section::Concerts, Section::Movies, Section::Movie])
            .unwrap();
        assert_eq!(*started.borrow(), vec![Section::Movies, Section::Concerts]);
        assert!(!tmp.path().join("tvshows.html").exists());
    }

    #[test]
    fn progress_count_is_monotonic() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let counts = Rc::new(RefCell::new(Vec::new()));
        let seen = counts.clone();
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        )
        .with_progress(move |event, _| {
            if let ExportEvent::ItemExported { count, .. } = event {
                seen.borrow_mut().push(*count);
            }
        });

        exporter.run(&Section::LISTS).unwrap();
        assert_eq!(*counts.borrow(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn cancel_stops_before_next_unit() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        )
        .with_progress(|event, cancel| {
            if let ExportEvent::ItemExported { count: 1, .. } = event {
                cancel.cancel();
            }
        });

        let outcome = exporter.run(&Section::LISTS).unwrap();
        assert_eq!(outcome.state, ExportState::Cancelled);
        assert_eq!(outcome.exported, 1);
        assert!(tmp.path().join("movies/1.html").exists());
        assert!(!tmp.path().join("movies/2.html").exists());
        assert!(!tmp.path().join("movies.html").exists());
    }

    #[test]
    fn cancel_inside_episode_loop() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        )
        .with_progress(|event, cancel| {
            if let ExportEvent::ItemExported { id: 30, .. } = event {
                cancel.cancel();
            }
        });

        let outcome = exporter.run(&[Section::TvShows]).unwrap();
        assert_eq!(outcome.state, ExportState::Cancelled);
        assert!(tmp.path().join("episodes/30.html").exists());
        assert!(!tmp.path().join("episodes/31.html").exists());
    }

    #[test]
    fn rerun_after_cancel_starts_fresh() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        );
        exporter.cancel();
        exporter.reset();
        assert_eq!(exporter.state(), ExportState::Idle);

        let outcome = exporter.run(&[Section::Movies]).unwrap();
        assert_eq!(outcome.state, ExportState::Completed);
        assert_eq!(exporter.count(), 2);
    }

    // =========================================================================
    // Per-item failures
    // =========================================================================

    #[test]
    fn write_failure_skips_file_and_continues() {
        let tmp = TempDir::new().unwrap();
        // A directory where movies/1.html should go makes that write fail
        fs::create_dir_all(tmp.path().join("movies/1.html")).unwrap();

        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let events = Rc::new(RefCell::new(Vec::new()));
        let seen = events.clone();
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        )
        .with_progress(move |event, _| seen.borrow_mut().push(event.clone()));

        let outcome = exporter.run(&[Section::Movies]).unwrap();
        assert_eq!(outcome.state, ExportState::Completed);
        assert_eq!(outcome.exported, 2);

        let events = events.borrow();
        let skipped: Vec<&PathBuf> = events
            .iter()
            .filter_map(|e| match e {
                ExportEvent::FileSkipped { path, .. } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![&tmp.path().join("movies/1.html")]);
        // The unit still counts, but names no page
        let exported: Vec<(u64, Option<PathBuf>)> = events
            .iter()
            .filter_map(|e| match e {
                ExportEvent::ItemExported { id, path, .. } => Some((*id, path.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            exported,
            vec![(1, None), (2, Some(tmp.path().join("movies/2.html")))]
        );
        assert!(tmp.path().join("movies/2.html").is_file());
        assert!(tmp.path().join("movies.html").is_file());
    }

    #[test]
    fn list_template_without_block_is_written_verbatim() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = StaticPack::new(&[(Section::Movies, "<p>static</p>")]);
        let images = FallbackImages;
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::First,
        );

        exporter.run(&[Section::Movies]).unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("movies.html")).unwrap(),
            "<p>static</p>"
        );
        // Missing item template still yields (empty) pages
        assert_eq!(fs::read_to_string(tmp.path().join("movies/1.html")).unwrap(), "");
    }

    #[test]
    fn render_item_touches_no_files() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = pack();
        let images = FallbackImages;
        let exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path().join("out")),
            BlockMatch::First,
        );
        let m = movie(7, "Alpha");
        let page = exporter
            .render_item(
                "{{ MOVIE.TITLE }} {{ MOVIE.RATING }} {{ IMAGE.poster[300,450] }}",
                &Entity::Movie(&m),
                PageDepth::Item,
            )
            .unwrap();
        assert_eq!(page, "Alpha n/a ../defaults/movie_poster_300x450.png");
        assert!(!tmp.path().join("out").exists());
        assert_eq!(exporter.count(), 0);
    }

    #[test]
    fn target_paths() {
        let target = ExportTarget::new("/out");
        assert_eq!(
            target.item_path(EntityKind::Episode, 5),
            Some(PathBuf::from("/out/episodes/5.html"))
        );
        assert_eq!(target.item_path(EntityKind::Season, 5), None);
        assert_eq!(target.list_path(Section::TvShows), PathBuf::from("/out/tvshows.html"));
    }

    #[test]
    fn last_mode_list_page_fills_identical_blocks() {
        let tmp = TempDir::new().unwrap();
        let lib = library();
        let pack = StaticPack::new(&[(
            Section::Movies,
            "{{ BEGIN_BLOCK_MOVIE }}{{ MOVIE.TITLE }}{{ END_BLOCK_MOVIE }}|\
             {{ BEGIN_BLOCK_MOVIE }}{{ MOVIE.TITLE }}{{ END_BLOCK_MOVIE }}",
        )]);
        let images = FallbackImages;
        let mut exporter = Exporter::new(
            &lib,
            &pack,
            &images,
            ExportTarget::new(tmp.path()),
            BlockMatch::Last,
        );

        exporter.run(&[Section::Movies]).unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("movies.html")).unwrap(),
            "Alpha\nBeta|Alpha\nBeta"
        );
    }
}
