//! Per-entity rendering.
//!
//! [`Renderer::render`] turns one template and one entity into text:
//!
//! 1. scalar fields ([`render_scalar`])
//! 2. single-field list blocks (tags, genres, writers, ...)
//! 3. the actors block (name + role)
//! 4. for shows, the season block and inside it the episode block
//! 5. image tokens, resolved through an [`ImageResolver`]
//!
//! Images come last so that image tokens inside an episode block have
//! already been bound to that episode when the show's own pass runs.
//!
//! Rendering never touches the filesystem directly; whatever I/O happens
//! is up to the resolver.

use super::TemplateError;
use super::blocks::{expand_entity_block, expand_multi_block, expand_single_block};
use super::fields::{list_blocks, render_scalar};
use super::scanner::{BlockMatch, image_tokens};
use crate::entity::Entity;
use crate::library::{Actor, TvShow};
use crate::types::PageDepth;
use std::collections::HashMap;

/// Turns an `{{ IMAGE.role[w,h] }}` request into a path.
pub trait ImageResolver {
    /// Path relative to the export root (no depth prefix) for `entity`'s
    /// `role` artwork at `width`×`height`. `role` is already lowercase.
    fn resolve(&self, entity: &Entity<'_>, role: &str, width: u32, height: u32) -> String;
}

pub struct Renderer<'a> {
    images: &'a dyn ImageResolver,
    block_match: BlockMatch,
}

impl<'a> Renderer<'a> {
    pub fn new(images: &'a dyn ImageResolver, block_match: BlockMatch) -> Self {
        Self {
            images,
            block_match,
        }
    }

    /// Render `template` for `entity` as a page at `depth`.
    pub fn render(
        &self,
        template: &str,
        entity: &Entity<'_>,
        depth: PageDepth,
    ) -> Result<String, TemplateError> {
        let mut out = self.render_fields(template, entity)?;
        if let Entity::TvShow(show) = *entity {
            out = self.render_seasons(&out, show, depth)?;
        }
        Ok(self.render_images(&out, entity, depth))
    }

    fn render_fields(&self, template: &str, entity: &Entity<'_>) -> Result<String, TemplateError> {
        let mut out = render_scalar(template, entity);
        for list in list_blocks(entity) {
            out = expand_single_block(&out, list.block, list.item, list.values, self.block_match)?;
        }
        match *entity {
            Entity::Movie(movie) => out = self.render_actors(&out, &movie.actors)?,
            Entity::TvShow(show) => out = self.render_actors(&out, &show.actors)?,
            _ => {}
        }
        Ok(out)
    }

    fn render_actors(&self, text: &str, actors: &[Actor]) -> Result<String, TemplateError> {
        let (names, roles): (Vec<String>, Vec<String>) = actors
            .iter()
            .map(|a| (a.name.clone(), a.role.clone()))
            .unzip();
        expand_multi_block(
            text,
            "ACTORS",
            &["ACTOR.NAME", "ACTOR.ROLE"],
            &[&names, &roles],
            self.block_match,
        )
    }

    /// Expand `SEASON` blocks in an already-rendered show buffer, each with
    /// its nested `EPISODE` block.
    fn render_seasons(
        &self,
        text: &str,
        show: &TvShow,
        depth: PageDepth,
    ) -> Result<String, TemplateError> {
        let seasons = show.seasons();
        expand_entity_block(text, "SEASON", &seasons, self.block_match, |inner, &season| {
            let season_text = render_scalar(inner, &Entity::Season { show, season });
            let episodes = show.episodes_in(season);
            expand_entity_block(
                &season_text,
                "EPISODE",
                &episodes,
                self.block_match,
                |inner, &episode| self.render(inner, &Entity::Episode { show, episode }, depth),
            )
        })
    }

    fn render_images(&self, text: &str, entity: &Entity<'_>, depth: PageDepth) -> String {
        if matches!(entity, Entity::Season { .. }) {
            return text.to_string();
        }
        let mut resolved: HashMap<String, String> = HashMap::new();
        for token in image_tokens(text) {
            if resolved.contains_key(&token.text) {
                continue;
            }
            let path = self
                .images
                .resolve(entity, &token.role, token.width, token.height);
            resolved.insert(token.text, format!("{}{}", depth.prefix(), path));
        }
        let mut out = text.to_string();
        for (token, path) in &resolved {
            out = out.replace(token, path);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Actor, SeasonNumber};
    use crate::test_helpers::{episode, movie, show};
    use std::cell::RefCell;

    /// Resolver that answers with a descriptive path and records each call.
    #[derive(Default)]
    struct RecordingResolver {
        calls: RefCell<Vec<String>>,
    }

    impl ImageResolver for RecordingResolver {
        fn resolve(&self, entity: &Entity<'_>, role: &str, width: u32, height: u32) -> String {
            let path = format!("{}-{}-{}-{width}x{height}", entity.kind().as_str(), entity.id(), role);
            self.calls.borrow_mut().push(path.clone());
            path
        }
    }

    fn renderer(resolver: &RecordingResolver) -> Renderer<'_> {
        Renderer::new(resolver, BlockMatch::First)
    }

    #[test]
    fn movie_with_blocks_and_actors() {
        let mut m = movie(7, "Alpha");
        m.tags = vec!["cult".into(), "b&w".into()];
        m.actors = vec![
            Actor {
                name: "Ann".into(),
                role: "Hero".into(),
            },
            Actor {
                name: "Bob".into(),
                role: "Villain".into(),
            },
        ];
        let template = "<h1>{{ MOVIE.TITLE }}</h1>\
            {{ BEGIN_BLOCK_TAGS }}<i>{{ TAG.NAME }}</i>{{ END_BLOCK_TAGS }}\
            {{ BEGIN_BLOCK_ACTORS }}{{ ACTOR.NAME }}={{ ACTOR.ROLE }}{{ END_BLOCK_ACTORS }}";

        let resolver = RecordingResolver::default();
        let out = renderer(&resolver)
            .render(template, &Entity::Movie(&m), PageDepth::Item)
            .unwrap();
        assert_eq!(
            out,
            "<h1>Alpha</h1><i>cult</i> <i>b&amp;w</i>Ann=Hero Bob=Villain"
        );
    }

    #[test]
    fn image_paths_get_depth_prefix() {
        let m = movie(7, "Alpha");
        let template = "<img src=\"{{ IMAGE.Poster[300,450] }}\"><img src=\"{{ IMAGE.Poster[300,450] }}\">";
        let resolver = RecordingResolver::default();

        let out = renderer(&resolver)
            .render(template, &Entity::Movie(&m), PageDepth::Item)
            .unwrap();
        assert_eq!(
            out,
            "<img src=\"../movie-7-poster-300x450\"><img src=\"../movie-7-poster-300x450\">"
        );
        // identical tokens resolve once
        assert_eq!(resolver.calls.borrow().len(), 1);

        let out = renderer(&resolver)
            .render(template, &Entity::Movie(&m), PageDepth::Root)
            .unwrap();
        assert!(out.starts_with("<img src=\"movie-7-poster-300x450\">"));
    }

    #[test]
    fn malformed_image_token_is_left_alone() {
        let m = movie(7, "Alpha");
        let template = "{{ IMAGE.poster[,450] }}";
        let resolver = RecordingResolver::default();
        let out = renderer(&resolver)
            .render(template, &Entity::Movie(&m), PageDepth::Item)
            .unwrap();
        assert_eq!(out, template);
        assert!(resolver.calls.borrow().is_empty());
    }

    #[test]
    fn token_text_in_library_values_stays_text() {
        let mut m = movie(7, "{{ IMAGE.poster[300,450] }}");
        m.tags = vec!["{{ IMAGE.fanart[1280,720] }}".into()];
        let template = "<h1>{{ MOVIE.TITLE }}</h1>{{ BEGIN_BLOCK_TAGS }}{{ TAG.NAME }}{{ END_BLOCK_TAGS }}";
        let resolver = RecordingResolver::default();

        let out = renderer(&resolver)
            .render(template, &Entity::Movie(&m), PageDepth::Item)
            .unwrap();
        assert_eq!(
            out,
            "<h1>&#123;&#123; IMAGE.poster[300,450] }}</h1>&#123;&#123; IMAGE.fanart[1280,720] }}"
        );
        assert!(resolver.calls.borrow().is_empty());
    }

    fn show_with_episodes() -> TvShow {
        let mut s = show(3, "Show");
        s.episodes = vec![
            episode(12, 1, 2),
            episode(11, 1, 1),
            episode(21, 2, 1),
            episode(99, 2, 2),
        ];
        s.episodes[3].dummy = true;
        s
    }

    const SHOW_TEMPLATE: &str = "{{ TVSHOW.TITLE }}\n\
        {{ BEGIN_BLOCK_SEASON }}\n\
        [S{{ SEASON }}: {{ BEGIN_BLOCK_EPISODE }}{{ EPISODE.SEASON }}x{{ EPISODE.EPISODE }}{{ END_BLOCK_EPISODE }}]\n\
        {{ END_BLOCK_SEASON }}";

    #[test]
    fn seasons_and_episodes_render_in_order() {
        let s = show_with_episodes();
        let resolver = RecordingResolver::default();
        let out = renderer(&resolver)
            .render(SHOW_TEMPLATE, &Entity::TvShow(&s), PageDepth::Item)
            .unwrap();
        assert_eq!(out, "Show\n[S1: 01x01\n01x02]\n[S2: 02x01]");
    }

    #[test]
    fn episode_images_bind_to_episode() {
        let s = show_with_episodes();
        let template = "{{ IMAGE.poster[10,10] }}{{ BEGIN_BLOCK_SEASON }}{{ BEGIN_BLOCK_EPISODE }}\
            <{{ IMAGE.thumbnail[20,10] }}>{{ END_BLOCK_EPISODE }}{{ END_BLOCK_SEASON }}";
        let resolver = RecordingResolver::default();
        let out = renderer(&resolver)
            .render(template, &Entity::TvShow(&s), PageDepth::Item)
            .unwrap();
        assert!(out.starts_with("../tvshow-3-poster-10x10"));
        assert!(out.contains("<../episode-11-thumbnail-20x10>"));
        assert!(out.contains("<../episode-21-thumbnail-20x10>"));
        assert!(!out.contains("episode-99"));
    }

    #[test]
    fn show_without_season_block_renders_fields_only() {
        let s = show_with_episodes();
        let resolver = RecordingResolver::default();
        let out = renderer(&resolver)
            .render("{{ TVSHOW.TITLE }}", &Entity::TvShow(&s), PageDepth::Root)
            .unwrap();
        assert_eq!(out, "Show");
    }

    #[test]
    fn season_entity_renders_number_only() {
        let s = show(1, "x");
        let resolver = RecordingResolver::default();
        let out = renderer(&resolver)
            .render(
                "Season {{ SEASON }} {{ IMAGE.poster[1,1] }}",
                &Entity::Season {
                    show: &s,
                    season: SeasonNumber(4),
                },
                PageDepth::Item,
            )
            .unwrap();
        assert_eq!(out, "Season 4 {{ IMAGE.poster[1,1] }}");
    }

    #[test]
    fn rendering_twice_is_identical() {
        let s = show_with_episodes();
        let resolver = RecordingResolver::default();
        let r = renderer(&resolver);
        let a = r.render(SHOW_TEMPLATE, &Entity::TvShow(&s), PageDepth::Item).unwrap();
        let b = r.render(SHOW_TEMPLATE, &Entity::TvShow(&s), PageDepth::Item).unwrap();
        assert_eq!(a, b);
    }
}
