use clap::{Parser, Subcommand};
use media_export::artwork::ArtworkPipeline;
use media_export::config;
use media_export::export::{ExportTarget, Exporter};
use media_export::imaging::RustBackend;
use media_export::library::Library;
use media_export::locator::LibraryImageLocator;
use media_export::output::{self, EventPrinter};
use media_export::templates::{self, DirTemplatePack};
use media_export::types::Section;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "media-export")]
#[command(about = "Export a media library as a static HTML site")]
#[command(long_about = "\
Export a media library as a static HTML site

Pages are rendered from a template pack, a directory of plain HTML files:

  my-pack/
  ├── template.toml      # Optional manifest (name, version, sections)
  ├── config.toml        # Optional config layer shipped with the pack
  ├── movies.html        # List pages, one per section
  ├── tvshows.html
  ├── concerts.html
  ├── movie.html         # Item pages, one per entity
  ├── tvshow.html
  ├── episode.html
  ├── concert.html
  └── defaults/          # Everything else is copied to the output as-is
      └── movie_poster_300x450.png

Output layout:

  <output>/movies.html               list pages
  <output>/movies/<id>.html          item pages (tvshows/, episodes/, concerts/)
  <output>/movie_images/             transcoded artwork per entity kind

Set RUST_LOG=debug for a detailed log on stderr.
Run 'media-export gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the library through a template pack into an output directory
    Export {
        /// Library snapshot (JSON)
        #[arg(long)]
        library: PathBuf,

        /// Template pack directory
        #[arg(long)]
        templates: PathBuf,

        /// Output directory
        #[arg(long, default_value = "export")]
        output: PathBuf,

        /// Extra config.toml layered over the pack's own config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Section to export (movies, tvshows, concerts); repeatable.
        /// Defaults to the config's `export.sections`.
        #[arg(long = "section", value_parser = parse_section)]
        sections: Vec<Section>,
    },
    /// Report missing templates and unknown placeholders in a template pack
    Check {
        /// Template pack directory
        #[arg(long)]
        templates: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn parse_section(value: &str) -> Result<Section, String> {
    Section::LISTS
        .into_iter()
        .find(|s| s.as_str() == value.to_lowercase())
        .ok_or_else(|| format!("expected movies, tvshows or concerts, got '{value}'"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            library,
            templates: pack_dir,
            output: output_dir,
            config: user_config,
            sections,
        } => {
            let library = Library::load(&library)?;
            let pack = DirTemplatePack::open(&pack_dir)?;
            let export_config = config::load_config(&pack_dir, user_config.as_deref())?;
            let sections = if sections.is_empty() {
                export_config.export.sections.clone()
            } else {
                sections
            };
            pack.check_sections(&sections);

            println!("==> Exporting to {}", output_dir.display());
            let artwork = ArtworkPipeline::new(
                RustBackend::new(),
                LibraryImageLocator,
                &output_dir,
                export_config.quality(),
            );
            let root = output_dir.clone();
            let mut printer = EventPrinter::default();
            let mut exporter = Exporter::new(
                &library,
                &pack,
                &artwork,
                ExportTarget::new(&output_dir),
                export_config.templates.block_match,
            )
            .with_progress(move |event, _| printer.print(event, &root));

            let outcome = exporter.run(&sections)?;
            output::print_summary(&outcome, artwork.written());
        }
        Command::Check {
            templates: pack_dir,
        } => {
            let pack = DirTemplatePack::open(&pack_dir)?;
            println!("==> Checking {}", pack_dir.display());
            let manifest = pack.manifest();
            if !manifest.name.is_empty() {
                println!("{} {}", manifest.name, manifest.version);
            }
            output::print_check_report(&templates::check_pack(&pack));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
