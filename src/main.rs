use clap::{Parser, Subcommand};
use log::LevelFilter;
use notable_gal::gallery;
use notable_gal::modal::ModalController;
use notable_gal::probe::{ContentSource, open_source};
use notable_gal::{config, discover, naming, output, render};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let hash = env!("NOTABLE_GAL_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "notable-gal")]
#[command(about = "Probe-driven gallery engine for image portfolios")]
#[command(long_about = "\
Probe-driven gallery engine for image portfolios

There is no index of the content. Pieces live in numbered folders and
whatever loads is what exists.

Content structure:

  .
  ├── config.toml                      # Optional, see gen-config
  └── images/
      ├── notable-work/
      │   ├── manifest.json            # Optional folder list (see 'manifest')
      │   ├── 7/
      │   │   ├── 1.jpg                # Primary image (jpg, jpeg or png)
      │   │   ├── 2.png                # Extras, 2..=10
      │   │   └── piece-data.txt       # title/size/medium/year/description
      │   └── 3.jpg                    # Legacy flat layout
      ├── archive-project/<n>/1.jpg
      ├── i-think-narcissus-fell-in/<n>/1.jpg
      └── home/<n>.jpg                 # Home background rotation

Run 'notable-gal gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content root (the directory containing images/)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered piece folders, newest first
    Discover,
    /// Open one piece and show what the modal would display
    Piece {
        /// Folder ID of the piece
        id: String,
        /// Step forward this many images after opening
        #[arg(long, default_value_t = 0)]
        next: usize,
        /// Step back this many images after stepping forward
        #[arg(long, default_value_t = 0)]
        prev: usize,
    },
    /// Write images/notable-work/manifest.json from the filesystem
    Manifest,
    /// Render the static site
    Build {
        /// Seed for the home background selection
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Discover => {
            let (site_config, source) = open_content(&cli.source)?;
            let discovery = discover::discover(&*source, &site_config.probe);
            let gallery = gallery::build_gallery(
                &*source,
                &discovery.folders,
                &site_config.probe,
                &site_config.gallery,
            );
            output::print_discover_output(&discovery, &gallery);
        }
        Command::Piece { id, next, prev } => {
            let (site_config, source) = open_content(&cli.source)?;
            let discovery = discover::discover(&*source, &site_config.probe);
            let gallery = gallery::build_gallery(
                &*source,
                &discovery.folders,
                &site_config.probe,
                &site_config.gallery,
            );
            let mut modal = ModalController::new(&gallery);
            // Invalid IDs are already logged; nothing to show.
            if modal.open_with(&id, &*source, &site_config.probe).is_err() {
                return Ok(());
            }
            for _ in 0..next {
                modal.next();
            }
            for _ in 0..prev {
                modal.prev();
            }
            if let (Some(view), Some(piece)) = (modal.view(), modal.cached_piece()) {
                output::print_piece_output(&view, &piece.images);
            }
        }
        Command::Manifest => {
            let site_config = config::load_config(&cli.source)?;
            let manifest = discover::write_manifest(&cli.source, &site_config.probe)?;
            output::print_manifest_output(&manifest, &naming::manifest_path());
        }
        Command::Build { seed } => {
            let (site_config, source) = open_content(&cli.source)?;
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report =
                render::build_site(&*source, &cli.source, &cli.output, &site_config, seed)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config, size the thread pool, and open the content root.
fn open_content(
    root: &Path,
) -> Result<(config::SiteConfig, Box<dyn ContentSource>), config::ConfigError> {
    let site_config = config::load_config(root)?;
    init_thread_pool(&site_config.processing);
    let source = open_source(root, site_config.probe.timeout_ms);
    Ok((site_config, source))
}

/// Warn by default; each `-v` raises the level. `RUST_LOG` still wins.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
