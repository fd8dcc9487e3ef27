use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use timeline_gal::gallery::lazy::{LazyLoader, ViewportWatcher, WatcherOptions};
use timeline_gal::gallery::{Event, Gallery, loader};
use timeline_gal::{config, logger, output, scan};

#[derive(Parser)]
#[command(name = "timeline-gal")]
#[command(about = "Date-partitioned photo timeline")]
#[command(long_about = "\
Date-partitioned photo timeline

The media directory layout is the metadata. Every file at
<prefix>/YYYY/M/D/name.ext is indexed into a JSON manifest, which the
gallery groups by year and month.

Media structure:

  public/api/i/
  ├── config.toml          # Gallery config (optional)
  ├── images.json          # Manifest (written by `index`)
  ├── gallery-meow/        # Gallery assets (skipped)
  ├── cache/               # Skipped
  ├── 2024/3/5/cat.jpg     # → 2024-03-05
  └── phone/2023/12/24/tree.jpg

Run 'timeline-gal gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Log debug output from the indexer and gallery engine
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index the media root into a manifest
    Index {
        /// Media root
        #[arg(long, default_value = "public/api/i")]
        root: PathBuf,
        /// Manifest path (default: <root>/<manifest>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load a manifest and print the filtered timeline
    Show {
        /// Manifest to load
        #[arg(long, default_value = "public/api/i/images.json")]
        manifest: PathBuf,
        #[arg(long)]
        year: Option<String>,
        /// Two-digit month; requires --year
        #[arg(long, requires = "year")]
        month: Option<String>,
        /// Case-insensitive filename substring
        #[arg(long)]
        search: Option<String>,
        /// Expand every year instead of only the most recent
        #[arg(long)]
        all: bool,
        /// Print the rendered HTML instead of a tree
        #[arg(long)]
        html: bool,
    },
    /// Re-index periodically
    Watch {
        #[arg(long, default_value = "public/api/i")]
        root: PathBuf,
        /// Seconds between runs (default: schedule.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::setup_logging(cli.verbose);

    match cli.command {
        Command::Index { root, output } => {
            let config = config::load_config(&root)?;
            let target = output.unwrap_or_else(|| scan::manifest_path(&root, &config));
            let result = scan::build_index(&root, Some(&target), &config)?;
            output::print_scan_output(&result, &target);
        }
        Command::Show {
            manifest,
            year,
            month,
            search,
            all,
            html,
        } => {
            let gallery = show(&manifest, year, month, search, all)?;
            if html {
                let config = manifest
                    .parent()
                    .map(config::load_config)
                    .transpose()?
                    .unwrap_or_default();
                let watcher = ViewportWatcher::new(WatcherOptions::from(&config.lazy_load));
                let mut lazy = LazyLoader::new(watcher);
                println!("{}", gallery.render(&mut lazy).into_string());
            } else {
                output::print_gallery(&gallery.stats(), gallery.criteria(), gallery.timeline());
            }
        }
        Command::Watch { root, interval } => {
            let config = config::load_config(&root)?;
            let period = Duration::from_secs(interval.unwrap_or(config.schedule.interval_secs));
            info!("Indexing {} every {}s", root.display(), period.as_secs());
            loop {
                match scan::build_index(&root, None, &config) {
                    Ok(result) => info!("Index built: {} items", result.manifest.len()),
                    Err(e) => error!("Index build failed: {e}"),
                }
                thread::sleep(period);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Drive the gallery engine headlessly: load, then apply the CLI filters
/// as the same events a browser would send.
fn show(
    manifest: &Path,
    year: Option<String>,
    month: Option<String>,
    search: Option<String>,
    all: bool,
) -> Result<Gallery, loader::LoadError> {
    let mut gallery = Gallery::new();
    let catalog = loader::load_manifest(manifest)?;
    gallery.update(Event::Loaded(Ok(catalog)));

    if year.is_some() {
        gallery.update(Event::SetYear(year));
    }
    if month.is_some() {
        gallery.update(Event::SetMonth(month));
    }
    if let Some(term) = search {
        gallery.update(Event::SetSearch(term));
    }
    if all {
        gallery.update(Event::ExpandAll);
    }
    Ok(gallery)
}
