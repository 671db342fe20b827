use clap::{Parser, Subcommand};
use folio_images::image_ref::{ImageRef, RenderSource};
use folio_images::imaging::plan_outputs;
use folio_images::manifest::Manifest;
use folio_images::publish::PublishTarget;
use folio_images::resolve::{AssetMap, Resolver};
use folio_images::{config, output, process, publish, scan};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio-images")]
#[command(about = "Responsive image pipeline for a portfolio site")]
#[command(long_about = "\
Responsive image pipeline for a portfolio site

Every .jpg, .jpeg and .png under the assets root is resized to each responsive
width in both WebP and JPEG, plus a preferred pair at the default width.
A manifest keyed by each source's relative path describes the results.

Layout (defaults):

  src/assets/
  ├── image-manifest.json          # Written by `optimize`
  ├── profile_pic.jpg              # Source
  ├── pro1/pro1s1.PNG              # Source (key \"pro1/pro1s1.PNG\")
  └── optimized/                   # Generated variants, never scanned
      ├── pro1_pro1s1_320.webp
      ├── pro1_pro1s1_320.jpg
      └── ...

Run with no command to optimize. Run 'folio-images gen-config' to generate a
documented folio-images.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when absent)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate all variants and rewrite the manifest (default)
    Optimize,
    /// List the sources that would be processed, without writing anything
    Check,
    /// Show what the UI would render for an image field
    Lookup {
        /// Source key (e.g. pro1/pro1s1.PNG) or absolute http(s) URL
        reference: String,
        /// Asset map to resolve through (defaults to the published one, if any)
        #[arg(long)]
        asset_map: Option<PathBuf>,
        /// Print a readable listing instead of the consumer JSON
        #[arg(long)]
        text: bool,
    },
    /// Copy every output to content-hashed names and write an asset map
    Publish {
        /// Destination directory (overrides publish.dist_dir)
        #[arg(long)]
        dist: Option<PathBuf>,
    },
    /// Print a stock folio-images.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let load_config = || config::load_config(&cli.config);

    match cli.command.unwrap_or(Command::Optimize) {
        Command::Optimize => {
            let config = load_config()?;
            init_thread_pool(&config.processing);
            let output_dir = config.output_dir.clone();
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    let lines = output::format_process_event(&event, &output_dir);
                    if output::is_failure(&event) {
                        lines.iter().for_each(|line| eprintln!("{}", line));
                    } else {
                        lines.iter().for_each(|line| println!("{}", line));
                    }
                }
            });
            let result = process::process(&config, Some(tx));
            // The sender is dropped with the run, so the printer drains and exits.
            printer
                .join()
                .map_err(|_| "progress printer panicked".to_string())?;
            let result = match result {
                Err(e) if e.is_missing_root() => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
                other => other?,
            };
            println!("{}", output::format_process_summary(&result));
        }
        Command::Check => {
            let config = load_config()?;
            let found = scan::discover(&config.layout())?;
            let collisions = scan::find_slug_collisions(&found.sources);
            let variant_config = config.variant_config();
            let outputs_per_source = plan_outputs("", &variant_config).len();
            output::print_check_output(
                &found,
                &collisions,
                outputs_per_source,
                &config.output_dir,
            );
        }
        Command::Lookup {
            reference,
            asset_map,
            text,
        } => {
            let config = load_config()?;
            let manifest = Manifest::load(&config.manifest_path())?;
            let map_path = asset_map.unwrap_or_else(|| config.asset_map_path());
            let index = AssetMap::load_or_empty(&map_path)?;
            let resolver = Resolver::new(manifest, index, config.resolver.public_base.clone());

            let Some(image_ref) = ImageRef::parse(&reference) else {
                println!("(no image)");
                return Ok(());
            };
            let source = image_ref.render_source(&resolver);
            if let RenderSource::Picture(image) = &source {
                for line in
                    output::format_fallback_warnings(&image.unresolved, &config.resolver.public_base)
                {
                    eprintln!("{}", line);
                }
                if !text {
                    println!("{}", serde_json::to_string_pretty(image)?);
                    return Ok(());
                }
            }
            output::print_lookup_output(&reference, &source);
        }
        Command::Publish { dist } => {
            let config = load_config()?;
            let manifest = Manifest::load(&config.manifest_path())?;
            let dist_dir = dist.unwrap_or_else(|| config.dist_path());
            let report = publish::publish(
                &config.assets_root_path(),
                &manifest,
                PublishTarget {
                    dist_dir: &dist_dir,
                    public_base: &config.publish.public_base,
                    asset_map: &config.publish.asset_map,
                },
            )?;
            output::print_publish_output(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
