use clap::{Parser, Subcommand};
use site_variants::render::{self, BasePath};
use site_variants::select::VariantSelector;
use site_variants::{config, naming, output, process};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "site-variants")]
#[command(about = "Responsive WebP variants for static site images")]
#[command(long_about = "\
Responsive WebP variants for static site images

Resizes the images under the site's public directory into a ladder of WebP
widths and writes a manifest that page code reads to pick a variant.

Project layout (defaults):

  <root>/
  ├── variants.toml                     # Optional config
  ├── public/
  │   ├── lebob.png                     # Named source file
  │   ├── media/**                      # Source directory, walked recursively
  │   ├── members/**
  │   └── _img/                         # Generated variants (cleared each run)
  └── src/generated/image-variants.json # Generated manifest

Variants are never wider than the source. Sources are looked up by URL path,
for example /media/Sub%20Folder/My%20Photo.JPG.

Run 'site-variants gen-config' to generate a documented variants.toml.")]
#[command(version)]
struct Cli {
    /// Project root containing the public directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate variants and write the manifest
    Generate,
    /// List discovered sources and planned widths without encoding
    Check,
    /// Show the variants recorded for a source
    List {
        /// URL path (`/media/a.jpg`) or path relative to the public directory
        source: String,
    },
    /// Show the variant chosen for a display width
    Pick {
        source: String,
        /// Display width in CSS pixels
        #[arg(long)]
        width: u32,
    },
    /// Print responsive `<img>` markup for a source
    Img {
        source: String,
        /// Display width in CSS pixels
        #[arg(long)]
        width: u32,
        #[arg(long, default_value = "")]
        alt: String,
        /// `sizes` attribute value
        #[arg(long)]
        sizes: Option<String>,
    },
    /// Print a stock variants.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate => {
            let site_config = config::load_config(&cli.root)?;
            init_thread_pool(&site_config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_process_event(&event);
                }
            });
            let result = process::process(&cli.root, &site_config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_summary(&result?, &cli.root);
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            init_thread_pool(&site_config.processing);
            let planned = process::plan(&cli.root, &site_config)?;
            output::print_check_output(&planned);
        }
        Command::List { source } => {
            let selector = load_selector(&cli.root)?;
            output::print_variant_list(&selector, &source_key(&source));
        }
        Command::Pick { source, width } => {
            let selector = load_selector(&cli.root)?;
            output::print_pick(&selector, &source_key(&source), width);
        }
        Command::Img {
            source,
            width,
            alt,
            sizes,
        } => {
            let selector = load_selector(&cli.root)?;
            let markup = render::responsive_img(
                &selector,
                &BasePath::from_env(),
                &source_key(&source),
                &alt,
                width,
                sizes.as_deref(),
            );
            println!("{}", markup.into_string());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_selector(root: &std::path::Path) -> Result<VariantSelector, Box<dyn std::error::Error>> {
    let site_config = config::load_config(root)?;
    Ok(VariantSelector::load(&site_config.manifest_file(root))?)
}

/// Keys start with `/` and are already percent-encoded; anything else is
/// taken as a plain path relative to the public directory.
fn source_key(source: &str) -> String {
    if source.starts_with('/') {
        source.to_string()
    } else {
        naming::url_path(source)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
