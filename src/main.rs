use clap::{Parser, Subcommand};
use simple_folio::generator::Generator;
use simple_folio::imaging::{ImageTranscoder, RustBackend};
use simple_folio::registry::ExtensionTable;
use simple_folio::shortcodes::{ImageSettings, ResponsiveImage, render_breadcrumbs};
use simple_folio::{config, filters, logging, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-folio")]
#[command(about = "Static site builder for a portfolio and blog")]
#[command(long_about = "\
Static site builder for a portfolio and blog

Project structure:

  site.toml                        # Optional config (see `gen-config`)
  CNAME                            # Copied to _site/CNAME
  src/
  ├── index.html                   # → _site/index.html
  ├── robots.txt                   # Passthrough → _site/robots.txt
  ├── posts/hello.liquid           # Collection `posts` → _site/posts/hello/index.html
  ├── works/harbour.liquid         # Collection `works`
  ├── _includes/                   # Underscore dirs are never rendered
  └── assets/
      ├── favicon/ js/             # Passthrough
      └── images/source/           # Originals for {% image %}

Tags expanded in pages:

  {% image \"harbour.jpg\", \"Harbour at dawn\", \"large\" %}
  {% breadcrumbs \"works/harbour\" %}
  {% filter cssmin %} … {% endfilter %}

Image presets: small, regular (default), medium, large.")]
#[command(version = version_string())]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file, relative to the project root
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Debug logging (one line per image variant)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy passthrough files, resolve collections, and render every page
    Build,
    /// Load config and content, list collections, write nothing
    Check {
        /// Print collections as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render one image shortcode to stdout (generates its variants)
    Image {
        /// File name inside the source-images directory
        src: String,
        /// Alt text
        #[arg(default_value = "")]
        alt: String,
        /// Preset class name
        #[arg(default_value = "regular")]
        class: String,
    },
    /// Print the breadcrumb trail for a URL path
    Breadcrumbs { path: String },
    /// Print a minified stylesheet
    Cssmin { file: PathBuf },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match &cli.command {
        Command::Build => {
            let site_config = load(&cli)?;
            init_thread_pool(&site_config.processing);

            let transcoder = Arc::new(ImageTranscoder::new(RustBackend::new()));
            let table = ExtensionTable::site(&site_config, &cli.root, transcoder.clone());
            let generator = Generator::new(&cli.root, site_config, table);

            println!("==> Building {}", generator.output_dir().display());
            let report = generator.build()?;
            output::print_build_report(&report, Some(transcoder.cache_stats()));
            println!("==> Build complete");
        }
        Command::Check { json } => {
            let site_config = load(&cli)?;
            let table = ExtensionTable::site(
                &site_config,
                &cli.root,
                Arc::new(ImageTranscoder::new(RustBackend::new())),
            );
            let generator = Generator::new(&cli.root, site_config, table);

            let index = generator.load_content()?;
            let collections = generator.collections(&index)?;
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::collections_json(&collections))?
                );
            } else {
                println!("==> Checking {}", cli.root.display());
                output::print_collections(&collections);
                println!("==> {} templates, content is valid", index.len());
            }
        }
        Command::Image { src, alt, class } => {
            let site_config = load(&cli)?;
            let image = ResponsiveImage::new(
                Arc::new(ImageTranscoder::new(RustBackend::new())),
                ImageSettings::from_config(&site_config, &cli.root),
            );
            println!("{}", image.render_image(src, alt, class)?);
        }
        Command::Breadcrumbs { path } => {
            println!("{}", render_breadcrumbs(path));
        }
        Command::Cssmin { file } => {
            let css = std::fs::read_to_string(file)?;
            println!("{}", filters::minify_css(&css)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<config::SiteConfig, config::ConfigError> {
    let path = config_path(&cli.root, &cli.config);
    info!(config = %path.display(), "loading config");
    config::load_config(&path)
}

fn config_path(root: &Path, config: &Path) -> PathBuf {
    root.join(config)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
