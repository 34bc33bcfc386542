use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wp_static::types::ContentModel;
use wp_static::{assemble, config, generate, logger, output};

#[derive(Parser)]
#[command(name = "wp-static")]
#[command(about = "Rebuild a WordPress HTML export as a static site")]
#[command(long_about = "\
Rebuild a WordPress HTML export as a static site

Reads the pages a WordPress site was mirrored to, recovers posts and static
pages into a content model, and renders them through your own templates.

Export structure:

  docs/
  ├── config.toml                  # Optional, see 'wp-static gen-config'
  ├── index.html                   # Homepage: site title, post thumbnails
  ├── about/index.html             # Static page
  └── 2017/07/11/first-snow/
      └── index.html               # Post (slug = 2017/07/11/first-snow)

Templates (index.html, post.html, about.html) use {{ var }}, {% if %} and
{% for %} directives.

Pipeline:
  extract   docs/             →  data/content.json
  generate  data/content.json →  site/")]
#[command(version)]
struct Cli {
    /// WordPress export directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory for the rendered site
    #[arg(long, default_value = "site", global = true)]
    output: PathBuf,

    /// Content model file written by extract and read by generate
    #[arg(long, default_value = "data/content.json", global = true)]
    data: PathBuf,

    /// Template directory
    #[arg(long, default_value = "templates", global = true)]
    templates: PathBuf,

    /// Hosting subpath, overrides site.base_url from config.toml
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log per-document progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract posts and pages into the content model
    Extract,
    /// Render the site from an existing content model
    Generate,
    /// Run the full pipeline: extract → generate
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    match cli.command {
        Command::Extract => {
            let model = extract(&cli.source, &cli.data)?;
            output::print_extract_output(&model);
            require_posts(&model, &cli.source)?;
        }
        Command::Generate => {
            let base_url = resolve_base_url(&cli)?;
            let model = generate::load_model(&cli.data)?;
            render(&cli, &model, &base_url)?;
        }
        Command::Build => {
            let base_url = resolve_base_url(&cli)?;
            println!("==> Stage 1: Extracting {}", cli.source.display());
            let model = extract(&cli.source, &cli.data)?;
            output::print_extract_output(&model);
            require_posts(&model, &cli.source)?;

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            render(&cli, &model, &base_url)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Assemble the export and write the content model to `data`.
fn extract(source: &Path, data: &Path) -> Result<ContentModel, Box<dyn std::error::Error>> {
    let site_config = config::load_config(source)?;
    init_thread_pool(&site_config.processing);

    let model = assemble::assemble_with(source, &site_config)?;
    if let Some(parent) = data.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(data, serde_json::to_string_pretty(&model)?)?;
    Ok(model)
}

/// `--base-url` wins over `site.base_url`. Checked before any stage runs.
fn resolve_base_url(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let base_url = match &cli.base_url {
        Some(url) => url.clone(),
        None => config::load_config(&cli.source)?.site.base_url,
    };
    config::validate_base_url(&base_url)?;
    Ok(base_url)
}

fn render(cli: &Cli, model: &ContentModel, base_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let year = chrono::Local::now().year();
    let report = generate::generate(model, &cli.templates, &cli.output, base_url, year)?;
    output::print_generate_output(&report);
    Ok(())
}

/// An export with no recognizable posts is almost always the wrong directory.
fn require_posts(model: &ContentModel, source: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if model.posts.is_empty() {
        return Err(format!("no posts found under {}", source.display()).into());
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
