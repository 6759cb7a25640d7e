use clap::{Parser, Subcommand};
use mdpress::assemble::{Assembler, Mode};
use mdpress::config::{self, SiteConfig};
use mdpress::imaging::RustOptimizer;
use mdpress::naming::{self, AssetNaming};
use mdpress::pipeline::{ContentDocument, Pipeline};
use mdpress::templates::{TemplateRenderer, Templates, current_year};
use mdpress::{gc, output};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(name = "mdpress")]
#[command(about = "Static site generator for Markdown blogs")]
#[command(long_about = "\
Static site generator for Markdown blogs

Markdown documents in the content folder become HTML pages. Images, videos and
other files they reference are optimized or copied into a flat asset store.

Project structure:

  config.toml                 # Site config (required; every key optional)
  content/
  ├── index.md                # Home document, rendered above the post list
  ├── first-post.md           # Post → public/first-post.html
  └── img/cover.png           # Referenced as ![cover](img/cover.png)
  templates/
  ├── homepage.html           # <!-- INDEX_CONTENT_PLACEHOLDER -->, <!-- POSTS_PLACEHOLDER -->
  ├── post.html               # <!-- CONTENT_PLACEHOLDER -->, __PAGE_TITLE__
  ├── _footer.html            # __CURRENT_YEAR__
  └── _nav.html               # Optional; generated from navigation_links if absent
  public/                     # Output
  └── assets/                 # Flat asset store

Run 'mdpress gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Path to the site config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Override the site's base URL
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every post page and the home page
    Build {
        /// Write a JSON build report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Render the home page only
    Home,
    /// Fill nav, footer and site tokens into post.html and print its path
    PostTemplate {
        /// Write the template here instead of a temporary file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Transform one document and write the result to stdout
    Process {
        /// Document to read; standard input when absent
        file: Option<PathBuf>,
        /// Location of the document read from standard input, used to
        /// resolve relative asset paths
        #[arg(long)]
        source_path: Option<PathBuf>,
        /// Drop the front matter block from the output
        #[arg(long)]
        strip_front_matter: bool,
    },
    /// Delete assets no longer referenced anywhere
    Gc {
        /// Only list what would be deleted
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let load_site = || load_site_config(&cli.config, cli.site_url.as_deref());

    match cli.command {
        Command::Build { report } => {
            let site = load_site()?;
            let tools = Tools::new(&site);
            let pipeline = tools.pipeline(&site);
            let templates = Templates::load(&site.templates_folder)?;
            let renderer = TemplateRenderer::new(&templates, &site, current_year());
            let built = Assembler::new(&site, &pipeline, &renderer).assemble(Mode::Site)?;
            output::print_build_report(&built.report, std::env::current_dir().ok().as_deref());
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&built.report)?;
                std::fs::write(&path, json)?;
            }
        }
        Command::Home => {
            let site = load_site()?;
            let tools = Tools::new(&site);
            let pipeline = tools.pipeline(&site);
            let templates = Templates::load(&site.templates_folder)?;
            let renderer = TemplateRenderer::new(&templates, &site, current_year());
            Assembler::new(&site, &pipeline, &renderer).assemble(Mode::HomeOnly)?;
            eprintln!(
                "Homepage generated at {}",
                site.output_folder.join("index.html").display()
            );
        }
        Command::PostTemplate { out } => {
            let site = load_site()?;
            let templates = Templates::load(&site.templates_folder)?;
            let shell = TemplateRenderer::new(&templates, &site, current_year()).post_shell();
            let path = match out {
                Some(path) => {
                    std::fs::write(&path, shell)?;
                    path
                }
                None => {
                    let mut file = tempfile::Builder::new()
                        .prefix("mdpress-post-")
                        .suffix(".html")
                        .tempfile()?;
                    file.write_all(shell.as_bytes())?;
                    let (_, path) = file.keep()?;
                    path
                }
            };
            println!("{}", path.display());
        }
        Command::Process {
            file,
            source_path,
            strip_front_matter,
        } => {
            let site = load_site()?;
            let tools = Tools::new(&site);
            let document = read_document(&site, file, source_path)?;
            let processed = tools.pipeline(&site).process(&document);
            let text = if strip_front_matter {
                processed.text
            } else {
                processed.with_header()
            };
            io::stdout().write_all(text.as_bytes())?;
        }
        Command::Gc { dry_run } => {
            let site = load_site()?;
            let report = gc::collect(&site, dry_run)?;
            output::print_gc_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The optimizer and naming strategy a pipeline borrows.
struct Tools {
    optimizer: RustOptimizer,
    naming: Box<dyn AssetNaming>,
}

impl Tools {
    fn new(site: &SiteConfig) -> Self {
        Self {
            optimizer: RustOptimizer::new(),
            naming: naming::from_scheme(site.assets.naming),
        }
    }

    fn pipeline<'a>(&'a self, site: &'a SiteConfig) -> Pipeline<'a> {
        Pipeline::new(site, &self.optimizer, self.naming.as_ref())
    }
}

fn load_site_config(
    path: &Path,
    site_url: Option<&str>,
) -> Result<SiteConfig, config::ConfigError> {
    let site = config::load_config(path)?;
    Ok(match site_url {
        Some(url) => site.with_site_url(url),
        None => site,
    })
}

/// Read the document for `process` from `file` or standard input.
fn read_document(
    site: &SiteConfig,
    file: Option<PathBuf>,
    source_path: Option<PathBuf>,
) -> io::Result<ContentDocument> {
    if let Some(file) = file {
        let mut document = ContentDocument::read(&file)?;
        if let Some(source_path) = source_path {
            document.source_path = source_path;
        }
        return Ok(document);
    }

    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    let source_path = source_path.unwrap_or_else(|| {
        let fallback = site.content_folder.join("stdin.md");
        warn!(
            assumed = %fallback.display(),
            "no --source-path given; relative asset paths resolve against the content folder"
        );
        fallback
    });
    Ok(ContentDocument::new(source_path, text))
}
