use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use static_page_bundler::{BuildContext, BuildReport, HashMode, ProjectConfig, SiteBuilder};

/// Build a static site's pages, scripts, styles and images into its distribution tree.
#[derive(Debug, Parser)]
#[command(name = "page-bundler", version, about)]
struct Cli {
  /// Project root.
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Configuration file; defaults to `bundler.config.json` in the project root.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Print the build report as JSON.
  #[arg(long)]
  json: bool,

  /// Increase log verbosity (-v, -vv, -vvv).
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Production build: clear, fresh build id, full rebuild.
  Build,
  /// Incremental development build without hashing.
  Dev {
    /// Clear the distribution tree first.
    #[arg(long)]
    clean: bool,
  },
  /// Remove the distribution tree.
  Clear,
  /// Copy runtime dependencies into the distribution tree.
  Vendor,
}

fn init_tracing(verbose: u8) {
  use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

  let level = match verbose {
    0 => tracing::Level::WARN,
    1 => tracing::Level::INFO,
    2 => tracing::Level::DEBUG,
    _ => tracing::Level::TRACE,
  };

  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
    .init();
}

fn load_config(cli: &Cli) -> Result<ProjectConfig> {
  match &cli.config {
    Some(path) => ProjectConfig::from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display())),
    None => Ok(ProjectConfig::discover(&cli.root)),
  }
}

fn print_report(report: &BuildReport, json: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(report)?);
    return Ok(());
  }

  for (stage, failure) in report.failures() {
    eprintln!("{stage}: {}: {}", failure.source.display(), failure.message);
  }
  match &report.build_id {
    Some(id) => println!("wrote {} files (build {id})", report.written()),
    None => println!("wrote {} files", report.written()),
  }
  Ok(())
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let mode = match cli.command {
    Command::Build => HashMode::production(),
    _ => HashMode::Development,
  };
  let layout = load_config(&cli)?.into_layout();
  let builder = SiteBuilder::new(BuildContext::new(&cli.root, layout, mode));

  match cli.command {
    Command::Build => print_report(&builder.build()?, cli.json),
    Command::Dev { clean } => print_report(&builder.develop(clean)?, cli.json),
    Command::Clear => builder.clear(),
    Command::Vendor => {
      let report = builder.vendor()?;
      if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else {
        println!("vendored {} files", report.written.len());
      }
      Ok(())
    }
  }
}
