mod app;
mod blog;
mod config;
mod event;
mod logging;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "postq")]
#[command(about = "Browse a paginated blog API from the terminal, backed by a query cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./postq.yaml, then $XDG_CONFIG_HOME/postq/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the blog API
  #[arg(short, long)]
  base_url: Option<String>,

  /// Last page that can be browsed
  #[arg(short, long)]
  max_page: Option<u32>,

  /// Directory for postq.log (default: $XDG_DATA_HOME/postq)
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let log_dir = args.log_dir.unwrap_or_else(logging::default_log_dir);
  let log_guard = logging::init_logging(&log_dir)?;
  tracing::info!(path = %log_guard.path().display(), "Logging to file");

  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the config file
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }
  if let Some(max_page) = args.max_page {
    config.pagination.max_page = max_page;
  }

  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
