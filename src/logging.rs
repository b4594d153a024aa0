//! File logging.
//!
//! The terminal belongs to the UI, so everything goes to
//! `<log_dir>/postq.log`, truncated at startup. Filter with `RUST_LOG`
//! (defaults to `info`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "postq.log";

/// Keeps the background writer alive. Dropping it flushes the log file.
pub struct LoggingGuard {
  _file_guard: WorkerGuard,
  path: PathBuf,
}

impl LoggingGuard {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

/// Install the global subscriber writing to `log_dir`.
pub fn init_logging(log_dir: &Path) -> Result<LoggingGuard, io::Error> {
  let path = prepare_log_file(log_dir)?;

  let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
  let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

  let file_layer = tracing_subscriber::fmt::layer()
    .with_writer(non_blocking_file)
    .with_ansi(false)
    .with_target(true);

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(file_layer)
    .init();

  Ok(LoggingGuard {
    _file_guard: file_guard,
    path,
  })
}

/// `$XDG_DATA_HOME/postq`, or `./logs` when there is no data dir.
pub fn default_log_dir() -> PathBuf {
  dirs::data_dir()
    .map(|dir| dir.join("postq"))
    .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Create `log_dir` and an empty log file inside it.
fn prepare_log_file(log_dir: &Path) -> Result<PathBuf, io::Error> {
  fs::create_dir_all(log_dir)?;
  let path = log_dir.join(LOG_FILE);
  fs::write(&path, "")?;
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_log_dir(name: &str) -> PathBuf {
    let timestamp = std::time::SystemTime::now()
      .duration_since(std::time::UNIX_EPOCH)
      .unwrap()
      .as_nanos();
    std::env::temp_dir().join(format!("postq_{}_{}", name, timestamp))
  }

  #[test]
  fn test_default_log_dir_ends_with_app_name() {
    let dir = default_log_dir();
    assert!(dir.ends_with("postq") || dir.ends_with("logs"));
  }

  #[test]
  fn test_prepare_creates_nested_directory() {
    let root = test_log_dir("nested");
    let dir = root.join("deep").join("er");

    let path = prepare_log_file(&dir).unwrap();
    assert!(path.exists());
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(LOG_FILE));

    fs::remove_dir_all(&root).unwrap();
  }

  #[test]
  fn test_prepare_truncates_previous_log() {
    let dir = test_log_dir("truncate");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(LOG_FILE), "old session").unwrap();

    let path = prepare_log_file(&dir).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");

    fs::remove_dir_all(&dir).unwrap();
  }
}
