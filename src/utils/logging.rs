//! Tracing subscriber setup.
//!
//! The full-screen UI owns the terminal, so interactive sessions log to a
//! file in the data directory. One-shot commands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::core::config::io::project_dirs;

pub const LOG_ENV: &str = "MYCELIAL_LOG";
pub const LOG_FILE_NAME: &str = "mycelial.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"))
}

pub fn log_file_path() -> Option<PathBuf> {
    let dirs = project_dirs().ok()?;
    Some(dirs.data_dir().join(LOG_FILE_NAME))
}

/// Install the global subscriber. Returns the log file path when logging to
/// a file. Falls back to stderr if the file cannot be opened.
pub fn init(target: LogTarget) -> Option<PathBuf> {
    if target == LogTarget::File {
        if let Some(path) = log_file_path() {
            let opened = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            if let Ok(file) = opened {
                let installed = tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .try_init()
                    .is_ok();
                if installed {
                    tracing::info!(path = %path.display(), "Logging to file");
                }
                return Some(path);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    None
}
