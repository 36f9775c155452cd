use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::Result;
use env_logger::{Builder, Target};

pub fn log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quillsheet")
        .join("quillsheet.log")
}

/// Route `log` records to a file; the terminal belongs to the UI.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(level: &str) -> Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::new()
        .parse_filters(level)
        .parse_env("RUST_LOG")
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(path)
}
