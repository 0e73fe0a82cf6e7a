//! `--log-file` support. The terminal is busy drawing, so env_logger writes to a file.

use anyhow::{Context, Result};
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::path::Path;

fn builder(file: File, level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .format_timestamp_millis()
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));
    builder
}

/// Appends records at `level` or above to `path`.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    builder(file, level)
        .try_init()
        .context("installing the file logger")?;
    Ok(())
}
