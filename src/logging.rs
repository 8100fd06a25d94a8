//! Tracing setup: human-readable stdout plus an append-only `logs.txt`.

use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt as tfmt};

pub const LOG_FILE: &str = "logs.txt";

/// Open `data_dir/logs.txt` for appending, creating it if needed.
pub fn open_log_file(data_dir: &Path) -> Result<(File, PathBuf)> {
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tfmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init(data_dir: &Path) -> Result<PathBuf> {
    let (file, path) = open_log_file(data_dir)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = tfmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file_layer(file))
        .init();
    Ok(path)
}
