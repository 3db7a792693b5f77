//! Shared plumbing for the `shp-metadata` and `search-shp-dir` binaries.

use std::fs;
use std::path::Path;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

/// Initializes tracing from `-v` counts and `-q`, honoring `RUST_LOG`.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Writes serialized output, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, contents)
        .map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
