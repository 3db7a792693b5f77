//! Directory scanning: find candidate archives and extract them all.
//!
//! Per-file extraction is embarrassingly parallel and runs on a scoped
//! rayon pool; failures are logged and collected, never fatal to the
//! scan. Insertion into storage stays with the single-writer caller.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use shp_meta_core::MetadataRecord;

use crate::error::{ExtractError, Result};
use crate::extractor::extract_metadata;

/// Result of scanning one directory tree.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Successfully extracted records, sorted by source path.
    pub records: Vec<MetadataRecord>,
    /// Per-file failures, in candidate order.
    pub failures: Vec<(PathBuf, ExtractError)>,
}

/// Recursively lists files matching the zipped-shapefile naming
/// convention (`.zip`, case-insensitive), sorted for determinism.
///
/// # Errors
///
/// Returns [`ExtractError::NotFound`] when the root does not exist, and
/// propagates directory walk I/O failures.
pub fn collect_candidates(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(ExtractError::NotFound(root.to_path_buf()));
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_zip = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            candidates.push(entry.into_path());
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Scans a directory tree, extracting a metadata record per candidate.
///
/// Extraction runs on a dedicated rayon pool of `jobs` threads (an
/// adaptive default when `None`). A per-file failure is logged via
/// `tracing` and reported in the outcome; it never aborts the scan.
pub fn scan_directory(root: &Path, jobs: Option<usize>) -> Result<ScanOutcome> {
    let candidates = collect_candidates(root)?;
    debug!(
        root = %root.display(),
        candidates = candidates.len(),
        "scanning directory"
    );

    let jobs = jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(candidates.len()));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .expect("failed to build rayon thread pool");

    let results: Vec<(PathBuf, Result<MetadataRecord>)> = pool.install(|| {
        use rayon::prelude::*;
        candidates
            .par_iter()
            .map(|path| (path.clone(), extract_metadata(path)))
            .collect()
    });

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for (path, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping file");
                failures.push((path, err));
            }
        }
    }

    records.sort_by(|a, b| {
        let key = |r: &MetadataRecord| r.get("source_path").map(|v| v.to_string());
        key(a).cmp(&key(b))
    });

    Ok(ScanOutcome { records, failures })
}

fn default_parallel_jobs(candidate_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(8).max(1).min(candidate_count.max(1))
}
