//! Zip archive access for shapefile component sets.
//!
//! Components are read fully into memory; nothing is ever extracted to
//! disk. An archive is accepted when it carries at least one `.shp`,
//! `.shx`, and `.dbf` entry (case-insensitive, any internal directory).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::error::{ExtractError, Result};

/// In-memory view of the relevant components of one zipped shapefile.
#[derive(Debug)]
pub struct ShapefileArchive {
    /// Layer name: the file stem of the attribute table entry.
    pub layer: String,
    /// Raw `.dbf` attribute table bytes.
    pub dbf: Vec<u8>,
    /// Raw `.prj` projection definition bytes, when present.
    pub prj: Option<Vec<u8>>,
    /// Name and raw bytes of the first `.jgw` world file, when present.
    pub worldfile: Option<(String, Vec<u8>)>,
}

/// Opens a zipped shapefile and reads its metadata components.
///
/// # Errors
///
/// - [`ExtractError::NotFound`] when the path does not exist.
/// - [`ExtractError::MalformedArchive`] when the file is not a zip or
///   the component set lacks `.shp`, `.shx`, or `.dbf`.
pub fn open(path: &Path) -> Result<ShapefileArchive> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| ExtractError::malformed(path, format!("not a zip archive: {e}")))?;

    let mut names: Vec<String> = zip
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(String::from)
        .collect();
    names.sort();

    let missing: Vec<&str> = ["shp", "shx", "dbf"]
        .into_iter()
        .filter(|ext| entries_with_ext(&names, ext).is_empty())
        .collect();
    if !missing.is_empty() {
        return Err(ExtractError::malformed(
            path,
            format!("missing shapefile component(s): .{}", missing.join(", .")),
        ));
    }

    let dbf_name = entries_with_ext(&names, "dbf")[0].clone();
    let layer = Path::new(&dbf_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| dbf_name.clone());

    // Prefer the projection definition that shares the attribute table's
    // stem; fall back to the first one.
    let prj_name = {
        let candidates = entries_with_ext(&names, "prj");
        candidates
            .iter()
            .find(|name| {
                Path::new(name.as_str())
                    .file_stem()
                    .is_some_and(|s| s.to_string_lossy() == layer)
            })
            .or_else(|| candidates.first())
            .map(|name| (*name).clone())
    };

    let jgw_name = entries_with_ext(&names, "jgw")
        .first()
        .map(|name| (*name).clone());

    let mut read_entry = |name: &str| -> Result<Vec<u8>> {
        let mut entry = zip
            .by_name(name)
            .map_err(|e| ExtractError::malformed(path, format!("unreadable entry '{name}': {e}")))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ExtractError::malformed(path, format!("unreadable entry '{name}': {e}")))?;
        Ok(bytes)
    };

    let dbf = read_entry(&dbf_name)?;
    let prj = match &prj_name {
        Some(name) => Some(read_entry(name)?),
        None => None,
    };
    let worldfile = match &jgw_name {
        Some(name) => Some((name.clone(), read_entry(name)?)),
        None => None,
    };

    Ok(ShapefileArchive {
        layer,
        dbf,
        prj,
        worldfile,
    })
}

fn entries_with_ext<'a>(names: &'a [String], ext: &str) -> Vec<&'a String> {
    names
        .iter()
        .filter(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect()
}
