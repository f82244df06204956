//! Removal of generated sources and artifacts

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::codegen::naming::is_generated_name;
use crate::error::{QuoteError, QuoteResult};

/// Delete generated files under `root`, descending into subdirectories
/// when `recurse` is set. Returns the removed paths, sorted.
///
/// Files or directories that disappear while walking are skipped.
pub fn cleanup(root: &Path, recurse: bool) -> QuoteResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    walk(root, recurse, &mut removed, true)?;
    removed.sort();
    Ok(removed)
}

fn walk(dir: &Path, recurse: bool, removed: &mut Vec<PathBuf>, is_root: bool) -> QuoteResult<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if !is_root && e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(QuoteError::io(dir, e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| QuoteError::io(dir, e))?;
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(QuoteError::io(&path, e)),
        };

        if file_type.is_dir() {
            if recurse {
                walk(&path, recurse, removed, false)?;
            }
            continue;
        }

        let generated = entry.file_name().to_str().is_some_and(is_generated_name);
        if !generated {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed {}", path.display());
                removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(QuoteError::io(&path, e)),
        }
    }
    Ok(())
}
