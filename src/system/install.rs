//! Clearing the old configuration and writing the new fragment.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use super::fs::{present, remove_any};
use crate::config::Paths;
use crate::error::{Result, TuneError};
use crate::sysctl::SysctlDocument;

/// Delete the legacy file and leave an empty fragment directory behind.
/// Running it on an already clean system only recreates the directory.
pub fn clean(paths: &Paths) -> Result<()> {
    for path in [&paths.legacy_conf, &paths.fragment_dir] {
        if present(path) {
            remove_any(path).map_err(|source| TuneError::Clean { path: path.clone(), source })?;
            info!(path = %path.display(), "removed");
        }
    }
    fs::create_dir_all(&paths.fragment_dir)
        .map_err(|source| TuneError::Clean { path: paths.fragment_dir.clone(), source })?;
    Ok(())
}

/// Write `doc` to the fragment file, replacing it if present.
pub fn write(paths: &Paths, doc: &SysctlDocument) -> Result<PathBuf> {
    let path = paths.fragment_file();
    fs::write(&path, doc.render()).map_err(|source| TuneError::Write { path: path.clone(), source })?;
    info!(path = %path.display(), entries = doc.len(), "profile written");
    Ok(path)
}
